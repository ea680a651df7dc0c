//! Sift - Turn a project directory into a single LLM prompt document.
//!
//! Sift walks a directory tree, keeps the files relevant to a prompt,
//! classifies them as build/config, source or test, and assembles one
//! text document (README, directory structure, file contents) whose
//! token count it reports.
//!
//! # Quick Start
//!
//! ```no_run
//! use sift::builder::Sift;
//!
//! let result = Sift::new("./my-project")
//!     .model("gpt-3.5-turbo")
//!     .build()
//!     .unwrap();
//!
//! println!("Found {} relevant files", result.files.len());
//! println!("Token Count: {}", result.token_count);
//! ```
//!
//! # Modules
//!
//! - [`filter`] - Ignore segments, relevance and classification rules
//! - [`walker`] - Recursive directory traversal
//! - [`tree`] - Directory structure records and rendering
//! - [`content`] - Best-effort file loading
//! - [`output`] - Document assembly
//! - [`tokens`] - Token counting for LLM context budgets
//! - [`builder`] - Fluent API over the whole pipeline
//! - [`config`] - Optional `.sift.toml` configuration

pub mod builder;
pub mod config;
pub mod content;
pub mod errors;
pub mod filter;
pub mod logging;
pub mod output;
pub mod tokens;
pub mod tree;
pub mod walker;

// Re-export key types at crate root for convenience
pub use builder::{Sift, SiftResult, Summary};
pub use config::{Config, ConfigError};
pub use content::Content;
pub use errors::SiftError;
pub use filter::{Classification, FilterRules};
pub use output::{assemble, OutputError};
pub use tokens::{count_tokens, count_tokens_for_model, Encoding, TokenCounter};
pub use tree::{render_tree, LineKind, TreeLine, TreeListing};
pub use walker::{walk, FileRecord, Walk, WalkError};
