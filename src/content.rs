//! Best-effort file content loading.
//!
//! Every outcome is a value: text, an undecodable marker, or a read
//! error description. Nothing here returns `Err` to the caller.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

/// Placeholder rendered for files that are not valid UTF-8.
pub const UNDECODABLE_PLACEHOLDER: &str =
    "Binary or non-UTF8 file, cannot display text content.";

/// Loaded file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Valid UTF-8 text, verbatim.
    Text(String),
    /// Bytes were read but are not valid UTF-8.
    Undecodable,
    /// Any other failure, with its description.
    ReadError(String),
}

impl Content {
    pub fn is_text(&self) -> bool {
        matches!(self, Content::Text(_))
    }

    /// Text to place in the document for this content.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(text) => f.write_str(text),
            Content::Undecodable => f.write_str(UNDECODABLE_PLACEHOLDER),
            Content::ReadError(message) => write!(f, "Error reading file: {}", message),
        }
    }
}

/// Load a file as UTF-8 text.
///
/// # Examples
///
/// ```no_run
/// use sift::content::{load, Content};
/// use std::path::Path;
///
/// match load(Path::new("README.md")) {
///     Content::Text(text) => println!("{text}"),
///     other => eprintln!("{other}"),
/// }
/// ```
pub fn load(path: &Path) -> Content {
    let bytes = match read_bytes(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "read failed");
            return Content::ReadError(e.to_string());
        }
    };

    match String::from_utf8(bytes) {
        Ok(text) => Content::Text(text),
        Err(_) => {
            debug!(path = %path.display(), "not valid UTF-8");
            Content::Undecodable
        }
    }
}

fn read_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}
