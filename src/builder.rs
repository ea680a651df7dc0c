//! Fluent builder API for sift.
//!
//! Runs the whole pipeline: walk, render the tree, assemble the
//! document and count its tokens.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::SiftError;
use crate::filter::{Classification, FilterRules};
use crate::output::{assemble_parts, DocumentParts};
use crate::tokens::{Encoding, TokenCounter, DEFAULT_MODEL};
use crate::tree::{render_tree, TreeListing};
use crate::walker::{walk, FileRecord};

/// Builder for generating a prompt document from a project.
///
/// # Examples
///
/// ```no_run
/// use sift::builder::Sift;
///
/// let result = Sift::new("./project").model("gpt-4o").build().unwrap();
/// println!("{} tokens", result.token_count);
/// ```
pub struct Sift {
    root: PathBuf,
    rules: FilterRules,
    model: String,
}

impl Sift {
    /// Create a new builder for the given root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules: FilterRules::default(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Replace the filter rules.
    pub fn rules(mut self, rules: FilterRules) -> Self {
        self.rules = rules;
        self
    }

    /// Model profile used for token counting.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Walk, assemble and count.
    pub fn build(self) -> Result<SiftResult, SiftError> {
        check_root(&self.root)?;

        let walked = walk(&self.root, &self.rules);
        debug!(
            lines = walked.tree.lines().len(),
            files = walked.files.len(),
            "walk complete"
        );

        let tree_text = render_tree(&walked.tree);
        let parts = assemble_parts(&self.root, &tree_text, &walked.files);
        let document = parts.render();

        let counter = TokenCounter::for_model(&self.model);
        let token_count = counter.count(&document);
        info!(model = %self.model, tokens = token_count, "document assembled");

        Ok(SiftResult {
            root: self.root,
            tree: walked.tree,
            files: walked.files,
            parts,
            document,
            model: self.model,
            encoding: counter.encoding(),
            token_count,
        })
    }

    /// Walk only (no document).
    pub fn tree(self) -> Result<TreeListing, SiftError> {
        check_root(&self.root)?;
        Ok(walk(&self.root, &self.rules).tree)
    }

    /// Relevant files only, in discovery order.
    pub fn files(self) -> Result<Vec<FileRecord>, SiftError> {
        check_root(&self.root)?;
        Ok(walk(&self.root, &self.rules).files)
    }
}

fn check_root(root: &Path) -> Result<(), SiftError> {
    if !root.exists() {
        return Err(SiftError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(SiftError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Result of a sift run.
#[derive(Debug)]
pub struct SiftResult {
    pub root: PathBuf,
    pub tree: TreeListing,
    /// Relevant files in discovery order.
    pub files: Vec<FileRecord>,
    pub parts: DocumentParts,
    /// The assembled document.
    pub document: String,
    pub model: String,
    pub encoding: Encoding,
    pub token_count: usize,
}

/// Counts reported for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub model: String,
    pub encoding: String,
    pub tokens: usize,
    pub build_config_files: usize,
    pub source_files: usize,
    pub test_files: usize,
}

impl SiftResult {
    /// Number of files with the given classification.
    pub fn count(&self, classification: Classification) -> usize {
        self.files
            .iter()
            .filter(|f| f.classification == classification)
            .count()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            model: self.model.clone(),
            encoding: self.encoding.to_string(),
            tokens: self.token_count,
            build_config_files: self.count(Classification::BuildConfig),
            source_files: self.count(Classification::Source),
            test_files: self.count(Classification::Test),
        }
    }

    /// Token count of each document block, in document order.
    pub fn section_tokens(&self) -> Vec<(String, usize)> {
        let counter = TokenCounter::new(self.encoding);
        let mut breakdown = vec![
            ("README".to_string(), counter.count(&self.parts.readme)),
            (
                "Directory Structure".to_string(),
                counter.count(&self.parts.structure),
            ),
        ];
        breakdown.extend(self.parts.sections.iter().map(|s| {
            (s.classification.title().to_string(), counter.count(&s.text))
        }));
        breakdown
    }
}

// ============================================================================
// Functional API
// ============================================================================

/// Assemble the document for a path without counting tokens.
pub fn document_from_path(root: impl AsRef<Path>, rules: &FilterRules) -> String {
    let root = root.as_ref();
    let walked = walk(root, rules);
    assemble_parts(root, &render_tree(&walked.tree), &walked.files).render()
}

/// Walk a path and return its directory structure.
pub fn tree_from_path(root: impl AsRef<Path>, rules: &FilterRules) -> TreeListing {
    walk(root.as_ref(), rules).tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_project() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::create_dir_all(dir.path().join("src/test")).unwrap();
        fs::write(dir.path().join("README.md"), "Hi").unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        fs::write(dir.path().join("src/Main.java"), "class Main {}").unwrap();
        fs::write(dir.path().join("src/test/FooTest.java"), "class FooTest {}").unwrap();

        dir
    }

    #[test]
    fn test_sift_builder() {
        let dir = create_test_project();

        let result = Sift::new(dir.path()).build().unwrap();

        assert!(result.document.starts_with("README.md:\n```\nHi\n```\n\n"));
        assert!(result.token_count > 0);
        assert_eq!(result.encoding, Encoding::Cl100kBase);
        assert_eq!(result.files.len(), 4);
    }

    #[test]
    fn test_summary_counts() {
        let dir = create_test_project();

        let summary = Sift::new(dir.path()).model("gpt-4o").build().unwrap().summary();

        assert_eq!(summary.build_config_files, 1);
        // README.md is itself a relevant .md file.
        assert_eq!(summary.source_files, 2);
        assert_eq!(summary.test_files, 1);
        assert_eq!(summary.encoding, "o200k_base");
    }

    #[test]
    fn test_section_tokens() {
        let dir = create_test_project();
        let result = Sift::new(dir.path()).build().unwrap();

        let labels: Vec<_> = result
            .section_tokens()
            .into_iter()
            .map(|(label, _)| label)
            .collect();

        assert_eq!(
            labels,
            [
                "README",
                "Directory Structure",
                "Build & Config Files",
                "Source Files",
                "Test Files",
            ]
        );
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = Sift::new(dir.path().join("absent")).build().unwrap_err();
        assert!(matches!(err, SiftError::PathNotFound(_)));
    }

    #[test]
    fn test_file_root() {
        let dir = create_test_project();
        let err = Sift::new(dir.path().join("pom.xml")).tree().unwrap_err();
        assert!(matches!(err, SiftError::NotADirectory(_)));
    }

    #[test]
    fn test_custom_rules() {
        let dir = create_test_project();

        let files = Sift::new(dir.path())
            .rules(FilterRules::new(["test"], [".java"], Vec::<String>::new()))
            .files()
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("src/Main.java"));
    }

    #[test]
    fn test_functional_api() {
        let dir = create_test_project();
        let rules = FilterRules::default();

        let document = document_from_path(dir.path(), &rules);
        assert_eq!(document, Sift::new(dir.path()).build().unwrap().document);

        let tree = tree_from_path(dir.path(), &rules);
        assert_eq!(tree.directory_count(), 2);
    }
}
