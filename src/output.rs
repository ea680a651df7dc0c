//! Prompt document assembly.
//!
//! Combines the README, the rendered directory structure and the
//! content of every relevant file, grouped into build/config, source
//! and test sections.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::content::{load, Content};
use crate::filter::Classification;
use crate::tree::indent;
use crate::walker::FileRecord;

/// Errors that can occur while producing output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// README file names, in lookup order.
pub const README_CANDIDATES: &[&str] = &["README.md", "README.MD"];

/// Rendered when no README exists under the root.
pub const README_MISSING: &str = "README.md: Not found!\n\n";

/// A rendered section of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub classification: Classification,
    /// Header plus all snippets.
    pub text: String,
    pub files: usize,
}

/// The document split into its blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentParts {
    pub readme: String,
    pub structure: String,
    /// Nonempty sections only, in document order.
    pub sections: Vec<Section>,
}

impl DocumentParts {
    /// Concatenate all blocks into the final document.
    pub fn render(&self) -> String {
        let len = self.readme.len()
            + self.structure.len()
            + self.sections.iter().map(|s| s.text.len()).sum::<usize>();

        let mut output = String::with_capacity(len);
        output.push_str(&self.readme);
        output.push_str(&self.structure);
        for section in &self.sections {
            output.push_str(&section.text);
        }
        output
    }
}

/// Assemble the full document.
///
/// `records` must be in discovery order; each section keeps that order.
///
/// # Examples
///
/// ```no_run
/// use sift::filter::FilterRules;
/// use sift::output::assemble;
/// use sift::tree::render_tree;
/// use sift::walker::walk;
/// use std::path::Path;
///
/// let root = Path::new("./project");
/// let walk = walk(root, &FilterRules::default());
/// let document = assemble(root, &render_tree(&walk.tree), &walk.files);
/// println!("{document}");
/// ```
pub fn assemble(root: &Path, tree_text: &str, records: &[FileRecord]) -> String {
    assemble_parts(root, tree_text, records).render()
}

/// Assemble the document, keeping its blocks separate.
pub fn assemble_parts(root: &Path, tree_text: &str, records: &[FileRecord]) -> DocumentParts {
    let readme = readme_block(root);
    let structure = format!("Directory Structure:\n{}\n", tree_text);

    let sections = Classification::all()
        .iter()
        .filter_map(|&classification| {
            let group: Vec<&FileRecord> = records
                .iter()
                .filter(|r| r.classification == classification)
                .collect();

            if group.is_empty() {
                return None;
            }

            let mut text = format!("\n=== {} ===\n", classification.title());
            for record in &group {
                let content = load(&record.path);
                text.push_str(&render_snippet(record, &content));
            }

            Some(Section {
                classification,
                text,
                files: group.len(),
            })
        })
        .collect();

    DocumentParts {
        readme,
        structure,
        sections,
    }
}

/// Render the README block for `root`.
///
/// An existing README is always rendered, even when it is empty.
pub fn readme_block(root: &Path) -> String {
    for name in README_CANDIDATES {
        let path = root.join(name);
        if path.exists() {
            debug!(path = %path.display(), "found readme");
            return format!("{}:\n```\n{}\n```\n\n", name, load(&path));
        }
    }
    README_MISSING.to_string()
}

/// Render one file snippet, indented to the file's tree depth.
pub fn render_snippet(record: &FileRecord, content: &Content) -> String {
    let prefix = indent(record.depth);
    format!(
        "\n{prefix}{}:\n{prefix}```\n{}\n{prefix}```\n",
        record.relative.display(),
        content
    )
}

/// Write the document as UTF-8, replacing any existing file.
pub fn write_document(path: &Path, document: &str) -> Result<(), OutputError> {
    fs::write(path, document).map_err(|source| OutputError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterRules;
    use crate::tree::render_tree;
    use crate::walker::walk;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &[u8]) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn document_for(root: &Path) -> String {
        let walk = walk(root, &FilterRules::default());
        assemble(root, &render_tree(&walk.tree), &walk.files)
    }

    fn record(depth: usize, relative: &str, classification: Classification) -> FileRecord {
        FileRecord {
            depth,
            path: PathBuf::from("/nowhere").join(relative),
            relative: PathBuf::from(relative),
            classification,
        }
    }

    #[test]
    fn test_full_document() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", b"Hi");
        write(dir.path(), "target/Gen.java", b"class Gen {}");
        write(dir.path(), "pom.xml", b"<project/>");
        write(dir.path(), "src/Main.java", b"class Main {}");
        write(dir.path(), "src/test/FooTest.java", b"class FooTest {}");

        let document = document_for(dir.path());

        let expected = "README.md:\n```\nHi\n```\n\n\
            Directory Structure:\n\
            README.md\n\
            pom.xml\n\
            [src/]\n\
            \x20   Main.java\n\
            \x20   [test/]\n\
            \x20       FooTest.java\n\
            \n\
            \n=== Build & Config Files ===\n\
            \npom.xml:\n```\n<project/>\n```\n\
            \n=== Source Files ===\n\
            \nREADME.md:\n```\nHi\n```\n\
            \n    src/Main.java:\n    ```\nclass Main {}\n    ```\n\
            \n=== Test Files ===\n\
            \n        src/test/FooTest.java:\n        ```\nclass FooTest {}\n        ```\n";

        assert_eq!(document.replace('\\', "/"), expected);
        assert!(!document.contains("target"));
        assert!(!document.contains("Gen"));
    }

    #[test]
    fn test_missing_readme() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "App.kt", b"fun main() {}");

        let document = document_for(dir.path());
        assert!(document.starts_with("README.md: Not found!\n\nDirectory Structure:\nApp.kt\n\n"));
    }

    #[test]
    fn test_uppercase_readme_extension() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.MD", b"Upper");

        let block = readme_block(dir.path());
        // Case-insensitive filesystems resolve README.md to the same file.
        assert!(block.ends_with(":\n```\nUpper\n```\n\n"));
    }

    #[test]
    fn test_empty_readme_is_rendered_as_found() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", b"");

        assert_eq!(readme_block(dir.path()), "README.md:\n```\n\n```\n\n");
    }

    #[test]
    fn test_only_source_sections() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/App.java", b"class App {}");

        let document = document_for(dir.path());

        assert!(document.contains("=== Source Files ==="));
        assert!(!document.contains("Build & Config Files"));
        assert!(!document.contains("Test Files"));
    }

    #[test]
    fn test_section_order_is_fixed() {
        let records = vec![
            record(1, "src/test/ATest.java", Classification::Test),
            record(1, "src/A.java", Classification::Source),
            record(0, "pom.xml", Classification::BuildConfig),
        ];
        let dir = TempDir::new().unwrap();

        let parts = assemble_parts(dir.path(), "", &records);
        let order: Vec<_> = parts.sections.iter().map(|s| s.classification).collect();

        assert_eq!(
            order,
            [
                Classification::BuildConfig,
                Classification::Source,
                Classification::Test,
            ]
        );
    }

    #[test]
    fn test_sections_keep_discovery_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b/B.java", b"b");
        write(dir.path(), "a/A.java", b"a");
        write(dir.path(), "c.java", b"c");

        let document = document_for(dir.path());
        let a = document.find("A.java:").unwrap();
        let b = document.find("B.java:").unwrap();
        let c = document.find("c.java:").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_undecodable_does_not_abort() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &[0xff, 0xfe, 0xfd]);
        write(dir.path(), "b.json", b"{}");

        let document = document_for(dir.path());

        assert!(document.contains(
            "\na.json:\n```\nBinary or non-UTF8 file, cannot display text content.\n```\n"
        ));
        assert!(document.contains("\nb.json:\n```\n{}\n```\n"));
    }

    #[test]
    fn test_vanished_file_renders_error() {
        let dir = TempDir::new().unwrap();
        let records = vec![record(0, "Gone.java", Classification::Source)];

        let document = assemble(dir.path(), "Gone.java\n", &records);
        assert!(document.contains("\nGone.java:\n```\nError reading file: "));
    }

    #[test]
    fn test_snippet_indentation() {
        let snippet = render_snippet(
            &record(2, "a/b/C.java", Classification::Source),
            &Content::Text("x".into()),
        );
        assert_eq!(
            snippet.replace('\\', "/"),
            "\n        a/b/C.java:\n        ```\nx\n        ```\n"
        );
    }

    #[test]
    fn test_idempotent() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", b"Hi");
        write(dir.path(), "src/Main.java", b"class Main {}");

        assert_eq!(document_for(dir.path()), document_for(dir.path()));
    }

    #[test]
    fn test_parts_render_matches_assemble() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pom.xml", b"<project/>");

        let walk = walk(dir.path(), &FilterRules::default());
        let tree = render_tree(&walk.tree);
        let parts = assemble_parts(dir.path(), &tree, &walk.files);

        assert_eq!(parts.render(), assemble(dir.path(), &tree, &walk.files));
        assert_eq!(parts.sections.len(), 1);
        assert_eq!(parts.sections[0].files, 1);
    }

    #[test]
    fn test_write_document_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompt.txt");
        fs::write(&path, "old content that is longer").unwrap();

        write_document(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_document_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing/dir/prompt.txt");
        assert!(matches!(
            write_document(&path, "x"),
            Err(OutputError::Write { .. })
        ));
    }
}
