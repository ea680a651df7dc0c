//! Directory structure representation and rendering.
//!
//! The walker produces an ordered list of line records; rendering to
//! text (or JSON) is a separate final pass.

use serde::Serialize;

/// One level of indentation in the rendered tree and in file snippets.
pub const INDENT: &str = "    ";

/// Indentation prefix for the given depth.
pub fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

/// The type of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Directory,
    File,
}

/// A single line of the directory structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    /// Nesting level below the scan root (root children = 0).
    pub depth: usize,
    pub kind: LineKind,
    /// Entry name (not full path).
    pub name: String,
}

impl TreeLine {
    pub fn directory(depth: usize, name: impl Into<String>) -> Self {
        Self {
            depth,
            kind: LineKind::Directory,
            name: name.into(),
        }
    }

    pub fn file(depth: usize, name: impl Into<String>) -> Self {
        Self {
            depth,
            kind: LineKind::File,
            name: name.into(),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == LineKind::Directory
    }
}

/// Ordered line records describing the visited hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TreeListing {
    lines: Vec<TreeLine>,
}

impl TreeListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: TreeLine) {
        self.lines.push(line);
    }

    /// Append a child listing after the lines already present.
    pub fn append(&mut self, mut other: TreeListing) {
        self.lines.append(&mut other.lines);
    }

    pub fn lines(&self) -> &[TreeLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_directory()).count()
    }

    pub fn directory_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_directory()).count()
    }
}

/// Render a listing as indented text.
///
/// Directories render as `[name/]`, files as their bare name; every
/// line is newline-terminated.
///
/// # Examples
///
/// ```
/// use sift::tree::{render_tree, TreeLine, TreeListing};
///
/// let mut listing = TreeListing::new();
/// listing.push(TreeLine::directory(0, "src"));
/// listing.push(TreeLine::file(1, "Main.java"));
///
/// assert_eq!(render_tree(&listing), "[src/]\n    Main.java\n");
/// ```
pub fn render_tree(listing: &TreeListing) -> String {
    let mut output = String::with_capacity(listing.lines.len() * 32);
    for line in &listing.lines {
        output.push_str(&indent(line.depth));
        match line.kind {
            LineKind::Directory => {
                output.push('[');
                output.push_str(&line.name);
                output.push_str("/]");
            }
            LineKind::File => output.push_str(&line.name),
        }
        output.push('\n');
    }
    output
}

/// Format number with thousands separators.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
