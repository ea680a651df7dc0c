//! Path filtering and file classification.
//!
//! Decides which paths are skipped entirely, which files are relevant
//! for the prompt, and which section each relevant file belongs to.
//! The rule sets are plain data so callers (and tests) can supply
//! their own.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Path segments excluded together with everything beneath them.
pub const DEFAULT_IGNORE: &[&str] = &[
    "target",
    ".git",
    ".github",
    ".idea",
    "node_modules",
    ".m2",
    "__pycache__",
    "build",
    "dist",
    "out",
];

/// File name suffixes that make a file relevant.
pub const DEFAULT_SUFFIXES: &[&str] = &[
    // Sources
    ".java", ".jsp", ".kt", ".groovy", ".js", ".jsx",
    // Config and resources
    ".xml", ".properties", ".yml", ".yaml", ".json", ".toml",
    // Build
    ".gradle", ".mvn", ".gitignore",
    // Docs
    ".md", ".adoc", ".rst",
];

/// File names always treated as build/config files.
pub const DEFAULT_BUILD_FILES: &[&str] = &[
    "pom.xml",
    "build.gradle",
    "settings.gradle",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
];

/// Directory segment marking test code (compared case-insensitively).
const TEST_SEGMENT: &str = "test";

/// Section a relevant file is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    BuildConfig,
    Test,
    Source,
}

impl Classification {
    /// All classifications in document order.
    pub fn all() -> &'static [Classification] {
        &[
            Classification::BuildConfig,
            Classification::Source,
            Classification::Test,
        ]
    }

    /// Section title used in the assembled document.
    pub fn title(&self) -> &'static str {
        match self {
            Classification::BuildConfig => "Build & Config Files",
            Classification::Source => "Source Files",
            Classification::Test => "Test Files",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::BuildConfig => "BUILD_CONFIG",
            Classification::Test => "TEST",
            Classification::Source => "SOURCE",
        };
        f.pad(label)
    }
}

/// Ignore, relevance and classification rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRules {
    ignore: BTreeSet<String>,
    suffixes: Vec<String>,
    build_files: BTreeSet<String>,
    /// Canonical paths of individual files to leave out (e.g. the output file).
    excluded_files: BTreeSet<PathBuf>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_IGNORE.iter().copied(),
            DEFAULT_SUFFIXES.iter().copied(),
            DEFAULT_BUILD_FILES.iter().copied(),
        )
    }
}

impl FilterRules {
    /// Create rules from explicit sets.
    pub fn new<I, S, B>(ignore: I, suffixes: S, build_files: B) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        let mut suffixes: Vec<String> = suffixes.into_iter().map(Into::into).collect();
        suffixes.sort();
        suffixes.dedup();

        Self {
            ignore: ignore.into_iter().map(Into::into).collect(),
            suffixes,
            build_files: build_files.into_iter().map(Into::into).collect(),
            excluded_files: BTreeSet::new(),
        }
    }

    /// Leave one specific file out of the walk entirely.
    ///
    /// Paths that do not exist yet are ignored; there is nothing to skip.
    pub fn exclude_file(mut self, path: &Path) -> Self {
        if let Ok(canonical) = fs::canonicalize(path) {
            self.excluded_files.insert(canonical);
        }
        self
    }

    /// Check whether `path` is one of the excluded files.
    pub fn is_excluded_file(&self, path: &Path) -> bool {
        if self.excluded_files.is_empty() {
            return false;
        }

        let name_matches = self
            .excluded_files
            .iter()
            .any(|excluded| excluded.file_name() == path.file_name());

        name_matches
            && fs::canonicalize(path).is_ok_and(|canonical| self.excluded_files.contains(&canonical))
    }

    pub fn ignore(&self) -> impl Iterator<Item = &str> {
        self.ignore.iter().map(String::as_str)
    }

    pub fn suffixes(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }

    pub fn build_files(&self) -> impl Iterator<Item = &str> {
        self.build_files.iter().map(String::as_str)
    }

    /// Check whether any segment of `path` is an ignore segment.
    ///
    /// Matching is exact per segment: `subtarget` does not match `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::filter::FilterRules;
    /// use std::path::Path;
    ///
    /// let rules = FilterRules::default();
    /// assert!(rules.should_ignore(Path::new("app/target/classes")));
    /// assert!(!rules.should_ignore(Path::new("app/subtarget/Main.java")));
    /// ```
    pub fn should_ignore(&self, path: &Path) -> bool {
        segments(path).any(|segment| self.ignore.contains(segment))
    }

    /// Check whether a file name is a build file or carries a known suffix.
    pub fn is_relevant(&self, file_name: &str) -> bool {
        self.is_build_file(file_name)
            || self.suffixes.iter().any(|suffix| file_name.ends_with(suffix.as_str()))
    }

    /// Check whether a file name is one of the special build files.
    pub fn is_build_file(&self, file_name: &str) -> bool {
        self.build_files.contains(file_name)
    }

    /// Classify a relevant file.
    ///
    /// Build files win over everything, even inside a `test` directory.
    /// Otherwise any `test` segment (case-insensitive) makes the file a test.
    pub fn classify(&self, path: &Path) -> Classification {
        let is_build_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.is_build_file(name));

        if is_build_file {
            Classification::BuildConfig
        } else if segments(path).any(|s| s.eq_ignore_ascii_case(TEST_SEGMENT)) {
            Classification::Test
        } else {
            Classification::Source
        }
    }
}

/// Normal components of a path as strings; non-UTF-8 segments never match.
fn segments(path: &Path) -> impl Iterator<Item = &str> {
    path.components().filter_map(|c| match c {
        Component::Normal(s) => s.to_str(),
        _ => None,
    })
}
