//! Recursive directory traversal.
//!
//! Each directory is listed one level at a time (sorted by file name) and
//! walked as a pure call returning its own lines and file records, which
//! the caller appends to its own. Ignored entries are dropped before any
//! other decision; unreadable directories contribute nothing.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::filter::{Classification, FilterRules};
use crate::tree::{TreeLine, TreeListing};

/// Reasons a directory could not be listed.
///
/// These never abort a walk; they are logged and the directory is
/// treated as empty.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("cannot list {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// A relevant file discovered during the walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Nesting level below the scan root (root children = 0).
    pub depth: usize,
    /// Full path (scan root joined with `relative`).
    pub path: PathBuf,
    /// Path relative to the scan root.
    pub relative: PathBuf,
    pub classification: Classification,
}

/// Result of walking a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Walk {
    pub tree: TreeListing,
    pub files: Vec<FileRecord>,
}

impl Walk {
    fn merge(&mut self, child: Walk) {
        self.tree.append(child.tree);
        self.files.extend(child.files);
    }
}

/// A direct child of a listed directory.
#[derive(Debug)]
struct DirChild {
    /// Name as stored on disk; may not be valid UTF-8.
    name: OsString,
    path: PathBuf,
    /// True for directories and for symlinks resolving to one.
    is_dir: bool,
}

impl DirChild {
    fn display_name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }
}

/// Walk `root`, collecting the directory structure and relevant files.
///
/// Symbolic links to directories are followed; a link leading back to
/// a directory already being walked is listed but not descended into.
///
/// # Examples
///
/// ```no_run
/// use sift::filter::FilterRules;
/// use sift::walker::walk;
/// use std::path::Path;
///
/// let walk = walk(Path::new("./project"), &FilterRules::default());
/// for record in &walk.files {
///     println!("{} {}", record.classification, record.relative.display());
/// }
/// ```
pub fn walk(root: &Path, rules: &FilterRules) -> Walk {
    walk_dir(root, Path::new(""), 0, rules, &[])
}

fn walk_dir(
    root: &Path,
    relative: &Path,
    depth: usize,
    rules: &FilterRules,
    ancestors: &[PathBuf],
) -> Walk {
    let dir = root.join(relative);

    let mut ancestors = ancestors.to_vec();
    if let Ok(canonical) = fs::canonicalize(&dir) {
        if ancestors.contains(&canonical) {
            debug!(path = %dir.display(), "symlink cycle, not descending");
            return Walk::default();
        }
        ancestors.push(canonical);
    }

    let children = match list_dir(&dir) {
        Ok(children) => children,
        Err(e @ WalkError::NotADirectory { .. }) => {
            debug!(error = %e, "skipping");
            return Walk::default();
        }
        Err(e) => {
            warn!(error = %e, "skipping unreadable directory");
            return Walk::default();
        }
    };

    let mut walk = Walk::default();

    for child in children {
        let child_relative = relative.join(&child.name);

        if rules.should_ignore(&child_relative) {
            debug!(path = %child_relative.display(), "ignored");
            continue;
        }

        let name = child.display_name();

        if child.is_dir {
            walk.tree.push(TreeLine::directory(depth, name));
            let sub = walk_dir(root, &child_relative, depth + 1, rules, &ancestors);
            walk.merge(sub);
        } else {
            if rules.is_excluded_file(&child.path) {
                debug!(path = %child_relative.display(), "excluded");
                continue;
            }

            walk.tree.push(TreeLine::file(depth, &name));

            if rules.is_relevant(&name) {
                let classification = rules.classify(&child_relative);
                walk.files.push(FileRecord {
                    depth,
                    path: child.path,
                    relative: child_relative,
                    classification,
                });
            }
        }
    }

    walk
}

/// List the direct children of `dir`, sorted by file name.
fn list_dir(dir: &Path) -> Result<Vec<DirChild>, WalkError> {
    if !dir.is_dir() {
        return Err(WalkError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(Some(1))
        .sort_by_file_name(|a: &OsStr, b: &OsStr| a.cmp(b))
        .build();

    let mut children = Vec::new();
    for result in walker {
        let entry = result.map_err(|source| WalkError::Unreadable {
            path: dir.to_path_buf(),
            source,
        })?;

        if entry.depth() == 0 {
            continue;
        }

        let is_dir = match entry.file_type() {
            Some(ft) if ft.is_symlink() => entry.path().is_dir(),
            Some(ft) => ft.is_dir(),
            None => false,
        };

        children.push(DirChild {
            name: entry.file_name().to_os_string(),
            is_dir,
            path: entry.into_path(),
        });
    }

    Ok(children)
}
