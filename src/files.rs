//! Reading input files and persisting rewritten ones

use crate::{Result, SecretSubError};
use std::fs;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A regular file found under the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Path as found while walking, rooted at the input directory
    pub path: PathBuf,
    /// Path relative to the input directory, used to place the output
    pub relative: PathBuf,
}

impl InputFile {
    /// Reads the file as UTF-8 text.
    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| SecretSubError::file(&self.path, e))
    }
}

/// An entry under the input root that could not be listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkError {
    pub path: PathBuf,
    pub message: String,
    /// The entry is a symlink pointing back at one of its ancestors
    pub symlink_loop: bool,
}

/// Everything found under an input root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkedTree {
    /// Regular files, sorted by path
    pub files: Vec<InputFile>,
    /// Entries that could not be listed, in the order they were met
    pub errors: Vec<WalkError>,
}

/// Helper to check if an ignore::Error is a symlink loop error.
fn is_loop_error(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => is_loop_error(err),
        _ => false,
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

/// Lists every regular file under `root`, recursively, sorted by path.
///
/// Symlinks are followed. Hidden files and ignore files get no special
/// treatment, every regular file is yielded. `root` may also be a single
/// file, in which case it is the only entry and its file name is the
/// relative path.
///
/// Only a root that cannot be opened is an error. Entries below it that
/// cannot be listed (dangling symlinks, symlink loops, unreadable
/// directories) are collected in [`WalkedTree::errors`].
pub fn walk(root: &Path) -> Result<WalkedTree> {
    let metadata = fs::metadata(root).map_err(|e| SecretSubError::file(root, e))?;
    if metadata.is_file() {
        let relative = root
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| root.to_path_buf());
        return Ok(WalkedTree {
            files: vec![InputFile {
                path: root.to_path_buf(),
                relative,
            }],
            errors: Vec::new(),
        });
    }

    fs::read_dir(root).map_err(|e| SecretSubError::file(root, e))?;

    let mut tree = WalkedTree::default();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .build();

    for entry in walker {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let path = entry.into_path();
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                tree.files.push(InputFile { path, relative });
            }
            Err(err) => {
                let symlink_loop = is_loop_error(&err);
                let path = error_path(&err).unwrap_or(root).to_path_buf();
                if symlink_loop {
                    warn!(path = %path.display(), "symlink loop detected");
                } else {
                    warn!(path = %path.display(), error = %err, "walk error");
                }
                tree.errors.push(WalkError {
                    path,
                    message: err.to_string(),
                    symlink_loop,
                });
            }
        }
    }

    tree.files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(
        root = %root.display(),
        count = tree.files.len(),
        errors = tree.errors.len(),
        "walked input directory"
    );
    Ok(tree)
}

/// The directory rewritten files are written to.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Creates `root` (and its parents) if it does not exist yet.
    ///
    /// Failure here is fatal for a run, since no file could be written.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| SecretSubError::OutputDir {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Where a file with the given relative path is written.
    pub fn target(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes `text` to `relative` under the output root, creating parent
    /// directories as needed. Returns the path written.
    pub fn write(&self, relative: &Path, text: &str) -> Result<PathBuf> {
        let target = self.target(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| SecretSubError::file(parent, e))?;
        }
        fs::write(&target, text).map_err(|e| SecretSubError::file(&target, e))?;
        Ok(target)
    }
}
