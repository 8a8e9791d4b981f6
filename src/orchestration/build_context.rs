//! Build context scoping
//!
//! Each build gets a private copy of the context template in a fresh
//! temporary directory, so whatever the engine leaves behind cannot leak
//! into the next build. The copy is removed when the [`BuildContext`] is
//! dropped, on every exit path, unless it was created with `keep`.

use crate::core::error::BuildError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

const CONTEXT_PREFIX: &str = "image-publisher-";

enum Scope {
    /// Removed on drop
    Scoped(TempDir),
    /// Left on disk for inspection
    Kept(PathBuf),
}

/// Isolated copy of the build-context template
pub struct BuildContext {
    scope: Scope,
}

impl BuildContext {
    /// Copy `template` into a new unique temporary directory.
    ///
    /// # Errors
    ///
    /// - `BuildError::ContextTemplateMissing` - `template` is not a directory
    /// - `BuildError::ContextCopy` - the copy failed
    pub fn materialize(template: &Path, keep: bool) -> Result<Self, BuildError> {
        if !template.is_dir() {
            return Err(BuildError::ContextTemplateMissing {
                path: template.to_path_buf(),
            });
        }

        let copy_error = |source: io::Error| BuildError::ContextCopy {
            template: template.to_path_buf(),
            source,
        };

        let dir = tempfile::Builder::new()
            .prefix(CONTEXT_PREFIX)
            .tempdir()
            .map_err(copy_error)?;

        // On failure `dir` is dropped here and the partial copy removed.
        copy_tree(template, dir.path()).map_err(copy_error)?;

        tracing::debug!(
            template = %template.display(),
            context = %dir.path().display(),
            "build context materialized"
        );

        let scope = if keep {
            Scope::Kept(dir.keep())
        } else {
            Scope::Scoped(dir)
        };

        Ok(Self { scope })
    }

    pub fn path(&self) -> &Path {
        match &self.scope {
            Scope::Scoped(dir) => dir.path(),
            Scope::Kept(path) => path,
        }
    }

    /// Whether the directory survives this value
    pub fn is_kept(&self) -> bool {
        matches!(self.scope, Scope::Kept(_))
    }
}

/// Recursively copy the contents of `from` into the existing directory `to`.
/// Symlinks are followed and their targets copied.
fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from).follow_links(true).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
