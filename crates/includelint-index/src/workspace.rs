//! Build and source directories of one analysis run
//!
//! Constructed once by the caller and passed down, so root detection happens
//! exactly once per process.

use includelint_core::{paths, Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories source paths of the build description are resolved against
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory relative source paths are relative to
    build_dir: PathBuf,
    /// Directory `//`-prefixed source paths are relative to
    source_root: Option<PathBuf>,
}

impl Workspace {
    /// File marking the root of a GN source tree
    pub const ROOT_MARKER: &'static str = ".gn";

    /// Create a workspace without a source root
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: paths::normalize(build_dir.into()),
            source_root: None,
        }
    }

    /// Create a workspace whose source root is the nearest ancestor of `build_dir` holding `.gn`
    pub fn discover(build_dir: impl Into<PathBuf>) -> Self {
        let workspace = Self::new(build_dir);
        let source_root = Self::find_root(&workspace.build_dir);
        debug!("Source root: {:?}", source_root);
        Self {
            source_root,
            ..workspace
        }
    }

    /// Set the source root explicitly
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(paths::absolutize(&self.build_dir, source_root.into()));
        self
    }

    /// Nearest directory at or above `start` that contains `.gn`
    pub fn find_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(Self::ROOT_MARKER).is_file())
            .map(Path::to_path_buf)
    }

    /// Build directory
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Source root, if known
    pub fn source_root(&self) -> Option<&Path> {
        self.source_root.as_deref()
    }

    /// Absolute path of a source as written in the build description
    pub fn source_path(&self, source: &str) -> Result<PathBuf> {
        match source.strip_prefix("//") {
            Some(rest) => match &self.source_root {
                Some(root) => Ok(paths::normalize(root.join(rest))),
                None => Err(Error::Config(format!(
                    "\"{}\" is source-absolute but no source root is known",
                    source
                ))),
            },
            None => Ok(paths::absolutize(&self.build_dir, source)),
        }
    }
}
