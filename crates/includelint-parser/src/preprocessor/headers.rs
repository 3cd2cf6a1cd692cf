//! Header File Resolver
//!
//! Resolves inclusion directives the way the compiler searches for them.
//! Used for directives whose file the preprocessor skipped on re-inclusion
//! (include guards, `#pragma once`), so its output names no file for them.

use includelint_core::paths;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header file resolver for one compile command
pub struct HeaderResolver {
    /// Directory relative paths are resolved against
    working_dir: PathBuf,
    /// `-iquote` directories, searched for quoted includes only
    quote_paths: Vec<PathBuf>,
    /// `-I` directories, as written in the command
    include_paths: Vec<PathBuf>,
}

fn push_unique(dirs: &mut Vec<PathBuf>, dir: PathBuf) {
    if !dirs.contains(&dir) {
        dirs.push(dir);
    }
}

impl HeaderResolver {
    /// Create a new header resolver
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            quote_paths: Vec::new(),
            include_paths: Vec::new(),
        }
    }

    /// Create a resolver searching `include_paths` in order
    pub fn with_include_paths<I, P>(working_dir: PathBuf, include_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut resolver = Self::new(working_dir);
        for path in include_paths {
            push_unique(&mut resolver.include_paths, path.into());
        }
        resolver
    }

    /// Search `quote_paths` for quoted includes before the include paths
    pub fn with_quote_paths<I, P>(mut self, quote_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in quote_paths {
            push_unique(&mut self.quote_paths, path.into());
        }
        self
    }

    fn search(&self, dirs: &[PathBuf], header: &str) -> Option<PathBuf> {
        dirs.iter().map(|dir| dir.join(header)).find(|candidate| {
            let found = self.working_dir.join(candidate).is_file();
            if found {
                debug!("Resolved {} as {:?}", header, candidate);
            }
            found
        })
    }

    /// Resolve a header file path
    ///
    /// Given an include directive like `#include <linux/kernel.h>` or
    /// `#include "myheader.h"`, find the file the compiler would open. The
    /// result is spelled like the compiler spells it: the search directory
    /// (or the includer's directory) joined with the written path.
    ///
    /// Quoted includes search the includer's directory, then the `-iquote`
    /// directories, then the `-I` directories. Angled includes search only
    /// the `-I` directories.
    pub fn resolve(&self, header: &str, angled: bool, from_file: Option<&Path>) -> Option<PathBuf> {
        let resolved = if angled {
            self.search(&self.include_paths, header)
        } else {
            let includer_dir: Vec<PathBuf> = from_file
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .into_iter()
                .collect();

            self.search(&includer_dir, header)
                .or_else(|| self.search(&self.quote_paths, header))
                .or_else(|| self.search(&self.include_paths, header))
        };

        if resolved.is_none() {
            debug!("Failed to resolve header: {}", header);
        }
        resolved
    }

    /// Resolve an `#include_next` directive of `from_file`.
    ///
    /// The search continues after the first `-I` directory holding
    /// `from_file`. An includer outside every `-I` directory makes the
    /// directive behave like a plain inclusion.
    pub fn resolve_next(&self, header: &str, angled: bool, from_file: &Path) -> Option<PathBuf> {
        let includer = paths::normalize(from_file);
        let position = self
            .include_paths
            .iter()
            .position(|dir| includer.starts_with(paths::normalize(dir)));

        match position {
            Some(index) => self.search(&self.include_paths[index + 1..], header),
            None => self.resolve(header, angled, Some(from_file)),
        }
    }
}
