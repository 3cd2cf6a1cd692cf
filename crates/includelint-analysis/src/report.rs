//! Diagnostics for unused include directories

use crate::engine::IncludeUsage;
use globset::{Glob, GlobSet, GlobSetBuilder};
use includelint_core::{Error, Result};
use std::path::Path;

/// Include directories that are never reported
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
    globs: GlobSet,
}

impl ExcludeFilter {
    /// Build a filter from glob patterns
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern)
                .map_err(|e| Error::Config(format!("invalid exclude pattern \"{}\": {}", pattern, e)))?;
            builder.add(glob);
        }

        let globs = builder
            .build()
            .map_err(|e| Error::Config(format!("invalid exclude patterns: {}", e)))?;
        Ok(Self { globs })
    }

    /// A filter excluding nothing
    pub fn none() -> Self {
        Self {
            globs: GlobSet::empty(),
        }
    }

    /// Whether `path` matches any pattern
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.globs.is_match(path)
    }
}

/// Unused include directories of one target, ready to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub target: String,
    pub entity: String,
    /// Unused directories, lexically sorted
    pub unused: Vec<String>,
}

impl Report {
    /// Build the report for `target` from its include usage
    pub fn new(
        target: impl Into<String>,
        entity: impl Into<String>,
        usage: &IncludeUsage,
        exclude: &ExcludeFilter,
    ) -> Self {
        let mut unused: Vec<String> = usage
            .unused()
            .into_iter()
            .filter(|dir| !exclude.is_excluded(dir))
            .map(|dir| dir.to_string_lossy().into_owned())
            .collect();
        unused.sort();

        Self {
            target: target.into(),
            entity: entity.into(),
            unused,
        }
    }

    /// One line per unused directory
    pub fn diagnostics(&self) -> Vec<String> {
        self.unused
            .iter()
            .map(|dir| {
                format!(
                    "{}: error: {} contains unused include directory \"{}\"",
                    self.target, self.entity, dir
                )
            })
            .collect()
    }

    /// Whether nothing is unused
    pub fn is_clean(&self) -> bool {
        self.unused.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn usage(provided: &[&str], used: &[&str]) -> IncludeUsage {
        IncludeUsage {
            provided: provided.iter().map(PathBuf::from).collect(),
            used: used.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn test_diagnostics_are_sorted_lexically() {
        let report = Report::new(
            "//src:app",
            "executable",
            &usage(&["inc/a/x", "inc/a-b", "inc/c"], &["inc/c"]),
            &ExcludeFilter::none(),
        );

        assert_eq!(
            report.diagnostics(),
            vec![
                "//src:app: error: executable contains unused include directory \"inc/a-b\"",
                "//src:app: error: executable contains unused include directory \"inc/a/x\"",
            ]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_exclude_filter() {
        let exclude = ExcludeFilter::new(&["third_party/*"]).unwrap();
        let report = Report::new(
            "//src:app",
            "executable",
            &usage(&["third_party/zlib/include", "inc/b"], &[]),
            &exclude,
        );

        assert_eq!(report.unused, vec!["inc/b"]);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        assert!(matches!(ExcludeFilter::new(&["inc/[a"]), Err(Error::Config(_))));
    }

    #[test]
    fn test_clean_report() {
        let report = Report::new("//src:app", "executable", &usage(&["inc/a"], &["inc/a"]), &ExcludeFilter::none());

        assert!(report.is_clean());
        assert!(report.diagnostics().is_empty());
    }
}
