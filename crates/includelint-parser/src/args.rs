//! Compile command argument extraction
//!
//! Splits a recorded compile command into the arguments handed to the
//! frontend and the include search directories the command declares.

use includelint_core::config::FrontendConfig;
use includelint_core::CompileCommand;
use std::collections::HashSet;

/// Flags removed from a compile command before it is handed to the frontend
#[derive(Debug, Clone)]
pub struct ArgumentFilter {
    /// Flags dropped on their own
    drop: HashSet<String>,
    /// Flags dropped together with the token that follows them
    drop_with_value: HashSet<String>,
}

impl ArgumentFilter {
    /// Create a filter from explicit flag lists
    pub fn new<I, J>(drop: I, drop_with_value: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        Self {
            drop: drop.into_iter().map(Into::into).collect(),
            drop_with_value: drop_with_value.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a filter from the frontend configuration
    pub fn from_config(config: &FrontendConfig) -> Self {
        Self::new(
            config.drop_flags.iter().cloned(),
            config.drop_flags_with_value.iter().cloned(),
        )
    }

    /// Apply the filter, keeping the order of the surviving arguments
    pub fn apply<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut it = args.iter().map(AsRef::as_ref);
        let mut kept = Vec::with_capacity(args.len());

        while let Some(arg) = it.next() {
            if self.drop.contains(arg) {
                continue;
            }

            if self.drop_with_value.contains(arg) {
                it.next();
                continue;
            }

            kept.push(arg.to_string());
        }

        kept
    }
}

impl Default for ArgumentFilter {
    fn default() -> Self {
        Self::from_config(&FrontendConfig::default())
    }
}

/// Result of splitting a compile command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCommand {
    /// Arguments for re-invoking a frontend, without program name and source
    pub arguments: Vec<String>,
    /// Include search directories in declaration order, as written
    pub include_dirs: Vec<String>,
}

/// Extracts frontend arguments and include directories from compile commands
#[derive(Debug, Clone, Default)]
pub struct IncludeDirectoryExtractor {
    filter: ArgumentFilter,
}

impl IncludeDirectoryExtractor {
    /// Create an extractor using `filter`
    pub fn new(filter: ArgumentFilter) -> Self {
        Self { filter }
    }

    /// Split `command` into frontend arguments and include directories
    pub fn extract(&self, command: &CompileCommand) -> ExtractedCommand {
        let args: Vec<&String> = command.arguments_without_source().collect();

        // The program name is still at the head after filtering; it is the one
        // leading token that gets dropped.
        let arguments = self.filter.apply(&args).into_iter().skip(1).collect();

        ExtractedCommand {
            arguments,
            include_dirs: include_directories(&args),
        }
    }
}

/// Collect the `-I` search directories of an argument list.
///
/// Both `-I <dir>` and `-I<dir>` are recognized. `-I-` only changes how the
/// compiler searches and never names a directory.
pub fn include_directories<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut it = args.iter().map(AsRef::as_ref);
    let mut dirs = Vec::new();

    while let Some(arg) = it.next() {
        if arg == "-I" {
            if let Some(path) = it.next() {
                dirs.push(path.to_string());
            }
        } else if arg != "-I-" {
            if let Some(path) = arg.strip_prefix("-I") {
                dirs.push(path.to_string());
            }
        }
    }

    dirs
}

/// Collect the `-iquote` search directories of an argument list.
///
/// They only take part in the search for quoted inclusions and are never
/// include directories of the target.
pub fn quote_directories<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut it = args.iter().map(AsRef::as_ref);
    let mut dirs = Vec::new();

    while let Some(arg) = it.next() {
        if arg == "-iquote" {
            if let Some(path) = it.next() {
                dirs.push(path.to_string());
            }
        } else if let Some(path) = arg.strip_prefix("-iquote") {
            dirs.push(path.to_string());
        }
    }

    dirs
}
