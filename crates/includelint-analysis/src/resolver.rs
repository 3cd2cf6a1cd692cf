//! Compile command selection
//!
//! A source may have several recorded compile commands (different toolchains,
//! variants). The one analyzed is the first whose arguments contain every
//! flag the build description implies for the target. Two commands with an
//! identical projection onto those flags cannot be told apart; the first wins.

use includelint_core::config::AnalysisConfig;
use includelint_core::{paths, CompileCommand, Error, Result};
use includelint_index::{CompilationDatabase, TargetDescription};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Flags a compile command must contain to belong to a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFlags(Vec<String>);

impl RequiredFlags {
    /// Flags implied by `target` for one of its sources
    pub fn for_source(target: &TargetDescription, source: &str, config: &AnalysisConfig) -> Self {
        let mut flags: Vec<String> = target.defines.iter().map(|d| format!("-D{}", d)).collect();

        // Compilation databases never carry trailing separators, even when the
        // build description does.
        flags.extend(
            target
                .include_dirs
                .iter()
                .map(|dir| format!("-I{}", paths::normalize(dir).display())),
        );
        flags.extend(target.cflags.iter().cloned());

        if config.is_c_source(source) {
            flags.extend(target.cflags_c.iter().cloned());
        } else {
            flags.extend(target.cflags_cc.iter().cloned());
        }

        Self(flags)
    }

    /// Flags in derivation order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Selects the compile command of a source that matches the build description
pub struct CompileCommandResolver<'a> {
    database: &'a CompilationDatabase,
}

impl<'a> CompileCommandResolver<'a> {
    /// Create a resolver over `database`
    pub fn new(database: &'a CompilationDatabase) -> Self {
        Self { database }
    }

    /// First candidate for `source` containing every required flag verbatim
    pub fn resolve(&self, source: &Path, required: &RequiredFlags) -> Result<&'a CompileCommand> {
        let candidates = self.database.commands_for(source);
        debug!("{} compile command candidates for {:?}", candidates.len(), source);

        for (index, candidate) in candidates.iter().enumerate() {
            let arguments: HashSet<&str> = candidate
                .arguments_without_source()
                .map(String::as_str)
                .collect();

            match required.iter().find(|flag| !arguments.contains(flag)) {
                None => {
                    debug!("Selected candidate {} for {:?}", index, source);
                    return Ok(candidate);
                }
                Some(missing) => debug!("Candidate {} lacks {}", index, missing),
            }
        }

        Err(Error::Resolution(source.to_path_buf()))
    }
}
