//! Translation unit walker
//!
//! Parses a translation unit and attributes each of its inclusion directives
//! to the include directory that satisfied it.

use includelint_core::{paths, CompileCommand, Result};
use includelint_index::VirtualFilesystemResolver;
use includelint_parser::{Frontend, InclusionDirective, Node, ParseOptions, ParseRequest, TranslationUnit};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Why an inclusion directive does not mark a directory as used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Directive has no source location (e.g. `-include` on the command line)
    NoLocation,
    /// The frontend did not report which file was opened
    Unresolved,
    /// Included file lies outside the analyzed tree (absolute path)
    OutsideTree,
}

/// Classification of one inclusion directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    /// Directive was satisfied through this include directory
    Used(PathBuf),
    Ignored(IgnoreReason),
}

/// Parses translation units and collects the include directories they use
pub struct TranslationUnitWalker<'a> {
    frontend: &'a dyn Frontend,
    vfs: &'a VirtualFilesystemResolver,
}

impl<'a> TranslationUnitWalker<'a> {
    /// Create a walker
    pub fn new(frontend: &'a dyn Frontend, vfs: &'a VirtualFilesystemResolver) -> Self {
        Self { frontend, vfs }
    }

    /// Parse the translation unit of `command` with the given frontend arguments
    pub fn parse(&self, command: &CompileCommand, arguments: &[String]) -> Result<TranslationUnit> {
        debug!("Parsing {} with {}", command.filename, self.frontend.name());
        self.frontend.parse(&ParseRequest {
            directory: &command.directory,
            filename: &command.filename,
            arguments,
            options: ParseOptions::preprocessing_record(),
        })
    }

    /// Attribute a single directive
    pub fn classify(&self, node: &Node, directive: &InclusionDirective) -> Inclusion {
        if node.location.is_none() {
            return Inclusion::Ignored(IgnoreReason::NoLocation);
        }

        let Some(physical) = &directive.included_file else {
            return Inclusion::Ignored(IgnoreReason::Unresolved);
        };

        if physical.is_absolute() {
            return Inclusion::Ignored(IgnoreReason::OutsideTree);
        }

        let physical = physical.to_string_lossy();
        let logical = self.vfs.resolve(&physical, &physical);
        let directory = paths::remove_suffix(logical, &directive.spelling);

        Inclusion::Used(paths::normalize(directory))
    }

    /// Include directories used by any directive of `tu`
    pub fn used_directories(&self, tu: &TranslationUnit) -> BTreeSet<PathBuf> {
        let mut used = BTreeSet::new();

        for (node, directive) in tu.inclusion_directives() {
            match self.classify(node, directive) {
                Inclusion::Used(directory) => {
                    trace!("{:?} uses {:?}", directive.spelling, directory);
                    used.insert(directory);
                }
                Inclusion::Ignored(reason) => {
                    trace!("{:?} ignored: {:?}", directive.spelling, reason);
                }
            }
        }

        debug!("{:?} uses {} include directories", tu.path(), used.len());
        used
    }
}
