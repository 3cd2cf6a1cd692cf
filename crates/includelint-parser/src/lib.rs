//! includelint Parser
//!
//! Everything between a recorded compile command and the preprocessing
//! structure of its translation unit.
//!
//! ## Modules
//!
//! - `args` - Frontend arguments and include directories of a compile command
//! - `preprocessor` - Clang preprocessor frontend
//! - `tree` - Preprocessing tree types and pre-order traversal

pub mod args;
pub mod preprocessor;
pub mod tree;

pub use args::{ArgumentFilter, ExtractedCommand, IncludeDirectoryExtractor};
pub use preprocessor::ClangFrontend;
pub use tree::{IncludeKeyword, InclusionDirective, Node, NodeKind, TranslationUnit};

use includelint_core::Result;
use std::path::Path;

/// What the frontend should record while parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Record preprocessing directives (inclusions, macro definitions)
    pub detailed_preprocessing_record: bool,
    /// Do not analyze function bodies
    pub skip_function_bodies: bool,
}

impl ParseOptions {
    /// Options for preprocessing-level analysis
    pub fn preprocessing_record() -> Self {
        Self {
            detailed_preprocessing_record: true,
            skip_function_bodies: true,
        }
    }
}

/// One translation unit to parse
#[derive(Debug, Clone, Copy)]
pub struct ParseRequest<'a> {
    /// Working directory of the original invocation
    pub directory: &'a Path,
    /// Source file, as recorded in the compile command
    pub filename: &'a str,
    /// Frontend arguments, without program name and source file
    pub arguments: &'a [String],
    pub options: ParseOptions,
}

/// Compiler frontend producing preprocessing trees
pub trait Frontend: Send + Sync {
    /// Parse a translation unit.
    ///
    /// Problems inside the translation unit are reported as diagnostics on
    /// the result; an error means the frontend could not run at all.
    fn parse(&self, request: &ParseRequest<'_>) -> Result<TranslationUnit>;

    /// Get frontend name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests;
