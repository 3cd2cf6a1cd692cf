//! C Preprocessor Integration
//!
//! Runs the Clang preprocessor on a translation unit and turns its annotated
//! output into a preprocessing tree.

pub mod clang;
pub mod headers;
pub mod output;

pub use clang::{ClangFrontend, FrontendError};
pub use headers::HeaderResolver;
pub use output::parse_preprocessed;
