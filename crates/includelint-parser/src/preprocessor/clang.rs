//! Clang Frontend
//!
//! Runs the Clang preprocessor on a translation unit and rebuilds its
//! preprocessing tree from the annotated output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

use includelint_core::config::FrontendConfig;

use super::headers::HeaderResolver;
use super::output::parse_preprocessed;
use crate::args::{include_directories, quote_directories};
use crate::tree::{IncludeKeyword, InclusionDirective, Node, NodeKind, TranslationUnit};
use crate::{Frontend, ParseRequest};

/// Errors that prevent the frontend from running at all
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("Clang not found. Please install clang.")]
    ClangNotFound,

    #[error("failed to run {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<FrontendError> for includelint_core::Error {
    fn from(err: FrontendError) -> Self {
        includelint_core::Error::Frontend(err.to_string())
    }
}

/// Clang preprocessor frontend
pub struct ClangFrontend {
    /// Path to clang executable
    clang_path: PathBuf,
    /// Arguments placed before the compile command's own arguments
    extra_args: Vec<String>,
}

impl ClangFrontend {
    /// Create a new frontend, auto-detecting clang location
    pub fn new() -> Result<Self, FrontendError> {
        let clang_path = Self::find_clang()?;
        debug!("Found clang at: {:?}", clang_path);
        Ok(Self::with_path(clang_path))
    }

    /// Create a frontend with a specific clang path
    pub fn with_path(clang_path: PathBuf) -> Self {
        Self {
            clang_path,
            extra_args: Vec::new(),
        }
    }

    /// Create a frontend from configuration, auto-detecting clang when no path is set
    pub fn from_config(config: &FrontendConfig) -> Result<Self, FrontendError> {
        let frontend = match &config.clang_path {
            Some(path) => Self::with_path(path.clone()),
            None => Self::new()?,
        };
        Ok(frontend.with_extra_args(config.extra_args.clone()))
    }

    /// Set additional arguments
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    /// Find clang executable
    fn find_clang() -> Result<PathBuf, FrontendError> {
        let candidates = [
            "clang",
            "/usr/bin/clang",
            "/usr/local/bin/clang",
            "/opt/homebrew/bin/clang", // macOS ARM
            "/opt/homebrew/opt/llvm/bin/clang",
        ];

        for candidate in candidates {
            if let Ok(output) = Command::new(candidate).arg("--version").output() {
                if output.status.success() {
                    return Ok(PathBuf::from(candidate));
                }
            }
        }

        Err(FrontendError::ClangNotFound)
    }

    /// Get clang version
    pub fn version(&self) -> Option<String> {
        Command::new(&self.clang_path)
            .arg("--version")
            .output()
            .ok()
            .and_then(|o| {
                String::from_utf8(o.stdout)
                    .ok()
                    .and_then(|s| s.lines().next().map(|l| l.to_string()))
            })
    }

    /// Build clang command line arguments
    fn build_args(&self, request: &ParseRequest<'_>) -> Vec<String> {
        let mut args = vec!["-E".to_string()];

        // -E never reaches semantic analysis
        if !request.options.skip_function_bodies {
            debug!("Function bodies of {} are not analyzed when preprocessing", request.filename);
        }

        if request.options.detailed_preprocessing_record {
            args.push("-dI".to_string());
            args.push("-dD".to_string());
        }

        args.extend(self.extra_args.iter().cloned());
        args.extend(request.arguments.iter().cloned());
        args.push(request.filename.to_string());
        args
    }

    /// Parse diagnostics from stderr
    fn parse_diagnostics(&self, stderr: &[u8]) -> Vec<String> {
        let stderr_str = String::from_utf8_lossy(stderr);
        stderr_str
            .lines()
            .filter(|line| line.contains("warning:") || line.contains("error:"))
            .map(|s| s.to_string())
            .collect()
    }
}

/// How the compiler searched for a directive's file
#[derive(Debug, PartialEq, Eq, Hash)]
struct SearchKey {
    keyword: IncludeKeyword,
    angled: bool,
    spelling: String,
    /// Includer's directory, for searches that depend on it
    from: Option<PathBuf>,
}

impl SearchKey {
    fn new(directive: &InclusionDirective, from_file: &Path) -> Self {
        let relative = !directive.angled || directive.keyword == IncludeKeyword::IncludeNext;
        Self {
            keyword: directive.keyword,
            angled: directive.angled,
            spelling: directive.spelling.clone(),
            from: relative.then(|| from_file.parent().map(Path::to_path_buf)).flatten(),
        }
    }
}

/// Fills in the file of directives the preprocessor did not enter again.
///
/// A skipped directive searched the same way as an earlier entered one gets
/// that directive's file. Only the rest go through the header resolver.
struct SkippedInclusions<'a> {
    resolver: &'a HeaderResolver,
    opened: HashMap<SearchKey, PathBuf>,
}

impl<'a> SkippedInclusions<'a> {
    fn new(resolver: &'a HeaderResolver) -> Self {
        Self {
            resolver,
            opened: HashMap::new(),
        }
    }

    fn search(&self, directive: &InclusionDirective, from_file: &Path) -> Option<PathBuf> {
        match directive.keyword {
            IncludeKeyword::IncludeNext => {
                self.resolver
                    .resolve_next(&directive.spelling, directive.angled, from_file)
            }
            _ => self
                .resolver
                .resolve(&directive.spelling, directive.angled, Some(from_file)),
        }
    }

    fn visit(&mut self, node: &mut Node) {
        if let (NodeKind::InclusionDirective(directive), Some(location)) = (&mut node.kind, &node.location) {
            let from_file = Path::new(&location.file);
            let key = SearchKey::new(directive, from_file);

            if let Some(file) = &directive.included_file {
                self.opened.entry(key).or_insert_with(|| file.clone());
            } else {
                let resolved = match self.opened.get(&key) {
                    Some(file) => Some(file.clone()),
                    None => self.search(directive, from_file),
                };
                directive.included_file = resolved;
            }
        }

        for child in &mut node.children {
            self.visit(child);
        }
    }
}

impl Frontend for ClangFrontend {
    fn parse(&self, request: &ParseRequest<'_>) -> includelint_core::Result<TranslationUnit> {
        let args = self.build_args(request);
        debug!("Preprocessing {} in {:?} with args: {:?}", request.filename, request.directory, args);

        let output = Command::new(&self.clang_path)
            .args(&args)
            .current_dir(request.directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| FrontendError::Spawn {
                path: self.clang_path.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut tu = parse_preprocessed(&stdout, Path::new(request.filename));
        tu.diagnostics = self.parse_diagnostics(&output.stderr);

        if !output.status.success() {
            warn!(
                "{} exited with {} while preprocessing {}",
                self.clang_path.display(),
                output.status,
                request.filename
            );
        }
        for diagnostic in &tu.diagnostics {
            warn!("{}", diagnostic);
        }

        if request.options.detailed_preprocessing_record {
            let resolver = HeaderResolver::with_include_paths(
                request.directory.to_path_buf(),
                include_directories(request.arguments),
            )
            .with_quote_paths(quote_directories(request.arguments));
            SkippedInclusions::new(&resolver).visit(tu.cursor_mut());
        }

        Ok(tu)
    }

    fn name(&self) -> &str {
        "clang"
    }
}
