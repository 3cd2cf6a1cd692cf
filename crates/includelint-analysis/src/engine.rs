//! Unused include directory analysis of one build target

use crate::resolver::{CompileCommandResolver, RequiredFlags};
use crate::walker::TranslationUnitWalker;
use includelint_core::config::AnalysisConfig;
use includelint_core::{paths, Result};
use includelint_index::{CompilationDatabase, TargetDescription, VirtualFilesystemResolver, Workspace};
use includelint_parser::{Frontend, IncludeDirectoryExtractor};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Include directories a target provides and uses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeUsage {
    /// Directories passed to the compiler with `-I`
    pub provided: BTreeSet<PathBuf>,
    /// Directories that satisfied at least one inclusion directive
    pub used: BTreeSet<PathBuf>,
}

impl IncludeUsage {
    /// Provided directories that no directive used
    pub fn unused(&self) -> BTreeSet<PathBuf> {
        self.provided.difference(&self.used).cloned().collect()
    }
}

/// Orchestrates command resolution, extraction and parsing for a target.
///
/// The engine keeps no state between [`AnalysisEngine::analyze`] calls.
pub struct AnalysisEngine<'a> {
    database: &'a CompilationDatabase,
    vfs: &'a VirtualFilesystemResolver,
    frontend: &'a dyn Frontend,
    workspace: &'a Workspace,
    extractor: IncludeDirectoryExtractor,
    config: AnalysisConfig,
}

impl<'a> AnalysisEngine<'a> {
    /// Create an engine with the default extractor and configuration
    pub fn new(
        database: &'a CompilationDatabase,
        vfs: &'a VirtualFilesystemResolver,
        frontend: &'a dyn Frontend,
        workspace: &'a Workspace,
    ) -> Self {
        Self {
            database,
            vfs,
            frontend,
            workspace,
            extractor: IncludeDirectoryExtractor::default(),
            config: AnalysisConfig::default(),
        }
    }

    /// Use a specific extractor
    pub fn with_extractor(mut self, extractor: IncludeDirectoryExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Use a specific analysis configuration
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Collect provided and used include directories over all translation units of `target`.
    ///
    /// Fails on the first source without a matching compile command; no
    /// partial result is returned.
    pub fn analyze(&self, target: &TargetDescription) -> Result<IncludeUsage> {
        let resolver = CompileCommandResolver::new(self.database);
        let walker = TranslationUnitWalker::new(self.frontend, self.vfs);
        let mut usage = IncludeUsage::default();

        let sources = target
            .sources
            .iter()
            .filter(|source| self.config.is_translation_unit(source));

        for source in sources {
            let path = self.workspace.source_path(source)?;
            let required = RequiredFlags::for_source(target, source, &self.config);
            let command = resolver.resolve(&path, &required)?;

            let extracted = self.extractor.extract(command);
            debug!("{} declares include directories {:?}", source, extracted.include_dirs);
            usage
                .provided
                .extend(extracted.include_dirs.iter().map(paths::normalize));

            let tu = walker.parse(command, &extracted.arguments)?;
            usage.used.extend(walker.used_directories(&tu));
        }

        info!(
            "{} provided, {} used include directories",
            usage.provided.len(),
            usage.used.len()
        );

        Ok(usage)
    }
}
