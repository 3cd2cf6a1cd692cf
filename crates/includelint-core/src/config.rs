//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// includelint configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analysis configuration
    pub analysis: AnalysisConfig,

    /// Frontend configuration
    pub frontend: FrontendConfig,
}

impl Config {
    /// Load a configuration file (YAML; JSON is accepted as a YAML subset)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| Error::config(path, e))
    }
}

/// Analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Extensions of sources that form a translation unit
    pub source_extensions: Vec<String>,

    /// Extensions compiled as C (receive `cflags_c`, all others `cflags_cc`)
    pub c_extensions: Vec<String>,

    /// Globs of include directories never reported as unused
    pub exclude: Vec<String>,

    /// Target types considered by `--all-targets`
    pub target_types: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            source_extensions: vec![".c".into(), ".cc".into(), ".cpp".into(), ".cxx".into()],
            c_extensions: vec![".c".into()],
            exclude: vec![],
            target_types: vec![
                "executable".into(),
                "shared_library".into(),
                "static_library".into(),
                "source_set".into(),
            ],
        }
    }
}

impl AnalysisConfig {
    /// Whether `source` is a translation unit
    pub fn is_translation_unit(&self, source: &str) -> bool {
        self.source_extensions.iter().any(|ext| source.ends_with(ext.as_str()))
    }

    /// Whether `source` is compiled as C
    pub fn is_c_source(&self, source: &str) -> bool {
        self.c_extensions.iter().any(|ext| source.ends_with(ext.as_str()))
    }
}

/// Frontend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Path to the clang executable (auto-detected when unset)
    pub clang_path: Option<PathBuf>,

    /// Arguments passed to the frontend before the command's own arguments
    pub extra_args: Vec<String>,

    /// Flags dropped from compile commands before parsing
    pub drop_flags: Vec<String>,

    /// Flags dropped together with the argument that follows them
    pub drop_flags_with_value: Vec<String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            clang_path: None,
            extra_args: vec![],
            drop_flags: [
                "--",
                "--driver-mode=g++",
                "-MD",
                "-MMD",
                "-Wall",
                "-Werror",
                "-Wextra",
                "-c",
                "-pedantic",
                "-fdata-sections",
                "-ffunction-sections",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            drop_flags_with_value: vec!["-o".into(), "-MT".into(), "-MF".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extensions() {
        let config = AnalysisConfig::default();

        assert!(config.is_translation_unit("src/main.c"));
        assert!(config.is_translation_unit("src/main.cxx"));
        assert!(!config.is_translation_unit("src/main.h"));
        assert!(config.is_c_source("src/main.c"));
        assert!(!config.is_c_source("src/main.cc"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("includelint.yaml");
        std::fs::write(
            &path,
            "analysis:\n  exclude:\n    - \"third_party/*\"\nfrontend:\n  clang_path: /opt/llvm/bin/clang\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.analysis.exclude, vec!["third_party/*"]);
        assert_eq!(config.analysis.source_extensions.len(), 4);
        assert_eq!(config.frontend.clang_path, Some(PathBuf::from("/opt/llvm/bin/clang")));
        assert!(config.frontend.drop_flags.contains(&"-MMD".to_string()));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "analysis: [").unwrap();

        assert!(matches!(Config::from_file(&path), Err(Error::Config(_))));
    }
}
