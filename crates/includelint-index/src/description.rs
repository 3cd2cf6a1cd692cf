//! Build description
//!
//! Typed view of the GN description JSON (`gn desc --format=json`): one entry
//! per target label with its sources, include directories, defines and flags.

use crate::label;
use includelint_core::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Description of a single build target
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetDescription {
    /// Target type, e.g. `static_library`
    #[serde(rename = "type")]
    pub kind: String,
    pub sources: Vec<String>,
    pub include_dirs: Vec<String>,
    pub defines: Vec<String>,
    pub cflags: Vec<String>,
    pub cflags_c: Vec<String>,
    pub cflags_cc: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl TargetDescription {
    /// Name of the entity used in diagnostics.
    ///
    /// The first `metadata.template` entry when present, the target type otherwise.
    pub fn entity(&self) -> &str {
        self.metadata
            .get("template")
            .and_then(|value| value.as_array())
            .and_then(|items| items.first())
            .and_then(|item| item.as_str())
            .unwrap_or(&self.kind)
    }
}

/// Build description: target label to target description
#[derive(Debug, Clone, Default)]
pub struct Description {
    targets: BTreeMap<String, TargetDescription>,
}

impl Description {
    /// Load a description file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::config(path, e))?;
        let description = Self::parse(&content).map_err(|e| Error::config(path, e))?;
        debug!("Loaded {} targets from {:?}", description.len(), path);
        Ok(description)
    }

    /// Parse description JSON
    pub fn parse(json: &str) -> Result<Self> {
        Ok(Self {
            targets: serde_json::from_str(json)?,
        })
    }

    /// Create a description from labelled targets
    pub fn from_targets(targets: impl IntoIterator<Item = (String, TargetDescription)>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
        }
    }

    /// Look up a target; a toolchain suffix on `label` is ignored
    pub fn get(&self, label: &str) -> Result<&TargetDescription> {
        self.targets
            .get(label::remove_toolchain(label))
            .ok_or_else(|| Error::UnknownTarget(label.to_string()))
    }

    /// Targets in label order
    pub fn items(&self) -> impl Iterator<Item = (&str, &TargetDescription)> {
        self.targets.iter().map(|(label, target)| (label.as_str(), target))
    }

    /// A description consisting only of targets for which `predicate` is true
    pub fn get_if<F>(&self, predicate: F) -> Self
    where
        F: Fn(&TargetDescription) -> bool,
    {
        Self {
            targets: self
                .targets
                .iter()
                .filter(|(_, target)| predicate(target))
                .map(|(label, target)| (label.clone(), target.clone()))
                .collect(),
        }
    }

    /// Number of targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the description has no targets
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
