//! Virtual filesystem mapping
//!
//! Maps the physical paths a compiler reports while an overlay is active back
//! to the logical source paths they stand for.

use includelint_core::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A `{target, source}` pair of the flat configuration format
#[derive(Debug, Deserialize)]
struct Mapping {
    target: String,
    source: String,
}

/// Overlay descriptor as consumed by `-ivfsoverlay`
#[derive(Debug, Deserialize)]
struct Overlay {
    roots: Vec<OverlayRoot>,
}

#[derive(Debug, Deserialize)]
struct OverlayRoot {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    contents: Vec<OverlayFile>,
}

#[derive(Debug, Deserialize)]
struct OverlayFile {
    name: String,
    #[serde(rename = "external-contents")]
    external_contents: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VfsDocument {
    Mappings(Vec<Mapping>),
    Overlay(Overlay),
}

/// Physical path to logical path table
#[derive(Debug, Clone, Default)]
pub struct VirtualFilesystemResolver {
    table: HashMap<String, String>,
}

impl VirtualFilesystemResolver {
    /// Create an empty resolver; every lookup falls back to its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver from `(physical, logical)` pairs
    pub fn from_pairs<I, P, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, L)>,
        P: Into<String>,
        L: Into<String>,
    {
        Self {
            table: pairs
                .into_iter()
                .map(|(physical, logical)| (physical.into(), logical.into()))
                .collect(),
        }
    }

    /// Load either a flat `[{target, source}]` list or an overlay descriptor
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::config(path, e))?;
        Self::parse(&content).map_err(|e| Error::config(path, e))
    }

    /// Parse either supported format
    pub fn parse(json: &str) -> Result<Self> {
        let resolver = match serde_json::from_str::<VfsDocument>(json)? {
            VfsDocument::Mappings(mappings) => Self::from_pairs(
                mappings
                    .into_iter()
                    .map(|mapping| (mapping.target, mapping.source)),
            ),
            VfsDocument::Overlay(overlay) => Self::from_overlay(overlay),
        };
        Ok(resolver)
    }

    fn from_overlay(overlay: Overlay) -> Self {
        let pairs = overlay
            .roots
            .into_iter()
            .filter(|root| root.kind == "directory")
            .flat_map(|root| {
                let directory = root.name;
                root.contents.into_iter().map(move |file| {
                    let logical = Path::new(&directory).join(&file.name);
                    (file.external_contents, logical.to_string_lossy().into_owned())
                })
            });

        Self::from_pairs(pairs)
    }

    /// Logical path for `physical`, or `default` when it is not mapped
    pub fn resolve<'a>(&'a self, physical: &str, default: &'a str) -> &'a str {
        self.table.get(physical).map(String::as_str).unwrap_or(default)
    }

    /// Number of mapped files
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no file is mapped
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
