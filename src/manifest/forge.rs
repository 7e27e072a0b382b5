// src/manifest/forge.rs
//! `META-INF/mods.toml` model

use super::ManifestError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Placeholder Forge substitutes with the jar's version at load time
pub const JAR_VERSION_PLACEHOLDER: &str = "${file.jarVersion}";

/// Parsed `mods.toml`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModsToml {
    pub mod_loader: String,
    pub loader_version: String,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default, rename = "issueTrackerURL")]
    pub issue_tracker_url: Option<String>,
    #[serde(default)]
    pub mods: Vec<ModEntry>,
    /// Dependency lists keyed by the declaring mod's id
    #[serde(default)]
    pub dependencies: BTreeMap<String, Vec<DependencyEntry>>,
}

/// One `[[mods]]` table
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModEntry {
    pub mod_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub credits: Option<String>,
    #[serde(default)]
    pub logo_file: Option<String>,
    #[serde(default, rename = "displayURL")]
    pub display_url: Option<String>,
    #[serde(default, rename = "updateJSONURL")]
    pub update_json_url: Option<String>,
}

/// One `[[dependencies.<modid>]]` table
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEntry {
    pub mod_id: String,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub version_range: Option<String>,
    #[serde(default)]
    pub ordering: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
}

impl ModsToml {
    /// Parse and validate a `mods.toml` document
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let manifest: ModsToml = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.mods.is_empty() {
            return Err(ManifestError::NoMods);
        }
        if let Some(entry) = self.mods.iter().find(|m| m.mod_id.trim().is_empty()) {
            return Err(ManifestError::UnknownModId(entry.mod_id.clone()));
        }
        Ok(())
    }

    /// The `[[mods]]` entry with the given id
    pub fn find_mod(&self, mod_id: &str) -> Option<&ModEntry> {
        self.mods.iter().find(|m| m.mod_id == mod_id)
    }

    /// Dependencies declared for the given mod id
    pub fn dependencies_of(&self, mod_id: &str) -> &[DependencyEntry] {
        self.dependencies.get(mod_id).map(Vec::as_slice).unwrap_or_default()
    }
}
