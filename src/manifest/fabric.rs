// src/manifest/fabric.rs
//! `fabric.mod.json` model

use super::version_range::VersionPredicate;
use serde::Serialize;
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: u32 = 1;

/// Entrypoint key the Patchwork loader plugin reads
pub const PATCHWORK_ENTRYPOINT: &str = "patchwork";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FabricModJson {
    pub schema_version: u32,
    pub id: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub contact: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub environment: String,
    pub entrypoints: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub depends: BTreeMap<String, VersionPredicate>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub suggests: BTreeMap<String, VersionPredicate>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl FabricModJson {
    /// Pretty-printed JSON document
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Entrypoints declared under the `patchwork` key
    pub fn patchwork_entrypoints(&self) -> &[String] {
        self.entrypoints
            .get(PATCHWORK_ENTRYPOINT)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
