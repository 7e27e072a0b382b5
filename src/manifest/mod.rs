// src/manifest/mod.rs

//! Manifest conversion
//!
//! Rewrites a Forge `META-INF/mods.toml` into a Fabric `fabric.mod.json`
//! whose `patchwork` entrypoint is the generated initializer.

mod fabric;
mod forge;
pub mod version_range;

pub use fabric::{FabricModJson, PATCHWORK_ENTRYPOINT, SCHEMA_VERSION};
pub use forge::{DependencyEntry, ModEntry, ModsToml, JAR_VERSION_PLACEHOLDER};
pub use version_range::VersionPredicate;

use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Archive path of the Forge manifest
pub const MODS_TOML: &str = "META-INF/mods.toml";
/// Archive path of the Fabric manifest
pub const FABRIC_MOD_JSON: &str = "fabric.mod.json";
/// Archive path of the jar manifest
pub const JAR_MANIFEST: &str = "META-INF/MANIFEST.MF";

/// Version used when neither mods.toml nor MANIFEST.MF provides one
pub const FALLBACK_VERSION: &str = "0.0.0";

/// Forge dependencies that have a different name on Fabric
const RENAMED_DEPENDENCIES: &[(&str, &str)] = &[("forge", "patchwork")];

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to parse mods.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("mods.toml declares no [[mods]]")]
    NoMods,

    #[error("mods.toml has no [[mods]] entry for '{0}'")]
    UnknownModId(String),

    #[error("Invalid version range '{range}': {reason}")]
    BadVersionRange { range: String, reason: String },

    #[error("Failed to serialize fabric.mod.json: {0}")]
    Json(#[from] serde_json::Error),
}

/// `Implementation-Version` from a jar manifest, if present
pub fn implementation_version(manifest_mf: &str) -> Option<String> {
    manifest_mf.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == "Implementation-Version")
            .then(|| value.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Build the Fabric manifest for `mod_id`
///
/// `entrypoint` is the initializer's internal name; `jar_version` replaces
/// the `${file.jarVersion}` placeholder.
pub fn convert(
    manifest: &ModsToml,
    mod_id: &str,
    entrypoint: &str,
    jar_version: Option<&str>,
) -> Result<FabricModJson, ManifestError> {
    let entry = manifest
        .find_mod(mod_id)
        .ok_or_else(|| ManifestError::UnknownModId(mod_id.to_string()))?;

    let version = match entry.version.as_deref() {
        None | Some(JAR_VERSION_PLACEHOLDER) => jar_version.unwrap_or(FALLBACK_VERSION).to_string(),
        Some(version) => version.to_string(),
    };

    let authors = entry
        .authors
        .as_deref()
        .map(|a| {
            a.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut contact = BTreeMap::new();
    if let Some(homepage) = &entry.display_url {
        contact.insert("homepage".to_string(), homepage.clone());
    }
    if let Some(issues) = &manifest.issue_tracker_url {
        contact.insert("issues".to_string(), issues.clone());
    }

    let mut depends = BTreeMap::new();
    let mut suggests = BTreeMap::new();
    for dependency in manifest.dependencies_of(mod_id) {
        let (id, predicate) = convert_dependency(dependency)?;
        if dependency.mandatory {
            depends.insert(id, predicate);
        } else {
            suggests.insert(id, predicate);
        }
    }

    let mut source = json!({
        "modLoader": manifest.mod_loader,
        "loaderVersion": manifest.loader_version,
    });
    if let Some(update_url) = &entry.update_json_url {
        source["updateJSONURL"] = json!(update_url);
    }
    if let Some(credits) = &entry.credits {
        source["credits"] = json!(credits);
    }
    let mut custom = BTreeMap::new();
    custom.insert("patchwork:source".to_string(), source);

    let mut entrypoints = BTreeMap::new();
    entrypoints.insert(PATCHWORK_ENTRYPOINT.to_string(), vec![entrypoint.replace('/', ".")]);

    Ok(FabricModJson {
        schema_version: SCHEMA_VERSION,
        id: entry.mod_id.clone(),
        version,
        name: entry.display_name.clone(),
        description: entry.description.as_deref().map(str::trim).map(str::to_string),
        authors,
        contact,
        license: manifest.license.clone(),
        icon: entry.logo_file.clone(),
        environment: "*".to_string(),
        entrypoints,
        depends,
        suggests,
        custom,
    })
}

fn convert_dependency(dependency: &DependencyEntry) -> Result<(String, VersionPredicate), ManifestError> {
    if let Some((_, renamed)) = RENAMED_DEPENDENCIES.iter().find(|(from, _)| *from == dependency.mod_id) {
        // Forge's own version numbers mean nothing to the replacement runtime
        return Ok((renamed.to_string(), VersionPredicate::any_version()));
    }
    let predicate = version_range::convert(dependency.version_range.as_deref().unwrap_or(""))?;
    Ok((dependency.mod_id.clone(), predicate))
}
