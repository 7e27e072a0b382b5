// src/transform/mod.rs

//! Archive transformation orchestrator
//!
//! Walks every entry of a Forge mod jar in archive order. Class units go
//! through scan, access rewrite and shim synthesis; their per-unit output is
//! folded into a [`ModTransformationResult`] that is threaded through the
//! walk by value. Once every entry is processed the orchestrator emits the
//! initializer, converts `mods.toml` into `fabric.mod.json` and atomically
//! persists the destination jar.
//!
//! # Example
//!
//! ```no_run
//! use patchwork::transform::transform_archive;
//! use std::path::Path;
//!
//! let result = transform_archive(Path::new("examplemod.jar"), Path::new("out/examplemod.jar"))?;
//! println!("initializer: {:?}", result.initializer);
//! # Ok::<(), patchwork::transform::TransformError>(())
//! ```

pub mod archive;
mod batch;

pub use archive::{DestinationArchive, EntryKind, SourceArchive};
pub use batch::{transform_batch, transform_batch_with, ArchiveJob, ArchiveReport};

use crate::access::AccessError;
use crate::classfile::{ClassFileError, ClassUnit};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::generate::{self, GenerateError, InitializerPlan, ShimDescriptor, UnitShims};
use crate::manifest::{self, ManifestError, ModsToml};
use crate::scan::{self, CapabilityDescriptor, InjectedField, ModuleIdentity, ScanError, SubscriberClass};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info};

/// Archive path of the resource pack descriptor Forge jars carry
pub const PACK_MCMETA: &str = "pack.mcmeta";

/// What to do when a second `@Mod` class shows up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first identity and record a diagnostic
    #[default]
    FirstWins,
    /// Fail the archive
    Reject,
}

/// Knobs for one archive transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub duplicate_mod_identity: DuplicatePolicy,
    /// Copy a class that fails to parse or scan through unchanged instead of
    /// failing the archive. Invariant violations are never isolated.
    pub isolate_class_failures: bool,
    /// Drop `META-INF/*.SF|RSA|DSA|EC`
    pub strip_signatures: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            duplicate_mod_identity: DuplicatePolicy::FirstWins,
            isolate_class_failures: false,
            strip_signatures: true,
        }
    }
}

/// Coarse classification of a [`TransformError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Missing or malformed metadata in the input
    UserData,
    /// An internal contract was broken
    Invariant,
    /// Reading or writing bytes failed
    Io,
}

/// Internal contract violations; these always abort the archive
#[derive(Error, Debug)]
pub enum InvariantViolation {
    #[error("Shim name {name} (from {unit}) was already generated in this archive")]
    ShimCollision { name: String, unit: String },

    #[error("Access transformation for {unit} names a missing member: {source}")]
    UnknownMember {
        unit: String,
        #[source]
        source: AccessError,
    },

    #[error("Entry {name} was written twice")]
    DuplicateEntry { name: String },
}

impl InvariantViolation {
    pub fn unit(&self) -> Option<&str> {
        match self {
            InvariantViolation::ShimCollision { unit, .. } | InvariantViolation::UnknownMember { unit, .. } => {
                Some(unit.as_str())
            }
            InvariantViolation::DuplicateEntry { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to process class entry {entry}: {source}")]
    ClassFile {
        entry: String,
        #[source]
        source: ClassFileError,
    },

    #[error("Invalid capability metadata in {unit}: {source}")]
    Scan {
        unit: String,
        #[source]
        source: ScanError,
    },

    #[error("Failed to synthesize shims for {unit}: {source}")]
    Generate {
        unit: String,
        #[source]
        source: GenerateError,
    },

    #[error("No class in the archive is annotated with @Mod")]
    MissingModIdentity,

    #[error("Both {first} and {second} are annotated with @Mod")]
    DuplicateModIdentity { first: String, second: String },

    #[error("Class entry {entry} lies in the reserved {} package", generate::GENERATED_PACKAGE)]
    ReservedEntry { entry: String },

    #[error("Archive has no {}", manifest::MODS_TOML)]
    MissingManifest,

    #[error("Manifest conversion failed: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl TransformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransformError::Io(_) | TransformError::Archive(_) | TransformError::ClassFile { .. } => ErrorKind::Io,
            TransformError::Scan { .. }
            | TransformError::MissingModIdentity
            | TransformError::DuplicateModIdentity { .. }
            | TransformError::ReservedEntry { .. }
            | TransformError::MissingManifest
            | TransformError::Manifest(_) => ErrorKind::UserData,
            TransformError::Generate { .. } | TransformError::Invariant(_) => ErrorKind::Invariant,
        }
    }

    /// The class unit (or entry) the failure belongs to, when known
    pub fn unit(&self) -> Option<&str> {
        match self {
            TransformError::ClassFile { entry, .. } | TransformError::ReservedEntry { entry } => Some(entry.as_str()),
            TransformError::Scan { unit, source } => source.unit().or(Some(unit.as_str())),
            TransformError::Generate { unit, .. } => Some(unit.as_str()),
            TransformError::DuplicateModIdentity { second, .. } => Some(second.as_str()),
            TransformError::Invariant(violation) => violation.unit(),
            _ => None,
        }
    }
}

/// Everything one class unit contributed to the archive
#[derive(Debug)]
pub struct UnitOutput {
    pub unit_name: String,
    /// Rewritten bytes, or `None` when the unit is copied through unchanged
    pub rewritten: Option<Vec<u8>>,
    pub capabilities: Vec<CapabilityDescriptor>,
    pub shims: UnitShims,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scan, rewrite and synthesize shims for one class entry
///
/// Pure: reads nothing but `data` and writes nothing.
pub fn process_unit(entry: &str, data: &[u8]) -> Result<UnitOutput, TransformError> {
    let class_error = |source: ClassFileError| TransformError::ClassFile {
        entry: entry.to_string(),
        source,
    };

    let mut unit = ClassUnit::parse(data).map_err(class_error)?;
    let unit_name = unit.name().map_err(class_error)?.to_string();

    let outcome = scan::scan(&unit).map_err(|source| match source {
        ScanError::ClassFile(source) => class_error(source),
        source => TransformError::Scan {
            unit: unit_name.clone(),
            source,
        },
    })?;

    let mut rewritten = None;
    if !outcome.transformations.is_empty() {
        let changed = outcome.transformations.apply(&mut unit).map_err(|source| match source {
            AccessError::ClassFile(source) => class_error(source),
            source => {
                let violation = InvariantViolation::UnknownMember {
                    unit: unit_name.clone(),
                    source,
                };
                error!("{}", violation);
                TransformError::Invariant(violation)
            }
        })?;
        if changed {
            rewritten = Some(unit.to_bytes().map_err(class_error)?);
        }
    }

    let shims = generate::synthesize_unit(&unit_name, &outcome.capabilities).map_err(|source| {
        TransformError::Generate {
            unit: unit_name.clone(),
            source,
        }
    })?;

    Ok(UnitOutput {
        unit_name,
        rewritten,
        capabilities: outcome.capabilities,
        shims,
        diagnostics: outcome.diagnostics,
    })
}

/// Archive-scoped accumulator and final report
#[derive(Debug, Default, Serialize)]
pub struct ModTransformationResult {
    pub mod_identity: Option<ModuleIdentity>,
    /// `(accessor shim, field)` in archive order
    pub object_holders: Vec<(String, InjectedField)>,
    /// `(unit, subscriber class)` in archive order
    pub subscriber_classes: Vec<(String, SubscriberClass)>,
    /// `(registrar shim, owner unit)` in archive order
    pub registrars: Vec<(String, String)>,
    /// Every generated shim name, in write order
    pub generated: Vec<String>,
    #[serde(skip)]
    inventory: HashSet<String>,
    pub initializer: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub classes_scanned: usize,
    pub classes_rewritten: usize,
    pub resources_copied: usize,
}

impl ModTransformationResult {
    /// Fold one unit's output into the accumulator
    pub fn absorb(mut self, output: &UnitOutput, policy: DuplicatePolicy) -> Result<Self, TransformError> {
        self.classes_scanned += 1;
        if output.rewritten.is_some() {
            self.classes_rewritten += 1;
        }

        for capability in &output.capabilities {
            match capability {
                CapabilityDescriptor::ModuleIdentity(identity) => self.resolve_identity(identity, policy)?,
                CapabilityDescriptor::SubscriberClass(class) => {
                    self.subscriber_classes.push((output.unit_name.clone(), class.clone()));
                }
                CapabilityDescriptor::InjectedField(_) | CapabilityDescriptor::SubscriberMethod(_) => {}
            }
        }

        for shim in &output.shims.shims {
            self.record_shim(&shim.name, &output.unit_name)?;
        }
        self.object_holders.extend(output.shims.object_holders.iter().cloned());
        self.registrars.extend(output.shims.registrar.iter().cloned());
        self.diagnostics.extend(output.diagnostics.iter().cloned());
        self.diagnostics.extend(output.shims.diagnostics.iter().cloned());

        Ok(self)
    }

    fn resolve_identity(&mut self, identity: &ModuleIdentity, policy: DuplicatePolicy) -> Result<(), TransformError> {
        let Some(first) = &self.mod_identity else {
            debug!("Mod identity: {} ({})", identity.declared_id, identity.unit_name);
            self.mod_identity = Some(identity.clone());
            return Ok(());
        };

        match policy {
            DuplicatePolicy::Reject => Err(TransformError::DuplicateModIdentity {
                first: first.unit_name.clone(),
                second: identity.unit_name.clone(),
            }),
            DuplicatePolicy::FirstWins => {
                let message = format!(
                    "@Mod(\"{}\") ignored, {} already declares @Mod(\"{}\")",
                    identity.declared_id, first.unit_name, first.declared_id
                );
                self.diagnostics
                    .push(Diagnostic::new(DiagnosticKind::DuplicateModIdentity, &identity.unit_name, message).logged());
                Ok(())
            }
        }
    }

    fn record_shim(&mut self, name: &str, unit: &str) -> Result<(), TransformError> {
        if !self.inventory.insert(name.to_string()) {
            let violation = InvariantViolation::ShimCollision {
                name: name.to_string(),
                unit: unit.to_string(),
            };
            error!("{}", violation);
            return Err(violation.into());
        }
        self.generated.push(name.to_string());
        Ok(())
    }

    /// True if `name` was generated in this archive
    pub fn generated_contains(&self, name: &str) -> bool {
        self.inventory.contains(name)
    }

    fn plan(&self) -> InitializerPlan {
        InitializerPlan {
            registrars: self.registrars.clone(),
            subscriber_classes: self.subscriber_classes.iter().map(|(_, class)| class.clone()).collect(),
            object_holders: self.object_holders.clone(),
        }
    }

    /// Synthesize the initializer; requires a resolved module identity
    pub fn emit_initializer(mut self) -> Result<(Self, ShimDescriptor), TransformError> {
        let identity = self.mod_identity.clone().ok_or(TransformError::MissingModIdentity)?;
        let shim = generate::initializer::generate(&identity, &self.plan()).map_err(|source| {
            TransformError::Generate {
                unit: identity.unit_name.clone(),
                source,
            }
        })?;
        self.record_shim(&shim.name, &identity.unit_name)?;
        self.initializer = Some(shim.name.clone());
        Ok((self, shim))
    }
}

/// Per-unit findings reported by a scan-only run
#[derive(Debug, Serialize)]
pub struct UnitScan {
    pub unit: String,
    pub capabilities: Vec<CapabilityDescriptor>,
    pub access_transformations: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Transforms archives with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct ArchiveTransformer {
    options: TransformOptions,
}

impl ArchiveTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Transform `source` into a Fabric jar at `destination`
    ///
    /// Nothing is written at `destination` unless the whole archive succeeds.
    pub fn transform(&self, source: &Path, destination: &Path) -> Result<ModTransformationResult, TransformError> {
        info!("Transforming {} -> {}", source.display(), destination.display());

        let mut input = SourceArchive::open(source)?;
        let mut output = DestinationArchive::create(destination)?;
        let mut result = ModTransformationResult::default();
        let mut mods_toml = None;
        let mut jar_manifest = None;

        for index in 0..input.len() {
            let name = input.entry_name(index)?;
            match EntryKind::classify(&name) {
                EntryKind::Class => {
                    result = self.transform_class(&mut input, &mut output, index, &name, result)?;
                }
                EntryKind::Directory => output.copy_raw(&mut input, index)?,
                EntryKind::Resource => match name.as_str() {
                    manifest::MODS_TOML => mods_toml = Some(input.read_to_string(index)?),
                    PACK_MCMETA | manifest::FABRIC_MOD_JSON => debug!("Dropping {}", name),
                    _ if self.options.strip_signatures && archive::is_signature_file(&name) => {
                        debug!("Dropping signature file {}", name);
                    }
                    _ => {
                        if name == manifest::JAR_MANIFEST {
                            jar_manifest = Some(input.read_to_string(index)?);
                        }
                        output.copy_raw(&mut input, index)?;
                        result.resources_copied += 1;
                    }
                },
            }
        }

        let (result, initializer) = result.emit_initializer()?;
        let identity = result.mod_identity.clone().ok_or(TransformError::MissingModIdentity)?;
        write_shim(&mut output, &initializer, &identity.unit_name)?;

        let mods_toml = ModsToml::parse(&mods_toml.ok_or(TransformError::MissingManifest)?)?;
        let jar_version = jar_manifest.as_deref().and_then(manifest::implementation_version);
        let fabric = manifest::convert(&mods_toml, &identity.declared_id, &initializer.name, jar_version.as_deref())?;
        let json = fabric.to_json().map_err(ManifestError::from)?;
        output.write(manifest::FABRIC_MOD_JSON, json.as_bytes())?;

        output.persist()?;
        info!(
            "Transformed {}: mod '{}', {} class(es) scanned, {} rewritten, {} shim(s) generated, {} diagnostic(s)",
            source.display(),
            identity.declared_id,
            result.classes_scanned,
            result.classes_rewritten,
            result.generated.len(),
            result.diagnostics.len()
        );
        Ok(result)
    }

    fn transform_class(
        &self,
        input: &mut SourceArchive,
        output: &mut DestinationArchive,
        index: usize,
        entry: &str,
        result: ModTransformationResult,
    ) -> Result<ModTransformationResult, TransformError> {
        if is_reserved_entry(entry) {
            return Err(TransformError::ReservedEntry {
                entry: entry.to_string(),
            });
        }
        let data = input.read(index)?;
        let unit = match process_unit(entry, &data) {
            Ok(unit) => unit,
            Err(err) if self.options.isolate_class_failures && err.kind() != ErrorKind::Invariant => {
                let mut result = result;
                result.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::SkippedClass,
                        err.unit().unwrap_or(entry),
                        format!("copied unchanged after error: {}", err),
                    )
                    .logged(),
                );
                output.copy_raw(input, index)?;
                return Ok(result);
            }
            Err(err) => return Err(err),
        };

        let result = result.absorb(&unit, self.options.duplicate_mod_identity)?;

        match &unit.rewritten {
            Some(bytes) => output.write(entry, bytes)?,
            None => output.copy_raw(input, index)?,
        }
        for shim in &unit.shims.shims {
            write_shim(output, shim, &unit.unit_name)?;
        }
        if !unit.shims.shims.is_empty() {
            debug!("{}: wrote {} shim(s)", unit.unit_name, unit.shims.shims.len());
        }
        Ok(result)
    }

    /// Report what each class unit declares without writing anything
    pub fn scan(&self, source: &Path) -> Result<Vec<UnitScan>, TransformError> {
        let mut input = SourceArchive::open(source)?;
        let mut units = Vec::new();

        for index in 0..input.len() {
            let entry = input.entry_name(index)?;
            if EntryKind::classify(&entry) != EntryKind::Class {
                continue;
            }
            let data = input.read(index)?;
            let unit = ClassUnit::parse(&data).map_err(|source| TransformError::ClassFile {
                entry: entry.clone(),
                source,
            })?;
            let unit_name = unit
                .name()
                .map_err(|source| TransformError::ClassFile {
                    entry: entry.clone(),
                    source,
                })?
                .to_string();
            let outcome = scan::scan(&unit).map_err(|source| match source {
                ScanError::ClassFile(source) => TransformError::ClassFile {
                    entry: entry.clone(),
                    source,
                },
                source => TransformError::Scan {
                    unit: unit_name.clone(),
                    source,
                },
            })?;
            if outcome.is_empty() && outcome.diagnostics.is_empty() {
                continue;
            }
            units.push(UnitScan {
                unit: unit_name,
                access_transformations: outcome.transformations.len(),
                capabilities: outcome.capabilities,
                diagnostics: outcome.diagnostics,
            });
        }

        Ok(units)
    }
}

/// True for entries inside the package generated shims are written to
fn is_reserved_entry(entry: &str) -> bool {
    entry
        .strip_prefix(generate::GENERATED_PACKAGE)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn write_shim(output: &mut DestinationArchive, shim: &ShimDescriptor, unit: &str) -> Result<(), TransformError> {
    let bytes = shim.to_bytes().map_err(|source| TransformError::Generate {
        unit: unit.to_string(),
        source,
    })?;
    output.write(&shim.entry_name(), &bytes)
}

/// Transform one archive with default options
pub fn transform_archive(source: &Path, destination: &Path) -> Result<ModTransformationResult, TransformError> {
    ArchiveTransformer::default().transform(source, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::access::{ACC_FINAL, ACC_PUBLIC, ACC_STATIC, ACC_SUPER};
    use crate::classfile::{Annotation, ClassBuilder};
    use crate::scan::tests::{string, void_method};
    use crate::scan::{MOD, OBJECT_HOLDER, SUBSCRIBE_EVENT};

    fn mod_class(name: &str, id: &str) -> Vec<u8> {
        let mut builder = ClassBuilder::new(name, "java/lang/Object", ACC_PUBLIC | ACC_SUPER).unwrap();
        builder.annotation(Annotation::new(MOD).with("value", string(id)));
        builder.build().unwrap().to_bytes().unwrap()
    }

    fn holder_class(name: &str, field: &str) -> Vec<u8> {
        let mut builder = ClassBuilder::new(name, "java/lang/Object", ACC_PUBLIC | ACC_SUPER).unwrap();
        builder
            .annotated_field(
                ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
                field,
                "I",
                &[Annotation::new(OBJECT_HOLDER).with("value", string("examplemod:thing"))],
            )
            .unwrap();
        builder.build().unwrap().to_bytes().unwrap()
    }

    #[test]
    fn test_process_plain_unit_is_unchanged() {
        let mut builder = ClassBuilder::new("a/Plain", "java/lang/Object", ACC_PUBLIC | ACC_SUPER).unwrap();
        void_method(&mut builder, ACC_PUBLIC, "run", "()V");
        let data = builder.build().unwrap().to_bytes().unwrap();

        let output = process_unit("a/Plain.class", &data).unwrap();
        assert_eq!(output.unit_name, "a/Plain");
        assert!(output.rewritten.is_none());
        assert!(output.shims.shims.is_empty());
    }

    #[test]
    fn test_process_subscriber_rewrites_method() {
        let mut builder = ClassBuilder::new("a/Events", "java/lang/Object", ACC_SUPER).unwrap();
        void_method(&mut builder, ACC_STATIC, "onTick", "(La/TickEvent;)V");
        builder.annotate_last_method(&[Annotation::new(SUBSCRIBE_EVENT)]).unwrap();
        let data = builder.build().unwrap().to_bytes().unwrap();

        let output = process_unit("a/Events.class", &data).unwrap();
        let rewritten = ClassUnit::parse(output.rewritten.as_ref().unwrap()).unwrap();
        assert_ne!(rewritten.access_flags & ACC_PUBLIC, 0);
        let method = rewritten.find_method("onTick", "(La/TickEvent;)V").unwrap();
        assert_ne!(method.access_flags & ACC_PUBLIC, 0);
        // dispatch shim, then registrar
        assert_eq!(output.shims.shims.len(), 2);
        assert!(output.shims.registrar.is_some());
    }

    #[test]
    fn test_garbage_class_is_io_error() {
        let err = process_unit("a/Broken.class", b"not a class").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.unit(), Some("a/Broken.class"));
    }

    #[test]
    fn test_duplicate_identity_first_wins() {
        let first = process_unit("a/One.class", &mod_class("a/One", "one")).unwrap();
        let second = process_unit("a/Two.class", &mod_class("a/Two", "two")).unwrap();

        let result = ModTransformationResult::default()
            .absorb(&first, DuplicatePolicy::FirstWins)
            .unwrap()
            .absorb(&second, DuplicatePolicy::FirstWins)
            .unwrap();
        assert_eq!(result.mod_identity.as_ref().unwrap().declared_id, "one");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::DuplicateModIdentity);
        assert_eq!(result.diagnostics[0].unit, "a/Two");
    }

    #[test]
    fn test_duplicate_identity_reject() {
        let first = process_unit("a/One.class", &mod_class("a/One", "one")).unwrap();
        let second = process_unit("a/Two.class", &mod_class("a/Two", "two")).unwrap();

        let err = ModTransformationResult::default()
            .absorb(&first, DuplicatePolicy::Reject)
            .unwrap()
            .absorb(&second, DuplicatePolicy::Reject)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserData);
        assert!(matches!(err, TransformError::DuplicateModIdentity { ref first, ref second }
            if first == "a/One" && second == "a/Two"));
    }

    #[test]
    fn test_shim_collision_is_invariant_violation() {
        let left = process_unit("a/B.class", &holder_class("a/B", "F_ObjectHolder_G")).unwrap();
        let right = process_unit("a/B_ObjectHolder_F.class", &holder_class("a/B_ObjectHolder_F", "G")).unwrap();
        assert_eq!(left.shims.shims[0].name, right.shims.shims[0].name);

        let err = ModTransformationResult::default()
            .absorb(&left, DuplicatePolicy::FirstWins)
            .unwrap()
            .absorb(&right, DuplicatePolicy::FirstWins)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
        assert_eq!(err.unit(), Some("a/B_ObjectHolder_F"));
    }

    #[test]
    fn test_reserved_entries() {
        assert!(is_reserved_entry("patchwork_generated/a/MainInitializer.class"));
        assert!(!is_reserved_entry("patchwork_generatedx/a/Main.class"));
        assert!(!is_reserved_entry("a/patchwork_generated/Main.class"));

        let err = TransformError::ReservedEntry {
            entry: "patchwork_generated/a/Main.class".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UserData);
        assert_eq!(err.unit(), Some("patchwork_generated/a/Main.class"));
    }

    #[test]
    fn test_initializer_requires_identity() {
        let err = ModTransformationResult::default().emit_initializer().unwrap_err();
        assert!(matches!(err, TransformError::MissingModIdentity));
        assert_eq!(err.kind(), ErrorKind::UserData);
    }

    #[test]
    fn test_initializer_is_recorded() {
        let unit = process_unit("a/Main.class", &mod_class("a/Main", "examplemod")).unwrap();
        let result = ModTransformationResult::default()
            .absorb(&unit, DuplicatePolicy::FirstWins)
            .unwrap();
        let (result, shim) = result.emit_initializer().unwrap();
        assert_eq!(shim.name, "patchwork_generated/a/MainInitializer");
        assert_eq!(result.initializer.as_deref(), Some(shim.name.as_str()));
        assert!(result.generated_contains(&shim.name));
    }
}
