// src/lib.rs

//! Patchwork: Forge mod jars to Fabric
//!
//! Rewrites a Forge mod archive so it loads on Fabric with the Patchwork
//! runtime. Forge's declarative annotations are read once, ahead of time,
//! and turned into generated classes that perform the same registrations
//! at mod initialization.
//!
//! # Architecture
//!
//! - `classfile`: JVM class file codec and builders for generated classes
//! - `access`: visibility and finality changes applied to a class unit
//! - `scan`: single-pass capability detection over a unit's annotations
//! - `generate`: accessor, dispatch, registrar and initializer shims
//! - `manifest`: `mods.toml` to `fabric.mod.json`
//! - `transform`: the per-archive orchestrator and the batch driver
//!
//! Inputs are expected to be remapped to the target names already.

pub mod access;
pub mod classfile;
pub mod config;
pub mod diagnostic;
mod error;
pub mod generate;
pub mod manifest;
pub mod scan;
pub mod transform;

pub use config::{ConfigError, PatchworkConfig};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{Error, Result};
pub use scan::CapabilityDescriptor;
pub use transform::{
    transform_archive, transform_batch, ArchiveJob, ArchiveReport, ArchiveTransformer, DuplicatePolicy, ErrorKind,
    ModTransformationResult, TransformError, TransformOptions,
};
