// src/error.rs
//! Crate-level error type

use thiserror::Error;

/// Any failure a patchwork library call can report
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    ClassFile(#[from] crate::classfile::ClassFileError),

    #[error(transparent)]
    Access(#[from] crate::access::AccessError),

    #[error(transparent)]
    Scan(#[from] crate::scan::ScanError),

    #[error(transparent)]
    Generate(#[from] crate::generate::GenerateError),

    #[error(transparent)]
    Manifest(#[from] crate::manifest::ManifestError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Transform(#[from] crate::transform::TransformError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
