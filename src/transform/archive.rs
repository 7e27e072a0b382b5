// src/transform/archive.rs
//! Zip adapter for source and destination archives
//!
//! The destination is written to a temporary file next to the requested
//! path and only renamed into place by [`DestinationArchive::persist`].
//! Dropping an unpersisted destination deletes the temporary file.

use super::{InvariantViolation, TransformError};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Largest buffer preallocated from an entry's declared size
const MAX_SIZE_HINT: u64 = 1 << 24;

/// What an archive entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Class,
    Resource,
}

impl EntryKind {
    pub fn classify(name: &str) -> Self {
        if name.ends_with('/') {
            EntryKind::Directory
        } else if name.ends_with(".class") && !name.starts_with("META-INF/") {
            EntryKind::Class
        } else {
            EntryKind::Resource
        }
    }
}

/// Jar signature files, which rewritten classes invalidate
pub fn is_signature_file(name: &str) -> bool {
    let Some(file) = name.strip_prefix("META-INF/") else {
        return false;
    };
    if file.contains('/') {
        return false;
    }
    let upper = file.to_ascii_uppercase();
    [".SF", ".RSA", ".DSA", ".EC"].iter().any(|ext| upper.ends_with(ext))
}

/// A jar opened for reading
pub struct SourceArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl SourceArchive {
    pub fn open(path: &Path) -> Result<Self, TransformError> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;
        debug!("Opened {} ({} entries)", path.display(), archive.len());
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    pub fn entry_name(&mut self, index: usize) -> Result<String, TransformError> {
        Ok(self.archive.by_index_raw(index)?.name().to_string())
    }

    /// Decompressed contents of one entry
    pub fn read(&mut self, index: usize) -> Result<Vec<u8>, TransformError> {
        let mut entry = self.archive.by_index(index)?;
        // declared sizes are untrusted; cap the preallocation
        let mut data = Vec::with_capacity(entry.size().min(MAX_SIZE_HINT) as usize);
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    pub fn read_to_string(&mut self, index: usize) -> Result<String, TransformError> {
        let data = self.read(index)?;
        String::from_utf8(data).map_err(|e| {
            TransformError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

/// A jar being assembled in a temporary file
pub struct DestinationArchive {
    path: PathBuf,
    writer: ZipWriter<NamedTempFile>,
    written: HashSet<String>,
}

impl DestinationArchive {
    pub fn create(path: &Path) -> Result<Self, TransformError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file = NamedTempFile::new_in(parent)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: ZipWriter::new(file),
            written: HashSet::new(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.written.contains(name)
    }

    fn claim(&mut self, name: &str) -> Result<(), TransformError> {
        if !self.written.insert(name.to_string()) {
            return Err(InvariantViolation::DuplicateEntry {
                name: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Write a new deflated entry
    pub fn write(&mut self, name: &str, data: &[u8]) -> Result<(), TransformError> {
        self.claim(name)?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(name, options)?;
        self.writer.write_all(data)?;
        Ok(())
    }

    /// Copy an entry without recompressing it
    pub fn copy_raw(&mut self, source: &mut SourceArchive, index: usize) -> Result<(), TransformError> {
        let entry = source.archive.by_index_raw(index)?;
        self.claim(entry.name())?;
        self.writer.raw_copy_file(entry)?;
        Ok(())
    }

    /// Finish the archive and move it to its final path
    pub fn persist(self) -> Result<PathBuf, TransformError> {
        let file = self.writer.finish()?;
        file.persist(&self.path).map_err(|e| TransformError::Io(e.error))?;
        debug!("Wrote {} ({} entries)", self.path.display(), self.written.len());
        Ok(self.path)
    }
}
