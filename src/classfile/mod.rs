// src/classfile/mod.rs

//! JVM class file codec
//!
//! Parses a class file into a structural [`ClassUnit`] (constant pool,
//! flags, members, raw attributes) and writes it back. Attributes are kept
//! as raw bytes, so anything this crate does not touch (code, stack maps,
//! signatures, debug tables) round-trips untouched.
//!
//! New classes are assembled with [`ClassBuilder`] and [`CodeBuilder`].

pub mod access;
pub mod annotation;
mod builder;
mod bytes;
mod code;
mod constant_pool;
pub mod descriptor;

pub use annotation::{Annotation, ElementValue};
pub use builder::ClassBuilder;
pub use code::{CodeBuilder, Invoke};
pub use constant_pool::{Constant, ConstantPool};
pub use descriptor::{FieldType, MethodDescriptor};

use bytes::{put_len16, put_u16, put_u32, ByteReader};
use thiserror::Error;

const MAGIC: u32 = 0xCAFE_BABE;

/// Class file version emitted for generated units (Java 8)
pub const GENERATED_MAJOR_VERSION: u16 = 52;

/// Errors raised while decoding or encoding class files
#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error("Unexpected end of class data at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Not a class file (magic {0:#010x})")]
    BadMagic(u32),

    #[error("Malformed modified UTF-8 in constant pool")]
    BadUtf8,

    #[error("Unknown constant pool tag {tag} at offset {offset}")]
    BadConstantTag { tag: u8, offset: usize },

    #[error("Invalid constant pool index {index}")]
    BadConstantIndex { index: u16 },

    #[error("Constant pool entry {index} is not a {expected}")]
    UnexpectedConstant { index: u16, expected: &'static str },

    #[error("Malformed descriptor: {0}")]
    BadDescriptor(String),

    #[error("Constant pool exceeds 65535 entries")]
    PoolOverflow,

    #[error("Too many {what} ({count}) for the class file format")]
    TooMany { what: &'static str, count: usize },

    #[error("Malformed class file: {0}")]
    Malformed(String),
}

/// A raw attribute: name index plus undecoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name_index: u16,
    pub info: Vec<u8>,
}

/// A field or method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl Member {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str, ClassFileError> {
        pool.utf8(self.name_index)
    }

    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str, ClassFileError> {
        pool.utf8(self.descriptor_index)
    }

    pub fn annotations(&self, pool: &ConstantPool) -> Result<Vec<Annotation>, ClassFileError> {
        annotation::annotations_in(&self.attributes, pool)
    }

    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, ClassFileError> {
        Ok(Self {
            access_flags: reader.u16()?,
            name_index: reader.u16()?,
            descriptor_index: reader.u16()?,
            attributes: parse_attributes(reader)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<(), ClassFileError> {
        put_u16(out, self.access_flags);
        put_u16(out, self.name_index);
        put_u16(out, self.descriptor_index);
        write_attributes(&self.attributes, out)
    }
}

/// Structural view of one compiled class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassUnit {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<Member>,
    pub methods: Vec<Member>,
    pub attributes: Vec<Attribute>,
}

impl ClassUnit {
    /// Decode a complete class file
    pub fn parse(data: &[u8]) -> Result<Self, ClassFileError> {
        let mut reader = ByteReader::new(data);

        let magic = reader.u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::BadMagic(magic));
        }

        let minor_version = reader.u16()?;
        let major_version = reader.u16()?;
        let constant_pool = ConstantPool::parse(&mut reader)?;
        let access_flags = reader.u16()?;
        let this_class = reader.u16()?;
        let super_class = reader.u16()?;

        let interface_count = reader.u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(reader.u16()?);
        }

        let fields = parse_members(&mut reader)?;
        let methods = parse_members(&mut reader)?;
        let attributes = parse_attributes(&mut reader)?;

        if !reader.is_empty() {
            return Err(ClassFileError::Malformed(format!(
                "trailing bytes after offset {}",
                reader.position()
            )));
        }

        let unit = Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        };
        // Fail early on a broken this_class rather than at first use
        unit.name()?;
        Ok(unit)
    }

    /// Encode back to class file bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ClassFileError> {
        let mut out = Vec::new();
        put_u32(&mut out, MAGIC);
        put_u16(&mut out, self.minor_version);
        put_u16(&mut out, self.major_version);
        self.constant_pool.write(&mut out)?;
        put_u16(&mut out, self.access_flags);
        put_u16(&mut out, self.this_class);
        put_u16(&mut out, self.super_class);

        put_len16(&mut out, self.interfaces.len(), "interfaces")?;
        for interface in &self.interfaces {
            put_u16(&mut out, *interface);
        }

        put_len16(&mut out, self.fields.len(), "fields")?;
        for field in &self.fields {
            field.write(&mut out)?;
        }
        put_len16(&mut out, self.methods.len(), "methods")?;
        for method in &self.methods {
            method.write(&mut out)?;
        }

        write_attributes(&self.attributes, &mut out)?;
        Ok(out)
    }

    /// Internal name of this class, e.g. `com/example/ExampleMod`
    pub fn name(&self) -> Result<&str, ClassFileError> {
        self.constant_pool.class_name(self.this_class)
    }

    /// Class-level annotations
    pub fn annotations(&self) -> Result<Vec<Annotation>, ClassFileError> {
        annotation::annotations_in(&self.attributes, &self.constant_pool)
    }

    pub fn find_field(&self, name: &str) -> Option<&Member> {
        self.fields
            .iter()
            .find(|f| f.name(&self.constant_pool).is_ok_and(|n| n == name))
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&Member> {
        self.methods.iter().find(|m| {
            m.name(&self.constant_pool).is_ok_and(|n| n == name)
                && m.descriptor(&self.constant_pool).is_ok_and(|d| d == descriptor)
        })
    }

    /// Locate the raw attribute with the given name
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        let pool = &self.constant_pool;
        self.attributes
            .iter_mut()
            .find(|a| pool.utf8(a.name_index).is_ok_and(|n| n == name))
    }

    /// Widen this class's own entry in its `InnerClasses` attribute to public
    ///
    /// Returns whether the entry's flags changed. Nested classes carry their
    /// source-level visibility there, and reflection reads it from there.
    pub fn widen_inner_class_entry(&mut self) -> Result<bool, ClassFileError> {
        let this_class = self.this_class;
        let Some(attribute) = self.attribute_mut("InnerClasses") else {
            return Ok(false);
        };

        let mut reader = ByteReader::new(&attribute.info);
        let count = reader.u16()? as usize;
        let mut hit = None;
        for _ in 0..count {
            let inner_class_info = reader.u16()?;
            // outer_class_info, inner_name, flags
            reader.bytes(4)?;
            let flags_offset = reader.position();
            reader.u16()?;
            if inner_class_info == this_class {
                hit = Some(flags_offset);
                break;
            }
        }

        match hit {
            Some(offset) => {
                let flags = u16::from_be_bytes([attribute.info[offset], attribute.info[offset + 1]]);
                let widened = access::widen_to_public(flags);
                attribute.info[offset..offset + 2].copy_from_slice(&widened.to_be_bytes());
                Ok(widened != flags)
            }
            None => Ok(false),
        }
    }
}

fn parse_members(reader: &mut ByteReader<'_>) -> Result<Vec<Member>, ClassFileError> {
    let count = reader.u16()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        members.push(Member::parse(reader)?);
    }
    Ok(members)
}

fn parse_attributes(reader: &mut ByteReader<'_>) -> Result<Vec<Attribute>, ClassFileError> {
    let count = reader.u16()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = reader.u16()?;
        let len = reader.u32()? as usize;
        let info = reader.bytes(len)?.to_vec();
        attributes.push(Attribute { name_index, info });
    }
    Ok(attributes)
}

fn write_attributes(attributes: &[Attribute], out: &mut Vec<u8>) -> Result<(), ClassFileError> {
    put_len16(out, attributes.len(), "attributes")?;
    for attribute in attributes {
        let len = u32::try_from(attribute.info.len())
            .map_err(|_| ClassFileError::TooMany { what: "attribute bytes", count: attribute.info.len() })?;
        put_u16(out, attribute.name_index);
        put_u32(out, len);
        out.extend_from_slice(&attribute.info);
    }
    Ok(())
}
