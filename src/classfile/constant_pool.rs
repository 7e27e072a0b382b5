// src/classfile/constant_pool.rs
//! Class file constant pool
//!
//! Entries are kept in their on-disk order so that an untouched pool
//! serializes back to the same bytes. Index 0 and the second slot of
//! `Long`/`Double` entries hold [`Constant::Unusable`].

use super::bytes::{decode_modified_utf8, encode_modified_utf8, put_u16, put_u32, put_u64, put_u8, ByteReader};
use super::ClassFileError;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELD_REF: u8 = 9;
const TAG_METHOD_REF: u8 = 10;
const TAG_INTERFACE_METHOD_REF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// One constant pool entry
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Unusable,
    Utf8(String),
    Integer(i32),
    /// Raw IEEE-754 bits, kept as bits so NaN payloads survive
    Float(u32),
    Long(i64),
    Double(u64),
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { reference_kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
}

impl Constant {
    fn is_wide(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    /// Create an empty pool (only the reserved slot 0)
    pub fn new() -> Self {
        Self {
            entries: vec![Constant::Unusable],
        }
    }

    /// Number of slots including the reserved slot 0
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub(crate) fn parse(reader: &mut ByteReader<'_>) -> Result<Self, ClassFileError> {
        let count = reader.u16()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let offset = reader.position();
            let tag = reader.u8()?;
            let constant = match tag {
                TAG_UTF8 => {
                    let len = reader.u16()? as usize;
                    Constant::Utf8(decode_modified_utf8(reader.bytes(len)?)?)
                }
                TAG_INTEGER => Constant::Integer(reader.u32()? as i32),
                TAG_FLOAT => Constant::Float(reader.u32()?),
                TAG_LONG => Constant::Long(reader.u64()? as i64),
                TAG_DOUBLE => Constant::Double(reader.u64()?),
                TAG_CLASS => Constant::Class { name_index: reader.u16()? },
                TAG_STRING => Constant::String { string_index: reader.u16()? },
                TAG_FIELD_REF => Constant::FieldRef {
                    class_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                TAG_METHOD_REF => Constant::MethodRef {
                    class_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                TAG_INTERFACE_METHOD_REF => Constant::InterfaceMethodRef {
                    class_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                TAG_NAME_AND_TYPE => Constant::NameAndType {
                    name_index: reader.u16()?,
                    descriptor_index: reader.u16()?,
                },
                TAG_METHOD_HANDLE => Constant::MethodHandle {
                    reference_kind: reader.u8()?,
                    reference_index: reader.u16()?,
                },
                TAG_METHOD_TYPE => Constant::MethodType { descriptor_index: reader.u16()? },
                TAG_DYNAMIC => Constant::Dynamic {
                    bootstrap_method_attr_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                TAG_INVOKE_DYNAMIC => Constant::InvokeDynamic {
                    bootstrap_method_attr_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                TAG_MODULE => Constant::Module { name_index: reader.u16()? },
                TAG_PACKAGE => Constant::Package { name_index: reader.u16()? },
                other => return Err(ClassFileError::BadConstantTag { tag: other, offset }),
            };

            let wide = constant.is_wide();
            entries.push(constant);
            if wide {
                entries.push(Constant::Unusable);
            }
        }

        if entries.len() != count.max(1) {
            // A trailing long/double overflowed the declared count
            return Err(ClassFileError::Malformed("constant pool count mismatch".to_string()));
        }

        Ok(Self { entries })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) -> Result<(), ClassFileError> {
        let count = u16::try_from(self.entries.len()).map_err(|_| ClassFileError::PoolOverflow)?;
        put_u16(out, count);

        for constant in &self.entries[1..] {
            match constant {
                Constant::Unusable => {}
                Constant::Utf8(text) => {
                    let bytes = encode_modified_utf8(text);
                    let len = u16::try_from(bytes.len())
                        .map_err(|_| ClassFileError::TooMany { what: "utf8 bytes", count: bytes.len() })?;
                    put_u8(out, TAG_UTF8);
                    put_u16(out, len);
                    out.extend_from_slice(&bytes);
                }
                Constant::Integer(v) => {
                    put_u8(out, TAG_INTEGER);
                    put_u32(out, *v as u32);
                }
                Constant::Float(bits) => {
                    put_u8(out, TAG_FLOAT);
                    put_u32(out, *bits);
                }
                Constant::Long(v) => {
                    put_u8(out, TAG_LONG);
                    put_u64(out, *v as u64);
                }
                Constant::Double(bits) => {
                    put_u8(out, TAG_DOUBLE);
                    put_u64(out, *bits);
                }
                Constant::Class { name_index } => {
                    put_u8(out, TAG_CLASS);
                    put_u16(out, *name_index);
                }
                Constant::String { string_index } => {
                    put_u8(out, TAG_STRING);
                    put_u16(out, *string_index);
                }
                Constant::FieldRef { class_index, name_and_type_index } => {
                    put_u8(out, TAG_FIELD_REF);
                    put_u16(out, *class_index);
                    put_u16(out, *name_and_type_index);
                }
                Constant::MethodRef { class_index, name_and_type_index } => {
                    put_u8(out, TAG_METHOD_REF);
                    put_u16(out, *class_index);
                    put_u16(out, *name_and_type_index);
                }
                Constant::InterfaceMethodRef { class_index, name_and_type_index } => {
                    put_u8(out, TAG_INTERFACE_METHOD_REF);
                    put_u16(out, *class_index);
                    put_u16(out, *name_and_type_index);
                }
                Constant::NameAndType { name_index, descriptor_index } => {
                    put_u8(out, TAG_NAME_AND_TYPE);
                    put_u16(out, *name_index);
                    put_u16(out, *descriptor_index);
                }
                Constant::MethodHandle { reference_kind, reference_index } => {
                    put_u8(out, TAG_METHOD_HANDLE);
                    put_u8(out, *reference_kind);
                    put_u16(out, *reference_index);
                }
                Constant::MethodType { descriptor_index } => {
                    put_u8(out, TAG_METHOD_TYPE);
                    put_u16(out, *descriptor_index);
                }
                Constant::Dynamic { bootstrap_method_attr_index, name_and_type_index } => {
                    put_u8(out, TAG_DYNAMIC);
                    put_u16(out, *bootstrap_method_attr_index);
                    put_u16(out, *name_and_type_index);
                }
                Constant::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index } => {
                    put_u8(out, TAG_INVOKE_DYNAMIC);
                    put_u16(out, *bootstrap_method_attr_index);
                    put_u16(out, *name_and_type_index);
                }
                Constant::Module { name_index } => {
                    put_u8(out, TAG_MODULE);
                    put_u16(out, *name_index);
                }
                Constant::Package { name_index } => {
                    put_u8(out, TAG_PACKAGE);
                    put_u16(out, *name_index);
                }
            }
        }

        Ok(())
    }

    /// Fetch the entry at `index`
    pub fn get(&self, index: u16) -> Result<&Constant, ClassFileError> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(ClassFileError::BadConstantIndex { index }),
            Some(constant) => Ok(constant),
        }
    }

    /// Resolve a `CONSTANT_Utf8` entry
    pub fn utf8(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index)? {
            Constant::Utf8(text) => Ok(text),
            _ => Err(ClassFileError::UnexpectedConstant { index, expected: "Utf8" }),
        }
    }

    /// Resolve a `CONSTANT_Class` entry to its internal name
    pub fn class_name(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassFileError::UnexpectedConstant { index, expected: "Class" }),
        }
    }

    fn push(&mut self, constant: Constant) -> Result<u16, ClassFileError> {
        if let Some(found) = self.entries.iter().position(|c| *c == constant) {
            return Ok(found as u16);
        }

        let wide = constant.is_wide();
        let needed = self.entries.len() + if wide { 2 } else { 1 };
        if needed > u16::MAX as usize {
            return Err(ClassFileError::PoolOverflow);
        }

        let index = self.entries.len() as u16;
        self.entries.push(constant);
        if wide {
            self.entries.push(Constant::Unusable);
        }
        Ok(index)
    }

    pub fn add_utf8(&mut self, text: &str) -> Result<u16, ClassFileError> {
        self.push(Constant::Utf8(text.to_string()))
    }

    pub fn add_class(&mut self, internal_name: &str) -> Result<u16, ClassFileError> {
        let name_index = self.add_utf8(internal_name)?;
        self.push(Constant::Class { name_index })
    }

    pub fn add_string(&mut self, value: &str) -> Result<u16, ClassFileError> {
        let string_index = self.add_utf8(value)?;
        self.push(Constant::String { string_index })
    }

    pub fn add_integer(&mut self, value: i32) -> Result<u16, ClassFileError> {
        self.push(Constant::Integer(value))
    }

    pub fn add_long(&mut self, value: i64) -> Result<u16, ClassFileError> {
        self.push(Constant::Long(value))
    }

    pub fn add_float(&mut self, value: f32) -> Result<u16, ClassFileError> {
        self.push(Constant::Float(value.to_bits()))
    }

    pub fn add_double(&mut self, value: f64) -> Result<u16, ClassFileError> {
        self.push(Constant::Double(value.to_bits()))
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16, ClassFileError> {
        let name_index = self.add_utf8(name)?;
        let descriptor_index = self.add_utf8(descriptor)?;
        self.push(Constant::NameAndType { name_index, descriptor_index })
    }

    pub fn add_field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16, ClassFileError> {
        let class_index = self.add_class(owner)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.push(Constant::FieldRef { class_index, name_and_type_index })
    }

    pub fn add_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16, ClassFileError> {
        let class_index = self.add_class(owner)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.push(Constant::MethodRef { class_index, name_and_type_index })
    }

    pub fn add_interface_method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, ClassFileError> {
        let class_index = self.add_class(owner)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.push(Constant::InterfaceMethodRef { class_index, name_and_type_index })
    }
}
