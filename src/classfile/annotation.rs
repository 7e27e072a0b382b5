// src/classfile/annotation.rs
//! Annotation decoding and encoding
//!
//! Covers the `RuntimeVisibleAnnotations` / `RuntimeInvisibleAnnotations`
//! attribute layout (JVMS 4.7.16). Parameter and type annotations are left
//! as raw attributes.

use super::bytes::{put_u16, put_u8, ByteReader};
use super::constant_pool::{Constant, ConstantPool};
use super::{Attribute, ClassFileError};

pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
pub const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";

/// Deepest `@`/`[` nesting accepted when decoding element values
pub const MAX_NESTING_DEPTH: usize = 64;

/// One decoded annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation type, e.g. `Lnet/minecraftforge/fml/common/Mod;`
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

/// An annotation element value
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Enum { type_descriptor: String, constant: String },
    /// Return descriptor of a class literal, e.g. `Ljava/lang/String;`
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl Annotation {
    pub fn new(type_descriptor: impl Into<String>) -> Self {
        Self {
            type_descriptor: type_descriptor.into(),
            elements: Vec::new(),
        }
    }

    /// Builder-style element insertion
    pub fn with(mut self, name: impl Into<String>, value: ElementValue) -> Self {
        self.elements.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ElementValue> {
        self.elements.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ElementValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ElementValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Constant name of an enum-valued element
    pub fn enum_constant(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ElementValue::Enum { constant, .. } => Some(constant),
            _ => None,
        }
    }

    /// Enum constants of an array-valued element (a lone enum counts as one)
    pub fn enum_constants(&self, name: &str) -> Option<Vec<&str>> {
        match self.get(name)? {
            ElementValue::Array(values) => Some(
                values
                    .iter()
                    .filter_map(|v| match v {
                        ElementValue::Enum { constant, .. } => Some(constant.as_str()),
                        _ => None,
                    })
                    .collect(),
            ),
            ElementValue::Enum { constant, .. } => Some(vec![constant.as_str()]),
            _ => None,
        }
    }

    fn parse(reader: &mut ByteReader<'_>, pool: &ConstantPool, depth: usize) -> Result<Self, ClassFileError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ClassFileError::Malformed("annotation nesting too deep".to_string()));
        }
        let type_descriptor = pool.utf8(reader.u16()?)?.to_string();
        let count = reader.u16()?;
        let mut elements = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = pool.utf8(reader.u16()?)?.to_string();
            let value = ElementValue::parse(reader, pool, depth + 1)?;
            elements.push((name, value));
        }
        Ok(Self {
            type_descriptor,
            elements,
        })
    }

    fn encode(&self, pool: &mut ConstantPool, out: &mut Vec<u8>) -> Result<(), ClassFileError> {
        put_u16(out, pool.add_utf8(&self.type_descriptor)?);
        super::bytes::put_len16(out, self.elements.len(), "annotation elements")?;
        for (name, value) in &self.elements {
            put_u16(out, pool.add_utf8(name)?);
            value.encode(pool, out)?;
        }
        Ok(())
    }
}

impl ElementValue {
    fn parse(reader: &mut ByteReader<'_>, pool: &ConstantPool, depth: usize) -> Result<Self, ClassFileError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ClassFileError::Malformed("annotation nesting too deep".to_string()));
        }
        let offset = reader.position();
        let tag = reader.u8()?;
        let value = match tag {
            b'B' | b'C' | b'I' | b'S' | b'Z' => {
                let index = reader.u16()?;
                let raw = match pool.get(index)? {
                    Constant::Integer(v) => *v,
                    _ => return Err(ClassFileError::UnexpectedConstant { index, expected: "Integer" }),
                };
                match tag {
                    b'B' => ElementValue::Byte(raw as i8),
                    b'C' => ElementValue::Char(raw as u16),
                    b'S' => ElementValue::Short(raw as i16),
                    b'Z' => ElementValue::Boolean(raw != 0),
                    _ => ElementValue::Int(raw),
                }
            }
            b'J' => {
                let index = reader.u16()?;
                match pool.get(index)? {
                    Constant::Long(v) => ElementValue::Long(*v),
                    _ => return Err(ClassFileError::UnexpectedConstant { index, expected: "Long" }),
                }
            }
            b'F' => {
                let index = reader.u16()?;
                match pool.get(index)? {
                    Constant::Float(bits) => ElementValue::Float(f32::from_bits(*bits)),
                    _ => return Err(ClassFileError::UnexpectedConstant { index, expected: "Float" }),
                }
            }
            b'D' => {
                let index = reader.u16()?;
                match pool.get(index)? {
                    Constant::Double(bits) => ElementValue::Double(f64::from_bits(*bits)),
                    _ => return Err(ClassFileError::UnexpectedConstant { index, expected: "Double" }),
                }
            }
            b's' => ElementValue::String(pool.utf8(reader.u16()?)?.to_string()),
            b'e' => ElementValue::Enum {
                type_descriptor: pool.utf8(reader.u16()?)?.to_string(),
                constant: pool.utf8(reader.u16()?)?.to_string(),
            },
            b'c' => ElementValue::Class(pool.utf8(reader.u16()?)?.to_string()),
            b'@' => ElementValue::Annotation(Box::new(Annotation::parse(reader, pool, depth + 1)?)),
            b'[' => {
                let count = reader.u16()?;
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push(ElementValue::parse(reader, pool, depth + 1)?);
                }
                ElementValue::Array(values)
            }
            other => {
                return Err(ClassFileError::Malformed(format!(
                    "unknown element value tag {:#04x} at offset {}",
                    other, offset
                )))
            }
        };
        Ok(value)
    }

    fn encode(&self, pool: &mut ConstantPool, out: &mut Vec<u8>) -> Result<(), ClassFileError> {
        match self {
            ElementValue::Byte(v) => {
                put_u8(out, b'B');
                put_u16(out, pool.add_integer(*v as i32)?);
            }
            ElementValue::Char(v) => {
                put_u8(out, b'C');
                put_u16(out, pool.add_integer(*v as i32)?);
            }
            ElementValue::Short(v) => {
                put_u8(out, b'S');
                put_u16(out, pool.add_integer(*v as i32)?);
            }
            ElementValue::Int(v) => {
                put_u8(out, b'I');
                put_u16(out, pool.add_integer(*v)?);
            }
            ElementValue::Boolean(v) => {
                put_u8(out, b'Z');
                put_u16(out, pool.add_integer(*v as i32)?);
            }
            ElementValue::Long(v) => {
                put_u8(out, b'J');
                put_u16(out, pool.add_long(*v)?);
            }
            ElementValue::Float(v) => {
                put_u8(out, b'F');
                put_u16(out, pool.add_float(*v)?);
            }
            ElementValue::Double(v) => {
                put_u8(out, b'D');
                put_u16(out, pool.add_double(*v)?);
            }
            ElementValue::String(s) => {
                put_u8(out, b's');
                put_u16(out, pool.add_utf8(s)?);
            }
            ElementValue::Enum {
                type_descriptor,
                constant,
            } => {
                put_u8(out, b'e');
                put_u16(out, pool.add_utf8(type_descriptor)?);
                put_u16(out, pool.add_utf8(constant)?);
            }
            ElementValue::Class(desc) => {
                put_u8(out, b'c');
                put_u16(out, pool.add_utf8(desc)?);
            }
            ElementValue::Annotation(inner) => {
                put_u8(out, b'@');
                inner.encode(pool, out)?;
            }
            ElementValue::Array(values) => {
                put_u8(out, b'[');
                super::bytes::put_len16(out, values.len(), "array element values")?;
                for value in values {
                    value.encode(pool, out)?;
                }
            }
        }
        Ok(())
    }
}

/// Decode every annotation carried by a member's (or class's) attributes
///
/// Both visible and invisible annotations are returned, visible first.
pub fn annotations_in(attributes: &[Attribute], pool: &ConstantPool) -> Result<Vec<Annotation>, ClassFileError> {
    let mut annotations = Vec::new();
    for wanted in [RUNTIME_VISIBLE_ANNOTATIONS, RUNTIME_INVISIBLE_ANNOTATIONS] {
        for attribute in attributes {
            if pool.utf8(attribute.name_index)? != wanted {
                continue;
            }
            let mut reader = ByteReader::new(&attribute.info);
            let count = reader.u16()?;
            for _ in 0..count {
                annotations.push(Annotation::parse(&mut reader, pool, 0)?);
            }
        }
    }
    Ok(annotations)
}

/// Encode annotations into a `RuntimeVisibleAnnotations` attribute
pub fn visible_annotations_attribute(
    annotations: &[Annotation],
    pool: &mut ConstantPool,
) -> Result<Attribute, ClassFileError> {
    let name_index = pool.add_utf8(RUNTIME_VISIBLE_ANNOTATIONS)?;
    let mut info = Vec::new();
    super::bytes::put_len16(&mut info, annotations.len(), "annotations")?;
    for annotation in annotations {
        annotation.encode(pool, &mut info)?;
    }
    Ok(Attribute { name_index, info })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_then_decode_nested_values() {
        let annotation = Annotation::new("Lnet/minecraftforge/fml/common/Mod$EventBusSubscriber;")
            .with("modid", ElementValue::String("examplemod".to_string()))
            .with(
                "bus",
                ElementValue::Enum {
                    type_descriptor: "Lnet/minecraftforge/fml/common/Mod$EventBusSubscriber$Bus;".to_string(),
                    constant: "MOD".to_string(),
                },
            )
            .with(
                "value",
                ElementValue::Array(vec![ElementValue::Enum {
                    type_descriptor: "Lnet/minecraftforge/api/distmarker/Dist;".to_string(),
                    constant: "CLIENT".to_string(),
                }]),
            )
            .with("weight", ElementValue::Long(-3));

        let mut pool = ConstantPool::new();
        let attribute = visible_annotations_attribute(&[annotation.clone()], &mut pool).unwrap();
        let decoded = annotations_in(&[attribute], &pool).unwrap();

        assert_eq!(decoded, vec![annotation]);
        assert_eq!(decoded[0].string("modid"), Some("examplemod"));
        assert_eq!(decoded[0].enum_constant("bus"), Some("MOD"));
        assert_eq!(decoded[0].enum_constants("value"), Some(vec!["CLIENT"]));
        assert_eq!(decoded[0].boolean("modid"), None);
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let mut pool = ConstantPool::new();
        let name_index = pool.add_utf8(RUNTIME_INVISIBLE_ANNOTATIONS).unwrap();
        let type_index = pool.add_utf8("Lcom/example/Deep;").unwrap();
        let element_index = pool.add_utf8("value").unwrap();

        // one annotation, one element, then 200k single-element arrays
        let mut info = Vec::new();
        put_u16(&mut info, 1);
        put_u16(&mut info, type_index);
        put_u16(&mut info, 1);
        put_u16(&mut info, element_index);
        for _ in 0..200_000 {
            put_u8(&mut info, b'[');
            put_u16(&mut info, 1);
        }
        put_u8(&mut info, b'[');
        put_u16(&mut info, 0);

        let err = annotations_in(&[Attribute { name_index, info }], &pool).unwrap_err();
        assert!(matches!(err, ClassFileError::Malformed(ref msg) if msg.contains("too deep")));
    }

    #[test]
    fn test_nesting_at_limit_accepted() {
        let mut value = ElementValue::Int(1);
        for _ in 0..MAX_NESTING_DEPTH - 1 {
            value = ElementValue::Array(vec![value]);
        }
        let annotation = Annotation::new("Lcom/example/Deep;").with("value", value);

        let mut pool = ConstantPool::new();
        let attribute = visible_annotations_attribute(&[annotation.clone()], &mut pool).unwrap();
        assert_eq!(annotations_in(&[attribute], &pool).unwrap(), vec![annotation]);
    }

    #[test]
    fn test_unrelated_attributes_ignored() {
        let mut pool = ConstantPool::new();
        let name_index = pool.add_utf8("Signature").unwrap();
        let other = Attribute {
            name_index,
            info: vec![0, 1],
        };
        assert!(annotations_in(&[other], &pool).unwrap().is_empty());
    }
}
