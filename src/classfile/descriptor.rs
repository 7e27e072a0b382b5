// src/classfile/descriptor.rs
//! Field and method descriptor parsing

use super::ClassFileError;

/// A single JVM field type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// One of `B C D F I J S Z`
    Base(char),
    /// `Lpkg/Name;`, stored as the internal name
    Object(String),
    /// Full array descriptor, e.g. `[I` or `[[Ljava/lang/String;`
    Array(String),
}

/// Wrapper class used to box a primitive when it crosses an `Object` boundary
pub struct Boxing {
    pub wrapper: &'static str,
    pub unbox_method: &'static str,
    pub unbox_descriptor: &'static str,
}

impl FieldType {
    /// Parse a complete field descriptor
    pub fn parse(descriptor: &str) -> Result<Self, ClassFileError> {
        let (ty, rest) = Self::parse_prefix(descriptor)?;
        if !rest.is_empty() {
            return Err(ClassFileError::BadDescriptor(descriptor.to_string()));
        }
        Ok(ty)
    }

    fn parse_prefix(input: &str) -> Result<(Self, &str), ClassFileError> {
        let bad = || ClassFileError::BadDescriptor(input.to_string());
        let first = input.chars().next().ok_or_else(bad)?;
        match first {
            'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' => Ok((FieldType::Base(first), &input[1..])),
            'L' => {
                let end = input.find(';').ok_or_else(bad)?;
                if end == 1 {
                    return Err(bad());
                }
                Ok((FieldType::Object(input[1..end].to_string()), &input[end + 1..]))
            }
            '[' => {
                let dims = input.chars().take_while(|c| *c == '[').count();
                let (_, rest) = Self::parse_prefix(&input[dims..])?;
                let consumed = input.len() - rest.len();
                Ok((FieldType::Array(input[..consumed].to_string()), rest))
            }
            _ => Err(bad()),
        }
    }

    /// The descriptor string for this type
    pub fn descriptor(&self) -> String {
        match self {
            FieldType::Base(c) => c.to_string(),
            FieldType::Object(name) => format!("L{};", name),
            FieldType::Array(desc) => desc.clone(),
        }
    }

    /// Number of local/stack slots the type occupies
    pub fn slots(&self) -> u16 {
        match self {
            FieldType::Base('J') | FieldType::Base('D') => 2,
            _ => 1,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Base(_))
    }

    /// Operand for `checkcast`/`ldc` class constants (internal name or array descriptor)
    pub fn class_constant_name(&self) -> Option<&str> {
        match self {
            FieldType::Base(_) => None,
            FieldType::Object(name) => Some(name),
            FieldType::Array(desc) => Some(desc),
        }
    }

    /// Boxing information for primitives
    pub fn boxing(&self) -> Option<Boxing> {
        let (wrapper, unbox_method, unbox_descriptor) = match self {
            FieldType::Base('B') => ("java/lang/Byte", "byteValue", "()B"),
            FieldType::Base('C') => ("java/lang/Character", "charValue", "()C"),
            FieldType::Base('D') => ("java/lang/Double", "doubleValue", "()D"),
            FieldType::Base('F') => ("java/lang/Float", "floatValue", "()F"),
            FieldType::Base('I') => ("java/lang/Integer", "intValue", "()I"),
            FieldType::Base('J') => ("java/lang/Long", "longValue", "()J"),
            FieldType::Base('S') => ("java/lang/Short", "shortValue", "()S"),
            FieldType::Base('Z') => ("java/lang/Boolean", "booleanValue", "()Z"),
            _ => return None,
        };
        Some(Boxing {
            wrapper,
            unbox_method,
            unbox_descriptor,
        })
    }

    /// Last path segment of the type name, without package
    pub fn simple_name(&self) -> &str {
        match self {
            FieldType::Object(name) => name.rsplit('/').next().unwrap_or(name),
            FieldType::Array(desc) => desc,
            FieldType::Base(_) => "primitive",
        }
    }
}

/// A parsed method descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    /// `None` for `V`
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self, ClassFileError> {
        let bad = || ClassFileError::BadDescriptor(descriptor.to_string());
        let mut rest = descriptor.strip_prefix('(').ok_or_else(bad)?;
        let mut parameters = Vec::new();

        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            let (ty, after) = FieldType::parse_prefix(rest).map_err(|_| bad())?;
            parameters.push(ty);
            rest = after;
        }

        let return_type = if rest == "V" {
            None
        } else {
            Some(FieldType::parse(rest).map_err(|_| bad())?)
        };

        Ok(Self {
            parameters,
            return_type,
        })
    }

    /// Total slots taken by the parameters (excluding any receiver)
    pub fn parameter_slots(&self) -> u16 {
        self.parameters.iter().map(FieldType::slots).sum()
    }

    pub fn return_slots(&self) -> u16 {
        self.return_type.as_ref().map(FieldType::slots).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_types() {
        assert_eq!(FieldType::parse("I").unwrap(), FieldType::Base('I'));
        assert_eq!(
            FieldType::parse("Lnet/minecraft/block/Block;").unwrap(),
            FieldType::Object("net/minecraft/block/Block".to_string())
        );
        assert_eq!(
            FieldType::parse("[[Ljava/lang/String;").unwrap(),
            FieldType::Array("[[Ljava/lang/String;".to_string())
        );
        assert!(FieldType::parse("L;").is_err());
        assert!(FieldType::parse("II").is_err());
        assert!(FieldType::parse("V").is_err());
    }

    #[test]
    fn test_parse_method_descriptor() {
        let desc = MethodDescriptor::parse("(IJ[Ljava/lang/Object;)D").unwrap();
        assert_eq!(desc.parameters.len(), 3);
        assert_eq!(desc.parameter_slots(), 4);
        assert_eq!(desc.return_slots(), 2);

        let void = MethodDescriptor::parse("(Lnet/minecraftforge/event/TickEvent;)V").unwrap();
        assert_eq!(void.return_type, None);
        assert_eq!(void.parameters[0].simple_name(), "TickEvent");

        assert!(MethodDescriptor::parse("I)V").is_err());
        assert!(MethodDescriptor::parse("(I").is_err());
    }

    #[test]
    fn test_boxing() {
        let boxing = FieldType::Base('Z').boxing().unwrap();
        assert_eq!(boxing.wrapper, "java/lang/Boolean");
        assert!(FieldType::Object("a/B".to_string()).boxing().is_none());
    }
}
