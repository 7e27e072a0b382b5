// src/classfile/code.rs
//! Straight-line bytecode emission
//!
//! Only what the shim generators need: loads, field access, invocations,
//! object creation, casts and constants. No branches are ever emitted, so no
//! `StackMapTable` is required for version 52 class files.

use super::bytes::{put_u16, put_u32, put_u8};
use super::constant_pool::ConstantPool;
use super::descriptor::{FieldType, MethodDescriptor};
use super::{Attribute, ClassFileError};

mod op {
    pub const ICONST_0: u8 = 0x03;
    pub const LDC: u8 = 0x12;
    pub const LDC_W: u8 = 0x13;
    pub const ILOAD: u8 = 0x15;
    pub const LLOAD: u8 = 0x16;
    pub const FLOAD: u8 = 0x17;
    pub const DLOAD: u8 = 0x18;
    pub const ALOAD: u8 = 0x19;
    pub const DUP: u8 = 0x59;
    pub const DUP2: u8 = 0x5c;
    pub const IRETURN: u8 = 0xac;
    pub const LRETURN: u8 = 0xad;
    pub const FRETURN: u8 = 0xae;
    pub const DRETURN: u8 = 0xaf;
    pub const ARETURN: u8 = 0xb0;
    pub const RETURN: u8 = 0xb1;
    pub const GETSTATIC: u8 = 0xb2;
    pub const PUTSTATIC: u8 = 0xb3;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
    pub const INVOKESPECIAL: u8 = 0xb7;
    pub const INVOKESTATIC: u8 = 0xb8;
    pub const INVOKEINTERFACE: u8 = 0xb9;
    pub const NEW: u8 = 0xbb;
    pub const CHECKCAST: u8 = 0xc0;
}

/// Dispatch kind for method invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invoke {
    Static,
    Virtual,
    Special,
    Interface,
}

/// Accumulates bytecode for one method body and tracks operand stack depth
pub struct CodeBuilder {
    code: Vec<u8>,
    stack: i32,
    max_stack: i32,
    max_locals: u16,
}

impl CodeBuilder {
    /// `max_locals` must cover the receiver (if any) and all parameters
    pub fn new(max_locals: u16) -> Self {
        Self {
            code: Vec::new(),
            stack: 0,
            max_stack: 0,
            max_locals,
        }
    }

    /// Locals needed for a method with the given descriptor
    pub fn for_method(descriptor: &MethodDescriptor, is_static: bool) -> Self {
        let receiver = if is_static { 0 } else { 1 };
        Self::new(descriptor.parameter_slots() + receiver)
    }

    fn adjust(&mut self, delta: i32) -> Result<(), ClassFileError> {
        self.stack += delta;
        if self.stack < 0 {
            return Err(ClassFileError::Malformed("operand stack underflow in generated code".to_string()));
        }
        self.max_stack = self.max_stack.max(self.stack);
        Ok(())
    }

    /// Push local `index` of the given type
    pub fn load(&mut self, ty: &FieldType, index: u8) -> Result<&mut Self, ClassFileError> {
        let opcode = match ty {
            FieldType::Base('J') => op::LLOAD,
            FieldType::Base('F') => op::FLOAD,
            FieldType::Base('D') => op::DLOAD,
            FieldType::Base(_) => op::ILOAD,
            _ => op::ALOAD,
        };
        put_u8(&mut self.code, opcode);
        put_u8(&mut self.code, index);
        self.adjust(ty.slots() as i32)?;
        Ok(self)
    }

    /// Shorthand for `aload index`
    pub fn aload(&mut self, index: u8) -> Result<&mut Self, ClassFileError> {
        put_u8(&mut self.code, op::ALOAD);
        put_u8(&mut self.code, index);
        self.adjust(1)?;
        Ok(self)
    }

    /// Push an int/boolean constant in the range 0..=5
    pub fn iconst(&mut self, value: u8) -> Result<&mut Self, ClassFileError> {
        if value > 5 {
            return Err(ClassFileError::Malformed(format!("iconst out of range: {}", value)));
        }
        put_u8(&mut self.code, op::ICONST_0 + value);
        self.adjust(1)?;
        Ok(self)
    }

    fn ldc_index(&mut self, index: u16) -> Result<&mut Self, ClassFileError> {
        if let Ok(narrow) = u8::try_from(index) {
            put_u8(&mut self.code, op::LDC);
            put_u8(&mut self.code, narrow);
        } else {
            put_u8(&mut self.code, op::LDC_W);
            put_u16(&mut self.code, index);
        }
        self.adjust(1)?;
        Ok(self)
    }

    /// Push a string literal
    pub fn ldc_string(&mut self, pool: &mut ConstantPool, value: &str) -> Result<&mut Self, ClassFileError> {
        let index = pool.add_string(value)?;
        self.ldc_index(index)
    }

    /// Push a class literal for `ty`; primitives load the wrapper's `TYPE` field
    pub fn class_literal(&mut self, pool: &mut ConstantPool, ty: &FieldType) -> Result<&mut Self, ClassFileError> {
        match (ty.class_constant_name(), ty.boxing()) {
            (Some(name), _) => {
                let index = pool.add_class(name)?;
                self.ldc_index(index)
            }
            (None, Some(boxing)) => self.getstatic(pool, boxing.wrapper, "TYPE", "Ljava/lang/Class;"),
            (None, None) => Err(ClassFileError::BadDescriptor(ty.descriptor())),
        }
    }

    pub fn dup(&mut self) -> Result<&mut Self, ClassFileError> {
        put_u8(&mut self.code, op::DUP);
        self.adjust(1)?;
        Ok(self)
    }

    /// Duplicate a value of the given type (`dup` or `dup2`)
    pub fn dup_value(&mut self, ty: &FieldType) -> Result<&mut Self, ClassFileError> {
        if ty.slots() == 2 {
            put_u8(&mut self.code, op::DUP2);
            self.adjust(2)?;
            Ok(self)
        } else {
            self.dup()
        }
    }

    pub fn getstatic(
        &mut self,
        pool: &mut ConstantPool,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<&mut Self, ClassFileError> {
        let slots = FieldType::parse(descriptor)?.slots();
        let index = pool.add_field_ref(owner, name, descriptor)?;
        put_u8(&mut self.code, op::GETSTATIC);
        put_u16(&mut self.code, index);
        self.adjust(slots as i32)?;
        Ok(self)
    }

    pub fn putstatic(
        &mut self,
        pool: &mut ConstantPool,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<&mut Self, ClassFileError> {
        let slots = FieldType::parse(descriptor)?.slots();
        let index = pool.add_field_ref(owner, name, descriptor)?;
        put_u8(&mut self.code, op::PUTSTATIC);
        put_u16(&mut self.code, index);
        self.adjust(-(slots as i32))?;
        Ok(self)
    }

    pub fn invoke(
        &mut self,
        pool: &mut ConstantPool,
        kind: Invoke,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<&mut Self, ClassFileError> {
        let parsed = MethodDescriptor::parse(descriptor)?;
        let receiver = if kind == Invoke::Static { 0 } else { 1 };
        let consumed = parsed.parameter_slots() as i32 + receiver;

        match kind {
            Invoke::Interface => {
                let index = pool.add_interface_method_ref(owner, name, descriptor)?;
                put_u8(&mut self.code, op::INVOKEINTERFACE);
                put_u16(&mut self.code, index);
                put_u8(&mut self.code, consumed as u8);
                put_u8(&mut self.code, 0);
            }
            Invoke::Static | Invoke::Virtual | Invoke::Special => {
                let index = pool.add_method_ref(owner, name, descriptor)?;
                let opcode = match kind {
                    Invoke::Static => op::INVOKESTATIC,
                    Invoke::Virtual => op::INVOKEVIRTUAL,
                    _ => op::INVOKESPECIAL,
                };
                put_u8(&mut self.code, opcode);
                put_u16(&mut self.code, index);
            }
        }

        self.adjust(-consumed)?;
        self.adjust(parsed.return_slots() as i32)?;
        Ok(self)
    }

    /// `new` + `dup` + no-arg `<init>`: leaves a fresh instance on the stack
    pub fn new_instance(&mut self, pool: &mut ConstantPool, class: &str) -> Result<&mut Self, ClassFileError> {
        let index = pool.add_class(class)?;
        put_u8(&mut self.code, op::NEW);
        put_u16(&mut self.code, index);
        self.adjust(1)?;
        self.dup()?;
        self.invoke(pool, Invoke::Special, class, "<init>", "()V")
    }

    /// `checkcast` to `ty`, unboxing primitives through their wrapper class
    pub fn cast_from_object(&mut self, pool: &mut ConstantPool, ty: &FieldType) -> Result<&mut Self, ClassFileError> {
        match (ty.class_constant_name(), ty.boxing()) {
            (Some(name), _) => {
                let index = pool.add_class(name)?;
                put_u8(&mut self.code, op::CHECKCAST);
                put_u16(&mut self.code, index);
                Ok(self)
            }
            (None, Some(boxing)) => {
                let index = pool.add_class(boxing.wrapper)?;
                put_u8(&mut self.code, op::CHECKCAST);
                put_u16(&mut self.code, index);
                self.invoke(
                    pool,
                    Invoke::Virtual,
                    boxing.wrapper,
                    boxing.unbox_method,
                    boxing.unbox_descriptor,
                )
            }
            (None, None) => Err(ClassFileError::BadDescriptor(ty.descriptor())),
        }
    }

    /// Return from the method, popping a value of `ty` if present
    pub fn return_value(&mut self, ty: Option<&FieldType>) -> Result<&mut Self, ClassFileError> {
        let opcode = match ty {
            None => op::RETURN,
            Some(FieldType::Base('J')) => op::LRETURN,
            Some(FieldType::Base('F')) => op::FRETURN,
            Some(FieldType::Base('D')) => op::DRETURN,
            Some(FieldType::Base(_)) => op::IRETURN,
            Some(_) => op::ARETURN,
        };
        put_u8(&mut self.code, opcode);
        self.adjust(-(ty.map(FieldType::slots).unwrap_or(0) as i32))?;
        Ok(self)
    }

    /// Highest operand stack depth reached so far
    pub fn max_stack(&self) -> u16 {
        self.max_stack as u16
    }

    /// Produce the `Code` attribute
    pub fn finish(self, pool: &mut ConstantPool) -> Result<Attribute, ClassFileError> {
        let name_index = pool.add_utf8("Code")?;
        let code_len = u32::try_from(self.code.len())
            .ok()
            .filter(|len| *len < 65536)
            .ok_or(ClassFileError::TooMany { what: "code bytes", count: self.code.len() })?;

        let mut info = Vec::with_capacity(self.code.len() + 12);
        put_u16(&mut info, self.max_stack as u16);
        put_u16(&mut info, self.max_locals);
        put_u32(&mut info, code_len);
        info.extend_from_slice(&self.code);
        // exception_table_length, attributes_count
        put_u16(&mut info, 0);
        put_u16(&mut info, 0);

        Ok(Attribute { name_index, info })
    }
}
