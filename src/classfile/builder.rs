// src/classfile/builder.rs
//! Assembles new class units from scratch

use super::access::is_static;
use super::annotation::{visible_annotations_attribute, Annotation};
use super::code::{CodeBuilder, Invoke};
use super::constant_pool::ConstantPool;
use super::descriptor::MethodDescriptor;
use super::{Attribute, ClassFileError, ClassUnit, Member, GENERATED_MAJOR_VERSION};

/// Incrementally builds a [`ClassUnit`]
pub struct ClassBuilder {
    pool: ConstantPool,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    super_name: String,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    annotations: Vec<Annotation>,
    attributes: Vec<Attribute>,
}

impl ClassBuilder {
    pub fn new(name: &str, super_name: &str, access_flags: u16) -> Result<Self, ClassFileError> {
        let mut pool = ConstantPool::new();
        let this_class = pool.add_class(name)?;
        let super_class = pool.add_class(super_name)?;
        Ok(Self {
            pool,
            access_flags,
            this_class,
            super_class,
            super_name: super_name.to_string(),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            attributes: Vec::new(),
        })
    }

    pub fn interface(&mut self, name: &str) -> Result<&mut Self, ClassFileError> {
        let index = self.pool.add_class(name)?;
        if !self.interfaces.contains(&index) {
            self.interfaces.push(index);
        }
        Ok(self)
    }

    pub fn field(&mut self, access_flags: u16, name: &str, descriptor: &str) -> Result<&mut Self, ClassFileError> {
        let name_index = self.pool.add_utf8(name)?;
        let descriptor_index = self.pool.add_utf8(descriptor)?;
        self.fields.push(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        });
        Ok(self)
    }

    /// Add a field carrying runtime-visible annotations
    pub fn annotated_field(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        annotations: &[Annotation],
    ) -> Result<&mut Self, ClassFileError> {
        self.field(access_flags, name, descriptor)?;
        let attribute = visible_annotations_attribute(annotations, &mut self.pool)?;
        if let Some(field) = self.fields.last_mut() {
            field.attributes.push(attribute);
        }
        Ok(self)
    }

    /// Add a method whose body is emitted by `body`
    ///
    /// The closure receives a [`CodeBuilder`] sized for the descriptor and
    /// this class's constant pool. It must end the body with a return.
    pub fn method<F>(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        body: F,
    ) -> Result<&mut Self, ClassFileError>
    where
        F: FnOnce(&mut CodeBuilder, &mut ConstantPool) -> Result<(), ClassFileError>,
    {
        let parsed = MethodDescriptor::parse(descriptor)?;
        let mut code = CodeBuilder::for_method(&parsed, is_static(access_flags));
        body(&mut code, &mut self.pool)?;
        let code_attribute = code.finish(&mut self.pool)?;

        let name_index = self.pool.add_utf8(name)?;
        let descriptor_index = self.pool.add_utf8(descriptor)?;
        self.methods.push(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes: vec![code_attribute],
        });
        Ok(self)
    }

    /// Add a method without a body (abstract or native)
    pub fn abstract_method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
    ) -> Result<&mut Self, ClassFileError> {
        MethodDescriptor::parse(descriptor)?;
        let name_index = self.pool.add_utf8(name)?;
        let descriptor_index = self.pool.add_utf8(descriptor)?;
        self.methods.push(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        });
        Ok(self)
    }

    /// Attach runtime-visible annotations to the most recently added method
    pub fn annotate_last_method(&mut self, annotations: &[Annotation]) -> Result<&mut Self, ClassFileError> {
        let attribute = visible_annotations_attribute(annotations, &mut self.pool)?;
        match self.methods.last_mut() {
            Some(method) => method.attributes.push(attribute),
            None => return Err(ClassFileError::Malformed("no method to annotate".to_string())),
        }
        Ok(self)
    }

    /// Public no-arg constructor delegating to the superclass
    pub fn default_constructor(&mut self) -> Result<&mut Self, ClassFileError> {
        let super_name = self.super_name.clone();
        self.method(super::access::ACC_PUBLIC, "<init>", "()V", |code, pool| {
            code.aload(0)?;
            code.invoke(pool, Invoke::Special, &super_name, "<init>", "()V")?;
            code.return_value(None)?;
            Ok(())
        })
    }

    /// Class-level runtime-visible annotation
    pub fn annotation(&mut self, annotation: Annotation) -> &mut Self {
        self.annotations.push(annotation);
        self
    }

    /// `SourceFile` attribute
    pub fn source_file(&mut self, file_name: &str) -> Result<&mut Self, ClassFileError> {
        let name_index = self.pool.add_utf8("SourceFile")?;
        let value_index = self.pool.add_utf8(file_name)?;
        self.attributes.push(Attribute {
            name_index,
            info: value_index.to_be_bytes().to_vec(),
        });
        Ok(self)
    }

    /// Finish the class; fails only if the annotations cannot be encoded
    pub fn build(mut self) -> Result<ClassUnit, ClassFileError> {
        if !self.annotations.is_empty() {
            let attribute = visible_annotations_attribute(&self.annotations, &mut self.pool)?;
            self.attributes.push(attribute);
        }
        Ok(ClassUnit {
            minor_version: 0,
            major_version: GENERATED_MAJOR_VERSION,
            constant_pool: self.pool,
            access_flags: self.access_flags,
            this_class: self.this_class,
            super_class: self.super_class,
            interfaces: self.interfaces,
            fields: self.fields,
            methods: self.methods,
            attributes: self.attributes,
        })
    }
}
