// src/generate/object_holder.rs
//! Accessor shims for `@ObjectHolder` fields
//!
//! The shim republishes the owner's field as its own `value` and accepts
//! the registry entry from the runtime through `Consumer.accept`, writing
//! it back into both places.

use super::{runtime, shim_class, GenerateError, ShimDescriptor};
use crate::classfile::access::{ACC_PUBLIC, ACC_STATIC};
use crate::classfile::{ClassBuilder, ClassFileError, FieldType};
use crate::scan::InjectedField;

const VALUE_FIELD: &str = "value";

pub fn generate(field: &InjectedField) -> Result<ShimDescriptor, GenerateError> {
    let name = super::accessor_name(&field.owner_unit, &field.field_name);
    let unit = build(&name, field)
        .and_then(|builder| builder.build())
        .map_err(GenerateError::emitting(&name))?;
    Ok(ShimDescriptor { name, unit })
}

fn build(name: &str, field: &InjectedField) -> Result<ClassBuilder, ClassFileError> {
    let ty = FieldType::parse(&field.field_descriptor)?;
    let descriptor = field.field_descriptor.as_str();
    let owner = field.owner_unit.as_str();
    let owner_field = field.field_name.as_str();

    let mut builder = shim_class(name, runtime::CONSUMER)?;
    builder.field(ACC_PUBLIC | ACC_STATIC, VALUE_FIELD, descriptor)?;

    builder.method(ACC_STATIC, "<clinit>", "()V", |code, pool| {
        code.getstatic(pool, owner, owner_field, descriptor)?;
        code.putstatic(pool, name, VALUE_FIELD, descriptor)?;
        code.return_value(None)?;
        Ok(())
    })?;

    builder.method(ACC_PUBLIC, runtime::ACCEPT, runtime::ACCEPT_DESCRIPTOR, |code, pool| {
        code.aload(1)?;
        code.cast_from_object(pool, &ty)?;
        code.dup_value(&ty)?;
        code.putstatic(pool, owner, owner_field, descriptor)?;
        code.putstatic(pool, name, VALUE_FIELD, descriptor)?;
        code.return_value(None)?;
        Ok(())
    })?;

    Ok(builder)
}
