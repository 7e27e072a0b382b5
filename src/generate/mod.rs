// src/generate/mod.rs

//! Shim synthesis
//!
//! Turns capability descriptors into new class units that bridge Forge's
//! declarative metadata to the Patchwork runtime:
//!
//! - accessor shims expose an `@ObjectHolder` field as a `Consumer`
//! - dispatch shims forward one event to a static `@SubscribeEvent` method
//! - per-class registrars add a class's dispatch shims to an event bus
//! - one initializer per archive wires all of the above at mod load
//!
//! Every generated method is straight-line code, so units are emitted at
//! class version 52 without stack map frames.

pub mod initializer;
pub mod object_holder;
pub mod registrar;
pub mod runtime;
pub mod subscribe_event;

pub use initializer::InitializerPlan;
pub use subscribe_event::{DispatchOutcome, DispatchShim};

use crate::classfile::access::{ACC_FINAL, ACC_PUBLIC, ACC_SUPER, ACC_SYNTHETIC};
use crate::classfile::{ClassBuilder, ClassFileError, ClassUnit, FieldType, Invoke};
use crate::diagnostic::Diagnostic;
use crate::scan::{CapabilityDescriptor, InjectedField};
use thiserror::Error;

/// Package all generated classes live in
pub const GENERATED_PACKAGE: &str = "patchwork_generated";

/// Access flags shared by every generated class
const SHIM_CLASS_FLAGS: u16 = ACC_PUBLIC | ACC_FINAL | ACC_SUPER | ACC_SYNTHETIC;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Failed to emit {shim}: {source}")]
    ClassFile {
        shim: String,
        #[source]
        source: ClassFileError,
    },
}

impl GenerateError {
    fn emitting(shim: &str) -> impl FnOnce(ClassFileError) -> GenerateError + '_ {
        move |source| GenerateError::ClassFile {
            shim: shim.to_string(),
            source,
        }
    }
}

/// A synthesized class ready to be written
#[derive(Debug, Clone)]
pub struct ShimDescriptor {
    /// Internal name, e.g. `patchwork_generated/com/example/Foo_StaticEventRegistrar`
    pub name: String,
    pub unit: ClassUnit,
}

impl ShimDescriptor {
    /// Archive entry path for this shim
    pub fn entry_name(&self) -> String {
        format!("{}.class", self.name)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GenerateError> {
        self.unit.to_bytes().map_err(GenerateError::emitting(&self.name))
    }
}

/// `patchwork_generated/<owner>_ObjectHolder_<field>`
pub fn accessor_name(owner: &str, field: &str) -> String {
    format!("{}/{}_ObjectHolder_{}", GENERATED_PACKAGE, owner, field)
}

/// `patchwork_generated/<owner>_SubscribeEvent_<method>_<mangled descriptor>`
pub fn dispatch_name(owner: &str, method: &str, descriptor: &str) -> String {
    format!(
        "{}/{}_SubscribeEvent_{}_{}",
        GENERATED_PACKAGE,
        owner,
        method,
        mangle(descriptor)
    )
}

/// `patchwork_generated/<owner>_StaticEventRegistrar`
pub fn registrar_name(owner: &str) -> String {
    format!("{}/{}_StaticEventRegistrar", GENERATED_PACKAGE, owner)
}

/// `patchwork_generated/<mod unit>Initializer`
pub fn initializer_name(mod_unit: &str) -> String {
    format!("{}/{}Initializer", GENERATED_PACKAGE, mod_unit)
}

/// Escape a descriptor into identifier characters (JNI short-name rules)
///
/// `_1` is `_`, `_2` is `/`, `_3` is `;`, `_4` is `[`, `_5` is `(`, `_6`
/// is `)`, and `_0xxxx` is any other non-alphanumeric UTF-16 unit.
pub fn mangle(descriptor: &str) -> String {
    let mut out = String::with_capacity(descriptor.len() + 8);
    for unit in descriptor.encode_utf16() {
        match char::from_u32(u32::from(unit)) {
            Some(c) if c.is_ascii_alphanumeric() => out.push(c),
            Some('_') => out.push_str("_1"),
            Some('/') => out.push_str("_2"),
            Some(';') => out.push_str("_3"),
            Some('[') => out.push_str("_4"),
            Some('(') => out.push_str("_5"),
            Some(')') => out.push_str("_6"),
            _ => out.push_str(&format!("_0{:04x}", unit)),
        }
    }
    out
}

/// `Foo_ObjectHolder_BAR.java` for `patchwork_generated/a/b/Foo_ObjectHolder_BAR`
fn source_file(shim: &str) -> String {
    let simple = shim.rsplit('/').next().unwrap_or(shim);
    format!("{}.java", simple)
}

/// Start a generated class: public final synthetic, extends Object
fn shim_class(name: &str, interface: &str) -> Result<ClassBuilder, ClassFileError> {
    let mut builder = ClassBuilder::new(name, runtime::OBJECT, SHIM_CLASS_FLAGS)?;
    builder.interface(interface)?;
    builder.default_constructor()?;
    builder.source_file(&source_file(name))?;
    Ok(builder)
}

/// `accept(Object)`: cast the argument and hand it to a static method of this class
fn accept_bridge(
    builder: &mut ClassBuilder,
    this_class: &str,
    target: &str,
    target_descriptor: &str,
    argument_class: &str,
) -> Result<(), ClassFileError> {
    builder.method(ACC_PUBLIC, runtime::ACCEPT, runtime::ACCEPT_DESCRIPTOR, |code, pool| {
        code.aload(1)?;
        code.cast_from_object(pool, &FieldType::Object(argument_class.to_string()))?;
        code.invoke(pool, Invoke::Static, this_class, target, target_descriptor)?;
        code.return_value(None)?;
        Ok(())
    })?;
    Ok(())
}

/// Shims and registry entries produced for one class unit
#[derive(Debug, Default)]
pub struct UnitShims {
    /// Every shim to write, accessors first, registrar last
    pub shims: Vec<ShimDescriptor>,
    pub object_holders: Vec<(String, InjectedField)>,
    /// `(registrar shim, owner unit)` when at least one dispatch shim was made
    pub registrar: Option<(String, String)>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Synthesize every per-unit shim for the capabilities of one class
///
/// Module identities and subscriber classes need no per-unit shim; they
/// are picked up by the initializer.
pub fn synthesize_unit(owner: &str, capabilities: &[CapabilityDescriptor]) -> Result<UnitShims, GenerateError> {
    let mut output = UnitShims::default();
    let mut dispatch = Vec::new();

    for capability in capabilities {
        match capability {
            CapabilityDescriptor::InjectedField(field) => {
                let shim = object_holder::generate(field)?;
                output.object_holders.push((shim.name.clone(), field.clone()));
                output.shims.push(shim);
            }
            CapabilityDescriptor::SubscriberMethod(method) => match subscribe_event::generate(method)? {
                DispatchOutcome::Shim(shim) => dispatch.push(shim),
                DispatchOutcome::Skipped(diagnostic) => output.diagnostics.push(diagnostic),
            },
            CapabilityDescriptor::ModuleIdentity(_) | CapabilityDescriptor::SubscriberClass(_) => {}
        }
    }

    if !dispatch.is_empty() {
        let registrar = registrar::generate(owner, &dispatch)?;
        output.registrar = Some((registrar.name.clone(), owner.to_string()));
        output.shims.extend(dispatch.into_iter().map(|d| d.shim));
        output.shims.push(registrar);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(
            accessor_name("com/example/Items", "RUBY"),
            "patchwork_generated/com/example/Items_ObjectHolder_RUBY"
        );
        assert_eq!(
            dispatch_name("a/B", "onTick", "(Lnet/minecraftforge/event/TickEvent;)V"),
            "patchwork_generated/a/B_SubscribeEvent_onTick__5Lnet_2minecraftforge_2event_2TickEvent_3_6V"
        );
        assert_eq!(registrar_name("a/B"), "patchwork_generated/a/B_StaticEventRegistrar");
        assert_eq!(initializer_name("a/B"), "patchwork_generated/a/BInitializer");
    }

    #[test]
    fn test_mangle_distinguishes_overloads() {
        assert_ne!(mangle("(I)V"), mangle("(J)V"));
        assert_ne!(mangle("(La/b_c;)V"), mangle("(La/b/c;)V"));
        assert_eq!(mangle("(La/b_c;)V"), "_5La_2b_1c_3_6V");
        assert_eq!(mangle("$"), "_00024");
    }

    #[test]
    fn test_source_file_hint() {
        assert_eq!(source_file("patchwork_generated/a/BInitializer"), "BInitializer.java");
    }
}
