// src/generate/initializer.rs
//! The per-archive `ForgeInitializer` entrypoint
//!
//! `onForgeInitialize` runs three phases in order:
//!
//! 1. hand every per-class registrar to `EventRegistrarRegistry`, keyed by
//!    its owner class, so the runtime can add the owner's static handlers
//!    whenever that class is registered on a bus
//! 2. register every `@Mod.EventBusSubscriber` class on its bus, through a
//!    side-aware helper when the class is restricted to one side
//! 3. register every accessor shim with `ObjectHolderRegistry`

use super::{runtime, shim_class, GenerateError, ShimDescriptor};
use crate::classfile::access::ACC_PUBLIC;
use crate::classfile::{ClassBuilder, ClassFileError, CodeBuilder, ConstantPool, FieldType, Invoke};
use crate::scan::{Bus, InjectedField, ModuleIdentity, SubscriberClass};

/// Everything the initializer wires up, in archive order
#[derive(Debug, Clone, Default)]
pub struct InitializerPlan {
    /// `(registrar shim, owner unit)`
    pub registrars: Vec<(String, String)>,
    pub subscriber_classes: Vec<SubscriberClass>,
    /// `(accessor shim, field)`
    pub object_holders: Vec<(String, InjectedField)>,
}

pub fn generate(identity: &ModuleIdentity, plan: &InitializerPlan) -> Result<ShimDescriptor, GenerateError> {
    let name = super::initializer_name(&identity.unit_name);
    let unit = build(&name, identity, plan)
        .and_then(|builder| builder.build())
        .map_err(GenerateError::emitting(&name))?;
    Ok(ShimDescriptor { name, unit })
}

fn build(name: &str, identity: &ModuleIdentity, plan: &InitializerPlan) -> Result<ClassBuilder, ClassFileError> {
    let mut builder = shim_class(name, runtime::FORGE_INITIALIZER)?;

    builder.method(ACC_PUBLIC, runtime::GET_MOD_ID, runtime::GET_MOD_ID_DESCRIPTOR, |code, pool| {
        code.ldc_string(pool, &identity.declared_id)?;
        code.return_value(Some(&FieldType::Object("java/lang/String".to_string())))?;
        Ok(())
    })?;

    builder.method(ACC_PUBLIC, runtime::ON_FORGE_INITIALIZE, "()V", |code, pool| {
        for (registrar, owner) in &plan.registrars {
            register_static(code, pool, registrar, owner)?;
        }
        for class in &plan.subscriber_classes {
            register_subscriber(code, pool, class)?;
        }
        for (accessor, field) in &plan.object_holders {
            register_object_holder(code, pool, accessor, field)?;
        }
        code.return_value(None)?;
        Ok(())
    })?;

    Ok(builder)
}

fn register_static(
    code: &mut CodeBuilder,
    pool: &mut ConstantPool,
    registrar: &str,
    owner: &str,
) -> Result<(), ClassFileError> {
    code.getstatic(
        pool,
        runtime::EVENT_REGISTRAR_REGISTRY,
        runtime::INSTANCE,
        runtime::EVENT_REGISTRAR_REGISTRY_DESCRIPTOR,
    )?;
    code.class_literal(pool, &FieldType::Object(owner.to_string()))?;
    code.new_instance(pool, registrar)?;
    code.invoke(
        pool,
        Invoke::Virtual,
        runtime::EVENT_REGISTRAR_REGISTRY,
        runtime::REGISTER_STATIC,
        runtime::REGISTER_STATIC_DESCRIPTOR,
    )?;
    Ok(())
}

fn push_bus(code: &mut CodeBuilder, pool: &mut ConstantPool, bus: Bus) -> Result<(), ClassFileError> {
    match bus {
        Bus::Forge => {
            code.getstatic(
                pool,
                runtime::MINECRAFT_FORGE,
                runtime::FORGE_EVENT_BUS_FIELD,
                runtime::EVENT_BUS_DESCRIPTOR,
            )?;
        }
        Bus::Mod => {
            code.invoke(
                pool,
                Invoke::Static,
                runtime::MOD_LOADING_CONTEXT,
                "get",
                runtime::MOD_LOADING_CONTEXT_GET_DESCRIPTOR,
            )?;
            code.invoke(
                pool,
                Invoke::Virtual,
                runtime::MOD_LOADING_CONTEXT,
                runtime::GET_MOD_EVENT_BUS,
                runtime::GET_MOD_EVENT_BUS_DESCRIPTOR,
            )?;
        }
    }
    Ok(())
}

fn register_subscriber(
    code: &mut CodeBuilder,
    pool: &mut ConstantPool,
    class: &SubscriberClass,
) -> Result<(), ClassFileError> {
    push_bus(code, pool, class.bus)?;
    code.class_literal(pool, &FieldType::Object(class.owner_unit.clone()))?;
    match class.single_side() {
        Some(side) => {
            code.ldc_string(pool, side.constant())?;
            code.invoke(
                pool,
                Invoke::Static,
                runtime::SIDED_REGISTRAR,
                runtime::REGISTER_ON_SIDE,
                runtime::REGISTER_ON_SIDE_DESCRIPTOR,
            )?;
        }
        None => {
            code.invoke(
                pool,
                Invoke::Interface,
                runtime::EVENT_BUS,
                runtime::REGISTER,
                runtime::BUS_REGISTER_DESCRIPTOR,
            )?;
        }
    }
    Ok(())
}

fn register_object_holder(
    code: &mut CodeBuilder,
    pool: &mut ConstantPool,
    accessor: &str,
    field: &InjectedField,
) -> Result<(), ClassFileError> {
    let ty = FieldType::parse(&field.field_descriptor)?;
    code.getstatic(
        pool,
        runtime::OBJECT_HOLDER_REGISTRY,
        runtime::INSTANCE,
        runtime::OBJECT_HOLDER_REGISTRY_DESCRIPTOR,
    )?;
    code.class_literal(pool, &ty)?;
    code.ldc_string(pool, &field.namespace)?;
    code.ldc_string(pool, &field.path)?;
    code.new_instance(pool, accessor)?;
    code.invoke(
        pool,
        Invoke::Virtual,
        runtime::OBJECT_HOLDER_REGISTRY,
        runtime::REGISTER,
        runtime::OBJECT_HOLDER_REGISTER_DESCRIPTOR,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::{ClassUnit, Constant};
    use crate::scan::Side;

    fn identity() -> ModuleIdentity {
        ModuleIdentity {
            unit_name: "com/example/ExampleMod".to_string(),
            declared_id: "examplemod".to_string(),
        }
    }

    fn strings(unit: &ClassUnit) -> Vec<String> {
        (1..unit.constant_pool.len() as u16)
            .filter_map(|i| match unit.constant_pool.get(i) {
                Ok(Constant::String { string_index }) => unit.constant_pool.utf8(*string_index).ok().map(str::to_string),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_plan_still_emits_entrypoint() {
        let shim = generate(&identity(), &InitializerPlan::default()).unwrap();
        assert_eq!(shim.name, "patchwork_generated/com/example/ExampleModInitializer");

        let unit = ClassUnit::parse(&shim.to_bytes().unwrap()).unwrap();
        assert!(unit.find_method("onForgeInitialize", "()V").is_some());
        assert!(unit.find_method("getModId", "()Ljava/lang/String;").is_some());
        assert_eq!(strings(&unit), vec!["examplemod"]);
    }

    #[test]
    fn test_full_plan() {
        let plan = InitializerPlan {
            registrars: vec![(
                "patchwork_generated/com/example/Handlers_StaticEventRegistrar".to_string(),
                "com/example/Handlers".to_string(),
            )],
            subscriber_classes: vec![
                SubscriberClass {
                    owner_unit: "com/example/ClientEvents".to_string(),
                    bus: Bus::Mod,
                    mod_id: None,
                    sides: vec![Side::Client],
                },
                SubscriberClass {
                    owner_unit: "com/example/CommonEvents".to_string(),
                    bus: Bus::Forge,
                    mod_id: None,
                    sides: vec![Side::Client, Side::DedicatedServer],
                },
            ],
            object_holders: vec![(
                "patchwork_generated/com/example/Items_ObjectHolder_COUNT".to_string(),
                InjectedField {
                    owner_unit: "com/example/Items".to_string(),
                    field_name: "COUNT".to_string(),
                    field_descriptor: "I".to_string(),
                    namespace: "examplemod".to_string(),
                    path: "count".to_string(),
                },
            )],
        };
        let shim = generate(&identity(), &plan).unwrap();
        let unit = ClassUnit::parse(&shim.to_bytes().unwrap()).unwrap();

        let strings = strings(&unit);
        assert!(strings.contains(&"CLIENT".to_string()));
        assert!(strings.contains(&"count".to_string()));
        let class_names: Vec<_> = (1..unit.constant_pool.len() as u16)
            .filter_map(|i| unit.constant_pool.class_name(i).ok())
            .collect();
        for expected in [
            "patchwork_generated/com/example/Handlers_StaticEventRegistrar",
            "com/example/Handlers",
            "com/example/ClientEvents",
            "com/example/CommonEvents",
            "patchwork_generated/com/example/Items_ObjectHolder_COUNT",
            "net/patchworkmc/impl/event/EventBusSubscriberRegistrar",
            "java/lang/Integer",
        ] {
            assert!(class_names.contains(&expected), "missing {}", expected);
        }
    }
}
