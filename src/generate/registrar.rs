// src/generate/registrar.rs
//! Per-class static event registrars
//!
//! One registrar per class that produced dispatch shims. Its static
//! `register(IEventBus)` adds every dispatch shim of that class as a
//! listener; `accept(Object)` lets the runtime drive it as a `Consumer`.

use super::{accept_bridge, runtime, shim_class, DispatchShim, GenerateError, ShimDescriptor};
use crate::classfile::access::{ACC_PUBLIC, ACC_STATIC};
use crate::classfile::{ClassBuilder, ClassFileError, FieldType, Invoke};

fn register_descriptor() -> String {
    format!("({})V", runtime::EVENT_BUS_DESCRIPTOR)
}

pub fn generate(owner: &str, dispatch: &[DispatchShim]) -> Result<ShimDescriptor, GenerateError> {
    let name = super::registrar_name(owner);
    let unit = build(&name, dispatch)
        .and_then(|builder| builder.build())
        .map_err(GenerateError::emitting(&name))?;
    Ok(ShimDescriptor { name, unit })
}

fn build(name: &str, dispatch: &[DispatchShim]) -> Result<ClassBuilder, ClassFileError> {
    let register = register_descriptor();
    let bus = FieldType::Object(runtime::EVENT_BUS.to_string());

    let mut builder = shim_class(name, runtime::CONSUMER)?;
    builder.method(ACC_PUBLIC | ACC_STATIC, runtime::REGISTER, &register, |code, pool| {
        for listener in dispatch {
            code.load(&bus, 0)?;
            code.getstatic(
                pool,
                runtime::EVENT_PRIORITY,
                listener.priority.constant(),
                runtime::EVENT_PRIORITY_DESCRIPTOR,
            )?;
            code.iconst(u8::from(listener.receive_cancelled))?;
            code.class_literal(pool, &FieldType::Object(listener.event_class.clone()))?;
            code.new_instance(pool, &listener.shim.name)?;
            code.invoke(
                pool,
                Invoke::Interface,
                runtime::EVENT_BUS,
                runtime::ADD_LISTENER,
                runtime::ADD_LISTENER_DESCRIPTOR,
            )?;
        }
        code.return_value(None)?;
        Ok(())
    })?;
    accept_bridge(&mut builder, name, runtime::REGISTER, &register, runtime::EVENT_BUS)?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::access::ACC_STATIC;
    use crate::classfile::ClassUnit;
    use crate::generate::subscribe_event;
    use crate::generate::DispatchOutcome;
    use crate::scan::{EventPriority, SubscriberMethod};

    fn dispatch(name: &str) -> DispatchShim {
        let method = SubscriberMethod {
            owner_unit: "com/example/Handlers".to_string(),
            method_name: name.to_string(),
            method_descriptor: "(Lnet/minecraftforge/event/TickEvent;)V".to_string(),
            access_flags: ACC_STATIC,
            priority: EventPriority::High,
            receive_cancelled: true,
        };
        match subscribe_event::generate(&method).unwrap() {
            DispatchOutcome::Shim(shim) => shim,
            DispatchOutcome::Skipped(d) => panic!("unexpected skip: {}", d),
        }
    }

    #[test]
    fn test_registrar_references_each_shim() {
        let shims = vec![dispatch("onTick"), dispatch("onOtherTick")];
        let registrar = generate("com/example/Handlers", &shims).unwrap();
        assert_eq!(registrar.name, "patchwork_generated/com/example/Handlers_StaticEventRegistrar");

        let unit = ClassUnit::parse(&registrar.to_bytes().unwrap()).unwrap();
        assert!(unit
            .find_method("register", "(Lnet/minecraftforge/eventbus/api/IEventBus;)V")
            .is_some());
        for shim in &shims {
            let referenced = (1..unit.constant_pool.len() as u16)
                .any(|i| unit.constant_pool.class_name(i).is_ok_and(|n| n == shim.shim.name));
            assert!(referenced, "{} not referenced", shim.shim.name);
        }
    }
}
