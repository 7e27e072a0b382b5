// src/generate/subscribe_event.rs
//! Dispatch shims for static `@SubscribeEvent` methods

use super::{accept_bridge, runtime, shim_class, GenerateError, ShimDescriptor};
use crate::classfile::access::{ACC_PUBLIC, ACC_STATIC};
use crate::classfile::{ClassBuilder, ClassFileError, FieldType, Invoke, MethodDescriptor};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::scan::{EventPriority, SubscriberMethod};

const HANDLE: &str = "handle";

/// A generated dispatch shim plus what the registrar needs to add it
#[derive(Debug, Clone)]
pub struct DispatchShim {
    pub shim: ShimDescriptor,
    /// Internal name of the event class the handler listens for
    pub event_class: String,
    pub priority: EventPriority,
    pub receive_cancelled: bool,
}

/// Result of dispatch synthesis for one subscriber method
#[derive(Debug)]
pub enum DispatchOutcome {
    Shim(DispatchShim),
    /// Unsupported handler shape; nothing was generated
    Skipped(Diagnostic),
}

pub fn generate(method: &SubscriberMethod) -> Result<DispatchOutcome, GenerateError> {
    let member = format!("{}{}", method.method_name, method.method_descriptor);

    if !method.is_static() {
        return Ok(DispatchOutcome::Skipped(
            Diagnostic::new(
                DiagnosticKind::NonStaticSubscriber,
                &method.owner_unit,
                "instance event handlers are not supported, skipping",
            )
            .with_member(member)
            .logged(),
        ));
    }

    let Some(event_class) = event_class(&method.method_descriptor) else {
        return Ok(DispatchOutcome::Skipped(
            Diagnostic::new(
                DiagnosticKind::UnsupportedSubscriberSignature,
                &method.owner_unit,
                "event handlers must take exactly one event object and return void, skipping",
            )
            .with_member(member)
            .logged(),
        ));
    };

    let name = super::dispatch_name(&method.owner_unit, &method.method_name, &method.method_descriptor);
    let unit = build(&name, method, &event_class)
        .and_then(|builder| builder.build())
        .map_err(GenerateError::emitting(&name))?;

    Ok(DispatchOutcome::Shim(DispatchShim {
        shim: ShimDescriptor { name, unit },
        event_class,
        priority: method.priority,
        receive_cancelled: method.receive_cancelled,
    }))
}

/// `(Lpkg/SomeEvent;)V` -> `pkg/SomeEvent`
fn event_class(descriptor: &str) -> Option<String> {
    let parsed = MethodDescriptor::parse(descriptor).ok()?;
    match (parsed.parameters.as_slice(), parsed.return_type) {
        ([FieldType::Object(event)], None) => Some(event.clone()),
        _ => None,
    }
}

fn handle_descriptor(event_class: &str) -> String {
    format!("(L{};)V", event_class)
}

fn build(name: &str, method: &SubscriberMethod, event_class: &str) -> Result<ClassBuilder, ClassFileError> {
    let handle = handle_descriptor(event_class);
    let event = FieldType::Object(event_class.to_string());

    let mut builder = shim_class(name, runtime::CONSUMER)?;
    builder.method(ACC_PUBLIC | ACC_STATIC, HANDLE, &handle, |code, pool| {
        code.load(&event, 0)?;
        code.invoke(
            pool,
            Invoke::Static,
            &method.owner_unit,
            &method.method_name,
            &method.method_descriptor,
        )?;
        code.return_value(None)?;
        Ok(())
    })?;
    accept_bridge(&mut builder, name, HANDLE, &handle, event_class)?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::access::{ACC_PRIVATE, ACC_PUBLIC};
    use crate::classfile::ClassUnit;

    fn method(flags: u16, descriptor: &str) -> SubscriberMethod {
        SubscriberMethod {
            owner_unit: "com/example/Handlers".to_string(),
            method_name: "onTick".to_string(),
            method_descriptor: descriptor.to_string(),
            access_flags: flags,
            priority: EventPriority::Low,
            receive_cancelled: false,
        }
    }

    #[test]
    fn test_static_handler_gets_shim() {
        let outcome = generate(&method(ACC_PUBLIC | ACC_STATIC, "(Lnet/minecraftforge/event/TickEvent;)V")).unwrap();
        let DispatchOutcome::Shim(dispatch) = outcome else {
            panic!("expected a dispatch shim");
        };
        assert_eq!(dispatch.event_class, "net/minecraftforge/event/TickEvent");
        assert_eq!(dispatch.priority, EventPriority::Low);

        let unit = ClassUnit::parse(&dispatch.shim.to_bytes().unwrap()).unwrap();
        assert!(unit.find_method("handle", "(Lnet/minecraftforge/event/TickEvent;)V").is_some());
        assert!(unit.find_method("accept", "(Ljava/lang/Object;)V").is_some());
        assert!(unit.fields.is_empty());
    }

    #[test]
    fn test_instance_handler_skipped() {
        let outcome = generate(&method(ACC_PUBLIC, "(Lnet/minecraftforge/event/TickEvent;)V")).unwrap();
        let DispatchOutcome::Skipped(diagnostic) = outcome else {
            panic!("instance handlers must not produce a shim");
        };
        assert_eq!(diagnostic.kind, DiagnosticKind::NonStaticSubscriber);
        assert_eq!(diagnostic.member.as_deref(), Some("onTick(Lnet/minecraftforge/event/TickEvent;)V"));
    }

    #[test]
    fn test_unsupported_signatures_skipped() {
        for descriptor in ["()V", "(I)V", "(La/Event;La/Event;)V", "(La/Event;)Z", "not a descriptor"] {
            let outcome = generate(&method(ACC_PRIVATE | ACC_STATIC, descriptor)).unwrap();
            assert!(matches!(
                outcome,
                DispatchOutcome::Skipped(Diagnostic {
                    kind: DiagnosticKind::UnsupportedSubscriberSignature,
                    ..
                })
            ));
        }
    }
}
