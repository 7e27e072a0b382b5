// src/scan/subscribe_event.rs
//! `@SubscribeEvent` detection

use super::{
    AnnotationSet, AnnotationTarget, CapabilityDescriptor, Detection, EventPriority, ScanContext, ScanError,
    SubscriberMethod,
};
use crate::access::AccessTransformation;

/// `net.minecraftforge.eventbus.api.SubscribeEvent`
pub const SUBSCRIBE_EVENT: &str = "Lnet/minecraftforge/eventbus/api/SubscribeEvent;";

pub(super) fn detect(context: &ScanContext, mut annotations: AnnotationSet) -> Result<Detection, ScanError> {
    let owned = annotations.take_on_methods(SUBSCRIBE_EVENT);
    let mut detection = Detection::pass(annotations);

    for entry in owned {
        let AnnotationTarget::Method(method) = entry.target else {
            continue;
        };

        let priority = match entry.annotation.enum_constant("priority") {
            None => EventPriority::default(),
            Some(constant) => EventPriority::from_constant(constant).ok_or_else(|| ScanError::InvalidElement {
                unit: context.unit_name.clone(),
                annotation: "@SubscribeEvent",
                element: "priority",
                value: constant.to_string(),
            })?,
        };
        let receive_cancelled = entry.annotation.boolean("receiveCanceled").unwrap_or(false);

        // The dispatch shim calls the handler from another package
        detection.transformations.push(AccessTransformation::MakeClassPublic);
        detection.transformations.push(AccessTransformation::MakeMethodPublic {
            name: method.name.clone(),
            descriptor: method.descriptor.clone(),
        });

        detection
            .capabilities
            .push(CapabilityDescriptor::SubscriberMethod(SubscriberMethod {
                owner_unit: context.unit_name.clone(),
                method_name: method.name,
                method_descriptor: method.descriptor,
                access_flags: method.access_flags,
                priority,
                receive_cancelled,
            }));
    }

    Ok(detection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::access::{ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC};
    use crate::classfile::{Annotation, ClassBuilder, ElementValue};
    use crate::scan::scan;
    use crate::scan::tests::{enum_value, void_method};

    const TICK: &str = "(Lnet/minecraftforge/event/TickEvent;)V";

    #[test]
    fn test_priority_and_cancelled_flags() {
        let mut builder = ClassBuilder::new("com/example/Handlers", "java/lang/Object", 0).unwrap();
        void_method(&mut builder, ACC_PRIVATE | ACC_STATIC, "onTick", TICK);
        builder
            .annotate_last_method(&[Annotation::new(SUBSCRIBE_EVENT)
                .with(
                    "priority",
                    enum_value("Lnet/minecraftforge/eventbus/api/EventPriority;", "HIGHEST"),
                )
                .with("receiveCanceled", ElementValue::Boolean(true))])
            .unwrap();
        let outcome = scan(&builder.build().unwrap()).unwrap();

        let CapabilityDescriptor::SubscriberMethod(method) = &outcome.capabilities[0] else {
            panic!("expected a subscriber method");
        };
        assert_eq!(method.priority, EventPriority::Highest);
        assert!(method.receive_cancelled);
        assert!(method.is_static());

        let requests: Vec<_> = outcome.transformations.iter().collect();
        assert!(requests.contains(&AccessTransformation::MakeClassPublic));
        assert!(requests.contains(&AccessTransformation::MakeMethodPublic {
            name: "onTick".into(),
            descriptor: TICK.into(),
        }));
    }

    #[test]
    fn test_instance_method_still_recorded() {
        let mut builder = ClassBuilder::new("com/example/Handlers", "java/lang/Object", ACC_PUBLIC).unwrap();
        void_method(&mut builder, ACC_PUBLIC, "onTick", TICK);
        builder.annotate_last_method(&[Annotation::new(SUBSCRIBE_EVENT)]).unwrap();
        let outcome = scan(&builder.build().unwrap()).unwrap();

        assert_eq!(outcome.capabilities.len(), 1);
        let CapabilityDescriptor::SubscriberMethod(method) = &outcome.capabilities[0] else {
            panic!("expected a subscriber method");
        };
        assert!(!method.is_static());
        assert_eq!(method.priority, EventPriority::Normal);
    }

    #[test]
    fn test_unknown_priority_rejected() {
        let mut builder = ClassBuilder::new("com/example/Handlers", "java/lang/Object", 0).unwrap();
        void_method(&mut builder, ACC_STATIC, "onTick", TICK);
        builder
            .annotate_last_method(&[Annotation::new(SUBSCRIBE_EVENT).with(
                "priority",
                enum_value("Lnet/minecraftforge/eventbus/api/EventPriority;", "URGENT"),
            )])
            .unwrap();
        assert!(matches!(
            scan(&builder.build().unwrap()),
            Err(ScanError::InvalidElement { element: "priority", .. })
        ));
    }
}
