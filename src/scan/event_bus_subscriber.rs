// src/scan/event_bus_subscriber.rs
//! `@Mod.EventBusSubscriber` detection

use super::{AnnotationSet, Bus, CapabilityDescriptor, Detection, ScanContext, ScanError, Side, SubscriberClass};

/// `net.minecraftforge.fml.common.Mod$EventBusSubscriber`
pub const EVENT_BUS_SUBSCRIBER: &str = "Lnet/minecraftforge/fml/common/Mod$EventBusSubscriber;";

const ANNOTATION: &str = "@Mod.EventBusSubscriber";

pub(super) fn detect(context: &ScanContext, mut annotations: AnnotationSet) -> Result<Detection, ScanError> {
    let owned = annotations.take_on_class(EVENT_BUS_SUBSCRIBER);
    let mut detection = Detection::pass(annotations);

    let invalid = |element: &'static str, value: &str| ScanError::InvalidElement {
        unit: context.unit_name.clone(),
        annotation: ANNOTATION,
        element,
        value: value.to_string(),
    };

    for entry in owned {
        let annotation = &entry.annotation;

        let bus = match annotation.enum_constant("bus") {
            None | Some("FORGE") => Bus::Forge,
            Some("MOD") => Bus::Mod,
            Some(other) => return Err(invalid("bus", other)),
        };

        let mut sides = Vec::new();
        for constant in annotation.enum_constants("value").unwrap_or_default() {
            let side = Side::from_constant(constant).ok_or_else(|| invalid("value", constant))?;
            if !sides.contains(&side) {
                sides.push(side);
            }
        }
        if sides.is_empty() {
            sides = vec![Side::Client, Side::DedicatedServer];
        }

        detection
            .capabilities
            .push(CapabilityDescriptor::SubscriberClass(SubscriberClass {
                owner_unit: context.unit_name.clone(),
                bus,
                mod_id: annotation.string("modid").filter(|id| !id.is_empty()).map(str::to_string),
                sides,
            }));
    }

    Ok(detection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::access::ACC_PUBLIC;
    use crate::classfile::{Annotation, ClassBuilder, ElementValue};
    use crate::scan::scan;
    use crate::scan::tests::{enum_value, string};

    const DIST: &str = "Lnet/minecraftforge/api/distmarker/Dist;";

    fn subscriber(annotation: Annotation) -> SubscriberClass {
        let mut builder = ClassBuilder::new("com/example/ClientEvents", "java/lang/Object", ACC_PUBLIC).unwrap();
        builder.annotation(annotation);
        let outcome = scan(&builder.build().unwrap()).unwrap();
        assert!(outcome.transformations.is_empty());
        match outcome.capabilities.into_iter().next() {
            Some(CapabilityDescriptor::SubscriberClass(class)) => class,
            other => panic!("unexpected capability: {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let class = subscriber(Annotation::new(EVENT_BUS_SUBSCRIBER));
        assert_eq!(class.bus, Bus::Forge);
        assert_eq!(class.mod_id, None);
        assert_eq!(class.sides, vec![Side::Client, Side::DedicatedServer]);
        assert_eq!(class.single_side(), None);
    }

    #[test]
    fn test_mod_bus_client_only() {
        let class = subscriber(
            Annotation::new(EVENT_BUS_SUBSCRIBER)
                .with("modid", string("examplemod"))
                .with(
                    "bus",
                    enum_value("Lnet/minecraftforge/fml/common/Mod$EventBusSubscriber$Bus;", "MOD"),
                )
                .with("value", ElementValue::Array(vec![enum_value(DIST, "CLIENT")])),
        );
        assert_eq!(class.bus, Bus::Mod);
        assert_eq!(class.mod_id.as_deref(), Some("examplemod"));
        assert_eq!(class.single_side(), Some(Side::Client));
    }
}
