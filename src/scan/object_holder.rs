// src/scan/object_holder.rs
//! `@ObjectHolder` detection
//!
//! A field-level value of `namespace:path` names the registry entry
//! directly; a bare `path` takes its namespace from a class-level
//! `@ObjectHolder`. A class-level annotation also claims every
//! `public static final` field that carries no annotation of its own, with
//! the lower-cased field name as the path.

use super::{AnnotationSet, AnnotationTarget, CapabilityDescriptor, Detection, InjectedField, ScanContext, ScanError};
use crate::access::AccessTransformation;
use crate::classfile::access::{is_final, is_public, is_static};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use std::collections::HashSet;

/// `net.minecraftforge.registries.ObjectHolder`
pub const OBJECT_HOLDER: &str = "Lnet/minecraftforge/registries/ObjectHolder;";

pub(super) fn detect(context: &ScanContext, mut annotations: AnnotationSet) -> Result<Detection, ScanError> {
    let class_level = annotations.take_on_class(OBJECT_HOLDER);
    let field_level = annotations.take_on_fields(OBJECT_HOLDER);
    let mut detection = Detection::pass(annotations);

    let class_namespace = class_level
        .iter()
        .find_map(|entry| entry.annotation.string("value"))
        .filter(|ns| !ns.is_empty());

    let mut annotated = HashSet::new();

    for entry in field_level {
        let AnnotationTarget::Field(field) = entry.target else {
            continue;
        };
        annotated.insert(field.name.clone());

        if !is_static(field.access_flags) {
            detection.diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::NonStaticObjectHolder,
                    &context.unit_name,
                    "@ObjectHolder on an instance field cannot be injected, skipping",
                )
                .with_member(&field.name)
                .logged(),
            );
            continue;
        }

        let value = entry.annotation.string("value").unwrap_or_default();
        let (namespace, path) = match value.split_once(':') {
            Some((namespace, path)) => (namespace, path),
            None => {
                let namespace = class_namespace.ok_or_else(|| ScanError::MissingNamespace {
                    unit: context.unit_name.clone(),
                    field: field.name.clone(),
                })?;
                (namespace, value)
            }
        };

        if namespace.is_empty() || path.is_empty() {
            return Err(ScanError::InvalidElement {
                unit: context.unit_name.clone(),
                annotation: "@ObjectHolder",
                element: "value",
                value: value.to_string(),
            });
        }

        record(&mut detection, context, &field.name, &field.descriptor, namespace, path);
    }

    if let Some(namespace) = class_namespace {
        for field in &context.fields {
            let flags = field.access_flags;
            if annotated.contains(&field.name) || !(is_public(flags) && is_static(flags) && is_final(flags)) {
                continue;
            }
            let path = field.name.to_lowercase();
            record(&mut detection, context, &field.name, &field.descriptor, namespace, &path);
        }
    }

    Ok(detection)
}

fn record(detection: &mut Detection, context: &ScanContext, field: &str, descriptor: &str, namespace: &str, path: &str) {
    detection
        .capabilities
        .push(CapabilityDescriptor::InjectedField(InjectedField {
            owner_unit: context.unit_name.clone(),
            field_name: field.to_string(),
            field_descriptor: descriptor.to_string(),
            namespace: namespace.to_string(),
            path: path.to_string(),
        }));
    detection
        .transformations
        .push(AccessTransformation::DefinalizeField(field.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::access::{ACC_FINAL, ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC};
    use crate::classfile::{Annotation, ClassBuilder, ClassUnit};
    use crate::scan::scan;
    use crate::scan::tests::string;

    const PSF: u16 = ACC_PUBLIC | ACC_STATIC | ACC_FINAL;

    fn holders(unit: &ClassUnit) -> Vec<InjectedField> {
        scan(unit)
            .unwrap()
            .capabilities
            .into_iter()
            .filter_map(|c| match c {
                CapabilityDescriptor::InjectedField(field) => Some(field),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_explicit_registry_id() {
        let mut builder = ClassBuilder::new("com/example/Items", "java/lang/Object", ACC_PUBLIC).unwrap();
        builder
            .annotated_field(PSF, "RUBY", "I", &[Annotation::new(OBJECT_HOLDER).with("value", string("gems:ruby"))])
            .unwrap();
        let unit = builder.build().unwrap();

        let outcome = scan(&unit).unwrap();
        assert_eq!(outcome.transformations.len(), 1);
        let found = holders(&unit);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].registry_id(), "gems:ruby");
        assert_eq!(found[0].field_descriptor, "I");
    }

    #[test]
    fn test_class_namespace_and_implicit_fields() {
        let mut builder = ClassBuilder::new("com/example/Blocks", "java/lang/Object", ACC_PUBLIC).unwrap();
        builder.annotation(Annotation::new(OBJECT_HOLDER).with("value", string("examplemod")));
        builder
            .annotated_field(
                PSF,
                "FANCY",
                "Lnet/minecraft/block/Block;",
                &[Annotation::new(OBJECT_HOLDER).with("value", string("fancy_block"))],
            )
            .unwrap();
        builder.field(PSF, "COPPER_ORE", "Lnet/minecraft/block/Block;").unwrap();
        // not public static final: ignored by the class-level rule
        builder.field(ACC_PRIVATE | ACC_STATIC, "cache", "Ljava/lang/Object;").unwrap();
        let unit = builder.build().unwrap();

        let ids: Vec<_> = holders(&unit).iter().map(InjectedField::registry_id).collect();
        assert_eq!(ids, vec!["examplemod:fancy_block", "examplemod:copper_ore"]);
    }

    #[test]
    fn test_missing_namespace_is_error() {
        let mut builder = ClassBuilder::new("com/example/Items", "java/lang/Object", ACC_PUBLIC).unwrap();
        builder
            .annotated_field(PSF, "RUBY", "I", &[Annotation::new(OBJECT_HOLDER).with("value", string("ruby"))])
            .unwrap();
        let err = scan(&builder.build().unwrap()).unwrap_err();
        assert!(matches!(err, ScanError::MissingNamespace { ref field, .. } if field == "RUBY"));
    }

    #[test]
    fn test_instance_field_skipped_with_diagnostic() {
        let mut builder = ClassBuilder::new("com/example/Items", "java/lang/Object", ACC_PUBLIC).unwrap();
        builder
            .annotated_field(
                ACC_PUBLIC | ACC_FINAL,
                "ruby",
                "I",
                &[Annotation::new(OBJECT_HOLDER).with("value", string("gems:ruby"))],
            )
            .unwrap();
        let outcome = scan(&builder.build().unwrap()).unwrap();
        assert!(outcome.capabilities.is_empty());
        assert!(outcome.transformations.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::NonStaticObjectHolder);
    }
}
