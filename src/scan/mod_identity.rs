// src/scan/mod_identity.rs
//! `@Mod` detection

use super::{AnnotationSet, CapabilityDescriptor, Detection, ModuleIdentity, ScanContext, ScanError};

/// `net.minecraftforge.fml.common.Mod`
pub const MOD: &str = "Lnet/minecraftforge/fml/common/Mod;";

pub(super) fn detect(context: &ScanContext, mut annotations: AnnotationSet) -> Result<Detection, ScanError> {
    let owned = annotations.take_on_class(MOD);
    let mut detection = Detection::pass(annotations);

    for entry in owned {
        let declared_id = entry
            .annotation
            .string("value")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ScanError::MissingModId {
                unit: context.unit_name.clone(),
            })?;

        detection
            .capabilities
            .push(CapabilityDescriptor::ModuleIdentity(ModuleIdentity {
                unit_name: context.unit_name.clone(),
                declared_id: declared_id.to_string(),
            }));
    }

    Ok(detection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::access::ACC_PUBLIC;
    use crate::classfile::{Annotation, ClassBuilder};
    use crate::scan::scan;
    use crate::scan::tests::string;

    #[test]
    fn test_mod_id_recorded() {
        let mut builder = ClassBuilder::new("com/example/ExampleMod", "java/lang/Object", ACC_PUBLIC).unwrap();
        builder.annotation(Annotation::new(MOD).with("value", string("examplemod")));
        let outcome = scan(&builder.build().unwrap()).unwrap();

        assert_eq!(
            outcome.capabilities,
            vec![CapabilityDescriptor::ModuleIdentity(ModuleIdentity {
                unit_name: "com/example/ExampleMod".to_string(),
                declared_id: "examplemod".to_string(),
            })]
        );
        // Identity alone requires no rewriting
        assert!(outcome.transformations.is_empty());
    }

    #[test]
    fn test_mod_without_id_is_rejected() {
        let mut builder = ClassBuilder::new("com/example/ExampleMod", "java/lang/Object", ACC_PUBLIC).unwrap();
        builder.annotation(Annotation::new(MOD));
        let err = scan(&builder.build().unwrap()).unwrap_err();
        assert!(matches!(err, ScanError::MissingModId { .. }));
        assert_eq!(err.unit(), Some("com/example/ExampleMod"));
    }
}
