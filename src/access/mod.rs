// src/access/mod.rs

//! Access transformation engine
//!
//! Collects visibility and mutability changes requested for a single class
//! unit and applies them in one pass over its members. Requests have set
//! semantics: recording the same request twice is the same as recording it
//! once. Widening only ever raises visibility to `public`.

use crate::classfile::access::{widen_to_public, ACC_FINAL};
use crate::classfile::{ClassFileError, ClassUnit};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

/// One requested change to a class unit
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessTransformation {
    /// Clear `ACC_FINAL` on the named field
    DefinalizeField(String),
    /// Raise the named method to `public`
    MakeMethodPublic { name: String, descriptor: String },
    /// Raise the class itself to `public`
    MakeClassPublic,
}

/// Errors raised when requests do not match the unit they are applied to
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Class {unit} has no field named {field}")]
    UnknownField { unit: String, field: String },

    #[error("Class {unit} has no method {name}{descriptor}")]
    UnknownMethod {
        unit: String,
        name: String,
        descriptor: String,
    },

    #[error(transparent)]
    ClassFile(#[from] ClassFileError),
}

/// Per-unit request accumulator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessTransformations {
    fields: BTreeSet<String>,
    methods: BTreeSet<(String, String)>,
    class_public: bool,
}

impl AccessTransformations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request; returns false if an equal request was already present
    pub fn record(&mut self, request: AccessTransformation) -> bool {
        match request {
            AccessTransformation::DefinalizeField(name) => self.fields.insert(name),
            AccessTransformation::MakeMethodPublic { name, descriptor } => {
                self.methods.insert((name, descriptor))
            }
            AccessTransformation::MakeClassPublic => !std::mem::replace(&mut self.class_public, true),
        }
    }

    /// Record every request from an iterator
    pub fn extend(&mut self, requests: impl IntoIterator<Item = AccessTransformation>) {
        for request in requests {
            self.record(request);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty() && !self.class_public
    }

    /// Number of distinct requests recorded
    pub fn len(&self) -> usize {
        self.fields.len() + self.methods.len() + usize::from(self.class_public)
    }

    /// Iterate the recorded requests in a stable order
    pub fn iter(&self) -> impl Iterator<Item = AccessTransformation> + '_ {
        let class = self.class_public.then_some(AccessTransformation::MakeClassPublic);
        class
            .into_iter()
            .chain(self.fields.iter().cloned().map(AccessTransformation::DefinalizeField))
            .chain(
                self.methods
                    .iter()
                    .map(|(name, descriptor)| AccessTransformation::MakeMethodPublic {
                        name: name.clone(),
                        descriptor: descriptor.clone(),
                    }),
            )
    }

    /// Apply every recorded request to `unit`
    ///
    /// Every named member must exist on the unit. Returns whether any flag
    /// actually changed.
    pub fn apply(&self, unit: &mut ClassUnit) -> Result<bool, AccessError> {
        if self.is_empty() {
            return Ok(false);
        }

        let unit_name = unit.name()?.to_string();
        let mut changed = false;
        let mut fields_seen = BTreeSet::new();
        let mut methods_seen = BTreeSet::new();

        for field in &mut unit.fields {
            let name = field.name(&unit.constant_pool)?;
            if self.fields.contains(name) {
                let flags = field.access_flags & !ACC_FINAL;
                changed |= flags != field.access_flags;
                field.access_flags = flags;
                fields_seen.insert(name.to_string());
            }
        }

        for method in &mut unit.methods {
            let key = (
                method.name(&unit.constant_pool)?.to_string(),
                method.descriptor(&unit.constant_pool)?.to_string(),
            );
            if self.methods.contains(&key) {
                let flags = widen_to_public(method.access_flags);
                changed |= flags != method.access_flags;
                method.access_flags = flags;
                methods_seen.insert(key);
            }
        }

        if let Some(field) = self.fields.iter().find(|f| !fields_seen.contains(*f)) {
            return Err(AccessError::UnknownField {
                unit: unit_name,
                field: field.clone(),
            });
        }
        if let Some((name, descriptor)) = self.methods.iter().find(|m| !methods_seen.contains(*m)) {
            return Err(AccessError::UnknownMethod {
                unit: unit_name,
                name: name.clone(),
                descriptor: descriptor.clone(),
            });
        }

        if self.class_public {
            let flags = widen_to_public(unit.access_flags);
            changed |= flags != unit.access_flags;
            unit.access_flags = flags;
            changed |= unit.widen_inner_class_entry()?;
        }

        debug!(
            "Applied {} access transformation(s) to {} (changed: {})",
            self.len(),
            unit_name,
            changed
        );
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::access::{ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ACC_SUPER};
    use crate::classfile::ClassBuilder;

    fn unit() -> ClassUnit {
        let mut builder = ClassBuilder::new("com/example/Handlers", "java/lang/Object", ACC_SUPER).unwrap();
        builder.field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "BLOCK", "I").unwrap();
        builder.field(ACC_PRIVATE | ACC_FINAL, "other", "J").unwrap();
        builder
            .method(ACC_PRIVATE | ACC_STATIC, "onTick", "(Lnet/minecraftforge/event/TickEvent;)V", |code, _| {
                code.return_value(None)?;
                Ok(())
            })
            .unwrap();
        builder
            .method(ACC_PROTECTED | ACC_STATIC, "onTick", "(I)V", |code, _| {
                code.return_value(None)?;
                Ok(())
            })
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_record_is_set_union() {
        let mut set = AccessTransformations::new();
        assert!(set.record(AccessTransformation::DefinalizeField("BLOCK".into())));
        assert!(!set.record(AccessTransformation::DefinalizeField("BLOCK".into())));
        assert!(set.record(AccessTransformation::MakeClassPublic));
        assert!(!set.record(AccessTransformation::MakeClassPublic));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_definalize_twice_equals_once() {
        let mut once = unit();
        let mut twice = unit();

        let mut a = AccessTransformations::new();
        a.record(AccessTransformation::DefinalizeField("BLOCK".into()));
        let mut b = AccessTransformations::new();
        b.record(AccessTransformation::DefinalizeField("BLOCK".into()));
        b.record(AccessTransformation::DefinalizeField("BLOCK".into()));

        assert!(a.apply(&mut once).unwrap());
        assert!(b.apply(&mut twice).unwrap());
        assert_eq!(once, twice);

        let field = once.find_field("BLOCK").unwrap();
        assert_eq!(field.access_flags, ACC_PUBLIC | ACC_STATIC);
        // untouched field keeps its flags
        assert_eq!(once.find_field("other").unwrap().access_flags, ACC_PRIVATE | ACC_FINAL);
    }

    #[test]
    fn test_method_widening_matches_descriptor() {
        let mut unit = unit();
        let mut set = AccessTransformations::new();
        set.record(AccessTransformation::MakeMethodPublic {
            name: "onTick".into(),
            descriptor: "(Lnet/minecraftforge/event/TickEvent;)V".into(),
        });
        set.record(AccessTransformation::MakeClassPublic);
        set.apply(&mut unit).unwrap();

        let widened = unit
            .find_method("onTick", "(Lnet/minecraftforge/event/TickEvent;)V")
            .unwrap();
        assert_eq!(widened.access_flags, ACC_PUBLIC | ACC_STATIC);
        let overload = unit.find_method("onTick", "(I)V").unwrap();
        assert_eq!(overload.access_flags, ACC_PROTECTED | ACC_STATIC);
        assert_eq!(unit.access_flags, ACC_PUBLIC | ACC_SUPER);
    }

    #[test]
    fn test_empty_set_leaves_unit_unchanged() {
        let mut unit = unit();
        let before = unit.clone();
        assert!(!AccessTransformations::new().apply(&mut unit).unwrap());
        assert_eq!(unit, before);
    }

    #[test]
    fn test_unknown_member_fails() {
        let mut unit = unit();
        let mut set = AccessTransformations::new();
        set.record(AccessTransformation::DefinalizeField("MISSING".into()));
        assert!(matches!(set.apply(&mut unit), Err(AccessError::UnknownField { .. })));

        let mut set = AccessTransformations::new();
        set.record(AccessTransformation::MakeMethodPublic {
            name: "onTick".into(),
            descriptor: "()V".into(),
        });
        assert!(matches!(set.apply(&mut unit), Err(AccessError::UnknownMethod { .. })));
    }

    #[test]
    fn test_already_public_reports_no_change() {
        let mut unit = unit();
        unit.access_flags = ACC_PUBLIC | ACC_SUPER;
        let mut set = AccessTransformations::new();
        set.record(AccessTransformation::MakeClassPublic);
        assert!(!set.apply(&mut unit).unwrap());
    }
}
