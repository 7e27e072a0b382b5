// src/scan/mod.rs

//! Capability scanner
//!
//! Collects every annotation a class carries (on the class, its fields and
//! its methods) into an [`AnnotationSet`] and folds it through an ordered
//! list of detectors. Each detector removes the annotations it recognizes,
//! records capability descriptors and access transformation requests, and
//! passes the remaining annotations on. One pass discovers every capability
//! on the unit; detector order does not change the result set.

mod event_bus_subscriber;
mod mod_identity;
mod object_holder;
mod subscribe_event;

pub use event_bus_subscriber::EVENT_BUS_SUBSCRIBER;
pub use mod_identity::MOD;
pub use object_holder::OBJECT_HOLDER;
pub use subscribe_event::SUBSCRIBE_EVENT;

use crate::access::{AccessTransformation, AccessTransformations};
use crate::classfile::access::is_static;
use crate::classfile::{Annotation, ClassFileError, ClassUnit};
use crate::diagnostic::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors caused by malformed capability metadata in the input
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("@Mod on {unit} has no mod id")]
    MissingModId { unit: String },

    #[error("@ObjectHolder on {unit}.{field} has no namespace and the class declares none")]
    MissingNamespace { unit: String, field: String },

    #[error("Invalid '{element}' in {annotation} on {unit}: {value}")]
    InvalidElement {
        unit: String,
        annotation: &'static str,
        element: &'static str,
        value: String,
    },

    #[error("Failed to read annotations: {0}")]
    ClassFile(#[from] ClassFileError),
}

impl ScanError {
    /// Class the error was raised for, when known
    pub fn unit(&self) -> Option<&str> {
        match self {
            ScanError::MissingModId { unit }
            | ScanError::MissingNamespace { unit, .. }
            | ScanError::InvalidElement { unit, .. } => Some(unit.as_str()),
            ScanError::ClassFile(_) => None,
        }
    }
}

/// `@Mod("id")`: the class is the mod's main class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleIdentity {
    pub unit_name: String,
    pub declared_id: String,
}

/// `@ObjectHolder`: a static field the runtime fills with a registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectedField {
    pub owner_unit: String,
    pub field_name: String,
    pub field_descriptor: String,
    pub namespace: String,
    pub path: String,
}

impl InjectedField {
    /// `namespace:path`
    pub fn registry_id(&self) -> String {
        format!("{}:{}", self.namespace, self.path)
    }
}

/// Listener priority, in Forge's `EventPriority` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPriority {
    Highest,
    High,
    #[default]
    Normal,
    Low,
    Lowest,
}

impl EventPriority {
    pub fn from_constant(constant: &str) -> Option<Self> {
        match constant {
            "HIGHEST" => Some(EventPriority::Highest),
            "HIGH" => Some(EventPriority::High),
            "NORMAL" => Some(EventPriority::Normal),
            "LOW" => Some(EventPriority::Low),
            "LOWEST" => Some(EventPriority::Lowest),
            _ => None,
        }
    }

    /// Enum constant name in the runtime's `EventPriority`
    pub fn constant(&self) -> &'static str {
        match self {
            EventPriority::Highest => "HIGHEST",
            EventPriority::High => "HIGH",
            EventPriority::Normal => "NORMAL",
            EventPriority::Low => "LOW",
            EventPriority::Lowest => "LOWEST",
        }
    }
}

/// `@SubscribeEvent`: a method to call when its event fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriberMethod {
    pub owner_unit: String,
    pub method_name: String,
    pub method_descriptor: String,
    pub access_flags: u16,
    pub priority: EventPriority,
    pub receive_cancelled: bool,
}

impl SubscriberMethod {
    pub fn is_static(&self) -> bool {
        is_static(self.access_flags)
    }
}

/// Which event bus a subscriber class registers on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bus {
    #[default]
    Forge,
    Mod,
}

/// Physical side a subscriber class is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Client,
    DedicatedServer,
}

impl Side {
    pub fn from_constant(constant: &str) -> Option<Self> {
        match constant {
            "CLIENT" => Some(Side::Client),
            "DEDICATED_SERVER" => Some(Side::DedicatedServer),
            _ => None,
        }
    }

    pub fn constant(&self) -> &'static str {
        match self {
            Side::Client => "CLIENT",
            Side::DedicatedServer => "DEDICATED_SERVER",
        }
    }
}

/// `@Mod.EventBusSubscriber`: a class whose static handlers auto-register
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriberClass {
    pub owner_unit: String,
    pub bus: Bus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_id: Option<String>,
    /// Never empty; both sides when the annotation does not restrict it
    pub sides: Vec<Side>,
}

impl SubscriberClass {
    /// The only side this class loads on, if it is restricted to one
    pub fn single_side(&self) -> Option<Side> {
        match self.sides.as_slice() {
            [side] => Some(*side),
            _ => None,
        }
    }
}

/// Everything the scanner can discover on a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CapabilityDescriptor {
    ModuleIdentity(ModuleIdentity),
    InjectedField(InjectedField),
    SubscriberMethod(SubscriberMethod),
    SubscriberClass(SubscriberClass),
}

/// A field or method as seen by the detectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub name: String,
    pub descriptor: String,
    pub access_flags: u16,
}

/// Where an annotation was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationTarget {
    Class,
    Field(MemberRef),
    Method(MemberRef),
}

/// One (target, annotation) pair
#[derive(Debug, Clone, PartialEq)]
pub struct Annotated {
    pub target: AnnotationTarget,
    pub annotation: Annotation,
}

impl Annotated {
    fn is(&self, type_descriptor: &str) -> bool {
        self.annotation.type_descriptor == type_descriptor
    }
}

/// The annotations of one class that no detector has claimed yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSet {
    entries: Vec<Annotated>,
}

impl AnnotationSet {
    /// Gather class, field and method annotations, in that order
    pub fn from_unit(unit: &ClassUnit) -> Result<Self, ClassFileError> {
        let pool = &unit.constant_pool;
        let mut entries = Vec::new();

        for annotation in unit.annotations()? {
            entries.push(Annotated {
                target: AnnotationTarget::Class,
                annotation,
            });
        }

        for (members, is_field) in [(&unit.fields, true), (&unit.methods, false)] {
            for member in members {
                let annotations = member.annotations(pool)?;
                if annotations.is_empty() {
                    continue;
                }
                let member_ref = MemberRef {
                    name: member.name(pool)?.to_string(),
                    descriptor: member.descriptor(pool)?.to_string(),
                    access_flags: member.access_flags,
                };
                for annotation in annotations {
                    let target = if is_field {
                        AnnotationTarget::Field(member_ref.clone())
                    } else {
                        AnnotationTarget::Method(member_ref.clone())
                    };
                    entries.push(Annotated { target, annotation });
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotated> {
        self.entries.iter()
    }

    /// Remove and return every entry matching `predicate`, preserving order
    pub fn take(&mut self, predicate: impl Fn(&Annotated) -> bool) -> Vec<Annotated> {
        let (taken, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| predicate(e));
        self.entries = kept;
        taken
    }

    /// Class-level annotations of the given type
    pub fn take_on_class(&mut self, type_descriptor: &str) -> Vec<Annotated> {
        self.take(|e| e.is(type_descriptor) && e.target == AnnotationTarget::Class)
    }

    /// Field-level annotations of the given type
    pub fn take_on_fields(&mut self, type_descriptor: &str) -> Vec<Annotated> {
        self.take(|e| e.is(type_descriptor) && matches!(e.target, AnnotationTarget::Field(_)))
    }

    /// Method-level annotations of the given type
    pub fn take_on_methods(&mut self, type_descriptor: &str) -> Vec<Annotated> {
        self.take(|e| e.is(type_descriptor) && matches!(e.target, AnnotationTarget::Method(_)))
    }
}

/// Read-only facts about the unit being scanned
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub unit_name: String,
    /// Every field of the unit, annotated or not
    pub fields: Vec<MemberRef>,
}

impl ScanContext {
    pub fn from_unit(unit: &ClassUnit) -> Result<Self, ClassFileError> {
        let pool = &unit.constant_pool;
        let fields = unit
            .fields
            .iter()
            .map(|f| {
                Ok(MemberRef {
                    name: f.name(pool)?.to_string(),
                    descriptor: f.descriptor(pool)?.to_string(),
                    access_flags: f.access_flags,
                })
            })
            .collect::<Result<Vec<_>, ClassFileError>>()?;
        Ok(Self {
            unit_name: unit.name()?.to_string(),
            fields,
        })
    }
}

/// Output of one detector step
#[derive(Debug, Default)]
pub struct Detection {
    pub remaining: AnnotationSet,
    pub capabilities: Vec<CapabilityDescriptor>,
    pub transformations: Vec<AccessTransformation>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Detection {
    /// A step that has not found anything yet
    pub fn pass(remaining: AnnotationSet) -> Self {
        Self {
            remaining,
            ..Default::default()
        }
    }
}

/// A detector: claims its annotations and records what they mean
pub type Detector = fn(&ScanContext, AnnotationSet) -> Result<Detection, ScanError>;

/// The detector chain, in evaluation order
pub const DETECTORS: [Detector; 4] = [
    mod_identity::detect,
    object_holder::detect,
    subscribe_event::detect,
    event_bus_subscriber::detect,
];

/// Everything the scanner found on one unit
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub capabilities: Vec<CapabilityDescriptor>,
    pub transformations: AccessTransformations,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanOutcome {
    /// True when the unit needs neither rewriting nor shims
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty() && self.transformations.is_empty()
    }
}

/// Scan a unit with the standard detector chain
pub fn scan(unit: &ClassUnit) -> Result<ScanOutcome, ScanError> {
    scan_with(unit, &DETECTORS)
}

/// Scan a unit with an explicit detector chain
pub fn scan_with(unit: &ClassUnit, detectors: &[Detector]) -> Result<ScanOutcome, ScanError> {
    let context = ScanContext::from_unit(unit)?;
    let mut remaining = AnnotationSet::from_unit(unit)?;
    let mut outcome = ScanOutcome::default();

    for detector in detectors {
        let step = detector(&context, remaining)?;
        remaining = step.remaining;
        outcome.capabilities.extend(step.capabilities);
        outcome.transformations.extend(step.transformations);
        outcome.diagnostics.extend(step.diagnostics);
    }

    if !outcome.capabilities.is_empty() {
        debug!(
            "{}: {} capability(ies), {} unclaimed annotation(s)",
            context.unit_name,
            outcome.capabilities.len(),
            remaining.len()
        );
    }

    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classfile::access::{ACC_FINAL, ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC, ACC_SUPER};
    use crate::classfile::{ClassBuilder, ElementValue};

    pub(crate) fn string(value: &str) -> ElementValue {
        ElementValue::String(value.to_string())
    }

    pub(crate) fn enum_value(type_descriptor: &str, constant: &str) -> ElementValue {
        ElementValue::Enum {
            type_descriptor: type_descriptor.to_string(),
            constant: constant.to_string(),
        }
    }

    pub(crate) fn void_method(builder: &mut ClassBuilder, flags: u16, name: &str, descriptor: &str) {
        builder
            .method(flags, name, descriptor, |code, _| {
                code.return_value(None)?;
                Ok(())
            })
            .unwrap();
    }

    fn everything() -> ClassUnit {
        let mut builder = ClassBuilder::new("com/example/ExampleMod", "java/lang/Object", ACC_SUPER).unwrap();
        builder.annotation(Annotation::new(MOD).with("value", string("examplemod")));
        builder.annotation(Annotation::new(EVENT_BUS_SUBSCRIBER));
        builder
            .annotated_field(
                ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
                "RUBY",
                "Lnet/minecraft/item/Item;",
                &[Annotation::new(OBJECT_HOLDER).with("value", string("examplemod:ruby"))],
            )
            .unwrap();
        void_method(
            &mut builder,
            ACC_PRIVATE | ACC_STATIC,
            "onTick",
            "(Lnet/minecraftforge/event/TickEvent;)V",
        );
        builder
            .annotate_last_method(&[Annotation::new(SUBSCRIBE_EVENT), Annotation::new("Ljava/lang/Deprecated;")])
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_plain_class_has_no_capabilities() {
        let mut builder = ClassBuilder::new("com/example/Plain", "java/lang/Object", ACC_PUBLIC).unwrap();
        builder.field(ACC_PRIVATE, "x", "I").unwrap();
        void_method(&mut builder, ACC_PUBLIC, "run", "()V");
        builder.annotation(Annotation::new("Ljava/lang/Deprecated;"));
        let unit = builder.build().unwrap();

        let outcome = scan(&unit).unwrap();
        assert!(outcome.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_single_pass_finds_every_capability() {
        let outcome = scan(&everything()).unwrap();
        let kinds: Vec<_> = outcome
            .capabilities
            .iter()
            .map(|c| match c {
                CapabilityDescriptor::ModuleIdentity(_) => "mod",
                CapabilityDescriptor::InjectedField(_) => "holder",
                CapabilityDescriptor::SubscriberMethod(_) => "method",
                CapabilityDescriptor::SubscriberClass(_) => "class",
            })
            .collect();
        assert_eq!(kinds, vec!["mod", "holder", "method", "class"]);
        // DefinalizeField, MakeClassPublic, MakeMethodPublic
        assert_eq!(outcome.transformations.len(), 3);
    }

    #[test]
    fn test_detector_order_does_not_matter() {
        let unit = everything();
        let forward = scan(&unit).unwrap();
        let mut reversed_chain = DETECTORS;
        reversed_chain.reverse();
        let reversed = scan_with(&unit, &reversed_chain).unwrap();

        assert_eq!(forward.transformations, reversed.transformations);
        assert_eq!(forward.capabilities.len(), reversed.capabilities.len());
        for capability in &forward.capabilities {
            assert!(reversed.capabilities.contains(capability));
        }
    }

    #[test]
    fn test_take_preserves_unclaimed() {
        let unit = everything();
        let mut set = AnnotationSet::from_unit(&unit).unwrap();
        assert_eq!(set.len(), 5);
        let taken = set.take_on_methods(SUBSCRIBE_EVENT);
        assert_eq!(taken.len(), 1);
        assert!(set.take_on_class(SUBSCRIBE_EVENT).is_empty());
        assert_eq!(set.len(), 4);
    }
}
