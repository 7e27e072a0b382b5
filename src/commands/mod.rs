// src/commands/mod.rs
//! Command handlers for the patchwork CLI

mod scan;
mod transform;

pub use scan::cmd_scan;
pub use transform::{cmd_transform, TransformArgs};

use patchwork::scan::{Bus, CapabilityDescriptor};

/// One-line human description of a capability
pub(crate) fn describe(capability: &CapabilityDescriptor) -> String {
    match capability {
        CapabilityDescriptor::ModuleIdentity(identity) => format!("@Mod(\"{}\")", identity.declared_id),
        CapabilityDescriptor::InjectedField(field) => {
            format!("@ObjectHolder {} -> {}", field.field_name, field.registry_id())
        }
        CapabilityDescriptor::SubscriberMethod(method) => format!(
            "@SubscribeEvent {}{} [{}{}]",
            method.method_name,
            method.method_descriptor,
            method.priority.constant(),
            if method.receive_cancelled { ", receiveCanceled" } else { "" }
        ),
        CapabilityDescriptor::SubscriberClass(class) => {
            let bus = match class.bus {
                Bus::Forge => "FORGE",
                Bus::Mod => "MOD",
            };
            let sides: Vec<_> = class.sides.iter().map(|s| s.constant()).collect();
            format!("@Mod.EventBusSubscriber bus={} sides={}", bus, sides.join(","))
        }
    }
}
