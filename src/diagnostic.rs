// src/diagnostic.rs

//! Non-fatal findings recorded while transforming an archive
//!
//! A diagnostic means one capability (or, with class isolation enabled,
//! one class) was dropped and the archive transformation carried on.

use serde::Serialize;
use std::fmt;
use tracing::warn;

/// What was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Instance `@SubscribeEvent` method; only static handlers are bridged
    NonStaticSubscriber,
    /// `@SubscribeEvent` method whose descriptor is not `(LEvent;)V`
    UnsupportedSubscriberSignature,
    /// `@ObjectHolder` on a non-static field
    NonStaticObjectHolder,
    /// A second `@Mod` class after the module identity was resolved
    DuplicateModIdentity,
    /// A class that failed to process and was copied through unchanged
    SkippedClass,
}

/// One skipped capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Internal name of the class the finding belongs to
    pub unit: String,
    /// `name` or `name + descriptor` of the member, when the finding is member-level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            unit: unit.into(),
            member: None,
            message: message.into(),
        }
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    /// Emit the diagnostic through `tracing` and hand it back
    pub fn logged(self) -> Self {
        warn!("{}", self);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}::{}: {}", self.unit, member, self.message),
            None => write!(f, "{}: {}", self.unit, self.message),
        }
    }
}
