// src/classfile/access.rs
//! JVM access flag constants and visibility helpers

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
/// `ACC_SUPER` on classes
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;

const VISIBILITY_MASK: u16 = ACC_PUBLIC | ACC_PRIVATE | ACC_PROTECTED;

/// Raise visibility to public, leaving every non-visibility bit untouched
///
/// Already-public flags are returned unchanged.
pub fn widen_to_public(flags: u16) -> u16 {
    (flags & !VISIBILITY_MASK) | ACC_PUBLIC
}

pub fn is_static(flags: u16) -> bool {
    flags & ACC_STATIC != 0
}

pub fn is_final(flags: u16) -> bool {
    flags & ACC_FINAL != 0
}

pub fn is_public(flags: u16) -> bool {
    flags & ACC_PUBLIC != 0
}
