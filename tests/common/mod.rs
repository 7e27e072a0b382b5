// tests/common/mod.rs

//! Shared fixture builders for integration tests.

#![allow(dead_code)]

use patchwork::classfile::access::{ACC_FINAL, ACC_PUBLIC, ACC_STATIC, ACC_SUPER};
use patchwork::classfile::{Annotation, Attribute, ClassBuilder, ClassUnit, ElementValue};
use patchwork::scan::{MOD, OBJECT_HOLDER, SUBSCRIBE_EVENT};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const MOD_ID: &str = "examplemod";

pub const MODS_TOML: &str = r#"
modLoader = "javafml"
loaderVersion = "[28,)"
license = "MIT"

[[mods]]
modId = "examplemod"
version = "${file.jarVersion}"
displayName = "Example Mod"
authors = "Alice, Bob"

[[dependencies.examplemod]]
modId = "forge"
mandatory = true
versionRange = "[28,)"

[[dependencies.examplemod]]
modId = "minecraft"
mandatory = true
versionRange = "[1.14.4]"
"#;

pub const JAR_MANIFEST: &str = "Manifest-Version: 1.0\r\nImplementation-Version: 1.4.2\r\n\r\n";

pub const TICK_EVENT: &str = "(Lnet/minecraftforge/event/TickEvent;)V";

/// In-memory jar, written in insertion order
#[derive(Default)]
pub struct JarBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl JarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A jar with the manifest files every Forge mod carries
    pub fn forge_mod() -> Self {
        let mut jar = Self::new();
        jar.resource("META-INF/MANIFEST.MF", JAR_MANIFEST.as_bytes());
        jar.resource("META-INF/mods.toml", MODS_TOML.as_bytes());
        jar.resource("pack.mcmeta", br#"{"pack":{"description":"example","pack_format":4}}"#);
        jar
    }

    pub fn class(&mut self, unit: &ClassUnit) -> &mut Self {
        let name = format!("{}.class", unit.name().unwrap());
        self.entries.push((name, unit.to_bytes().unwrap()));
        self
    }

    pub fn resource(&mut self, name: &str, data: &[u8]) -> &mut Self {
        self.entries.push((name.to_string(), data.to_vec()));
        self
    }

    pub fn directory(&mut self, name: &str) -> &mut Self {
        self.entries.push((name.to_string(), Vec::new()));
        self
    }

    pub fn write(&self, path: &Path) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options =
            zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in &self.entries {
            if name.ends_with('/') {
                zip.add_directory(name.as_str(), options).unwrap();
            } else {
                zip.start_file(name.as_str(), options).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap();
    }
}

/// Every entry of a jar, decompressed
pub fn read_jar(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.insert(entry.name().to_string(), data);
    }
    entries
}

pub fn class_in(entries: &BTreeMap<String, Vec<u8>>, name: &str) -> ClassUnit {
    let data = entries
        .get(&format!("{}.class", name))
        .unwrap_or_else(|| panic!("{} missing from output", name));
    ClassUnit::parse(data).unwrap()
}

pub fn fabric_mod_json(entries: &BTreeMap<String, Vec<u8>>) -> serde_json::Value {
    serde_json::from_slice(&entries["fabric.mod.json"]).unwrap()
}

/// True if `needle` occurs in the serialized unit (e.g. as a constant)
pub fn references(unit: &ClassUnit, needle: &str) -> bool {
    let bytes = unit.to_bytes().unwrap();
    bytes.windows(needle.len()).any(|w| w == needle.as_bytes())
}

fn string(value: &str) -> ElementValue {
    ElementValue::String(value.to_string())
}

fn void_method(builder: &mut ClassBuilder, flags: u16, name: &str, descriptor: &str) {
    builder
        .method(flags, name, descriptor, |code, _| {
            code.return_value(None)?;
            Ok(())
        })
        .unwrap();
}

/// `@Mod(id) public class <name>`
pub fn mod_class(name: &str, id: &str) -> ClassUnit {
    let mut builder = ClassBuilder::new(name, "java/lang/Object", ACC_PUBLIC | ACC_SUPER).unwrap();
    builder.annotation(Annotation::new(MOD).with("value", string(id)));
    builder.default_constructor().unwrap();
    builder.build().unwrap()
}

/// A class with one `@SubscribeEvent` handler for `TickEvent`
pub fn subscriber_class(name: &str, handler_flags: u16, with_mod: Option<&str>) -> ClassUnit {
    let mut builder = ClassBuilder::new(name, "java/lang/Object", ACC_SUPER).unwrap();
    if let Some(id) = with_mod {
        builder.annotation(Annotation::new(MOD).with("value", string(id)));
    }
    void_method(&mut builder, handler_flags, "onTick", TICK_EVENT);
    builder.annotate_last_method(&[Annotation::new(SUBSCRIBE_EVENT)]).unwrap();
    builder.build().unwrap()
}

/// A class with one `public static final` `@ObjectHolder` field
pub fn holder_class(name: &str, field: &str, descriptor: &str, registry_id: &str) -> ClassUnit {
    let mut builder = ClassBuilder::new(name, "java/lang/Object", ACC_PUBLIC | ACC_SUPER).unwrap();
    builder
        .annotated_field(
            ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
            field,
            descriptor,
            &[Annotation::new(OBJECT_HOLDER).with("value", string(registry_id))],
        )
        .unwrap();
    builder.build().unwrap()
}

/// A class without any Forge metadata
pub fn plain_class(name: &str) -> ClassUnit {
    let mut builder = ClassBuilder::new(name, "java/lang/Object", ACC_PUBLIC | ACC_SUPER).unwrap();
    builder.field(ACC_PUBLIC | ACC_FINAL, "id", "I").unwrap();
    void_method(&mut builder, ACC_PUBLIC, "run", "()V");
    builder.build().unwrap()
}

/// A plain class whose invisible annotation nests `depth` arrays
pub fn deeply_nested_class(name: &str, depth: usize) -> ClassUnit {
    let mut unit = plain_class(name);
    let name_index = unit.constant_pool.add_utf8("RuntimeInvisibleAnnotations").unwrap();
    let type_index = unit.constant_pool.add_utf8("Lcom/example/Deep;").unwrap();
    let element_index = unit.constant_pool.add_utf8("value").unwrap();

    let mut info = Vec::new();
    info.extend_from_slice(&1u16.to_be_bytes());
    info.extend_from_slice(&type_index.to_be_bytes());
    info.extend_from_slice(&1u16.to_be_bytes());
    info.extend_from_slice(&element_index.to_be_bytes());
    for _ in 0..depth {
        info.push(b'[');
        info.extend_from_slice(&1u16.to_be_bytes());
    }
    info.push(b'[');
    info.extend_from_slice(&0u16.to_be_bytes());

    unit.attributes.push(Attribute { name_index, info });
    unit
}
