//! Android resource declarations
//!
//! Values files (`res/values*/…xml`) declare one resource per element. Every
//! other resource directory declares one resource per file, named after the
//! file and typed after the directory (`drawable-hdpi/icon.png` is
//! `R.drawable.icon`).

use crate::names::AndroidResource;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Resources declared and referenced by a values file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValuesParseResult {
    pub declared: BTreeSet<AndroidResource>,
    pub references: BTreeSet<AndroidResource>,
}

/// Whether `path` lives in a `values` or `values-<qualifier>` directory
pub fn is_values_file(path: &Path) -> bool {
    resource_directory_type(path).is_some_and(|kind| kind == "values")
        && path.extension().is_some_and(|ext| ext == "xml")
}

/// Resource type of the directory holding `path`, qualifiers stripped
/// (`res/drawable-hdpi/icon.png` -> `drawable`)
pub fn resource_directory_type(path: &Path) -> Option<String> {
    let dir = path.parent()?.file_name()?.to_str()?;
    let kind = dir.split('-').next()?;
    if kind.is_empty() {
        None
    } else {
        Some(kind.to_string())
    }
}

/// The resource a non-values file declares, e.g. `R.layout.activity_main`
pub fn file_resource(path: &Path) -> Option<AndroidResource> {
    let kind = resource_directory_type(path)?;
    if kind == "values" {
        return None;
    }
    let file_name = path.file_name()?.to_str()?;
    // `icon.9.png` is still `icon`
    let name = file_name.split('.').next()?;
    if name.is_empty() {
        return None;
    }
    Some(AndroidResource::new(&kind, name))
}

/// Map a values element to its resource type
fn values_tag_type(tag_name: &str) -> Option<&'static str> {
    match tag_name {
        "string" => Some("string"),
        "color" => Some("color"),
        "dimen" => Some("dimen"),
        "style" => Some("style"),
        "string-array" | "integer-array" | "array" => Some("array"),
        "plurals" => Some("plurals"),
        "bool" => Some("bool"),
        "integer" => Some("integer"),
        "fraction" => Some("fraction"),
        "attr" => Some("attr"),
        "declare-styleable" => Some("styleable"),
        _ => None,
    }
}

fn attribute(element: &BytesStart, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn collect_attribute_references(element: &BytesStart, result: &mut BTreeSet<AndroidResource>) {
    for attr in element.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        if let Some(resource) = AndroidResource::from_xml_reference(&value) {
            result.insert(resource);
        }
    }
}

/// Parse a values file. Malformed XML keeps whatever was read before the error.
pub fn parse_values(path: &Path, contents: &str) -> ValuesParseResult {
    let mut result = ValuesParseResult::default();
    let mut reader = Reader::from_str(contents);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut styleable: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                values_element(e, true, &mut styleable, &mut result);
            }
            Ok(Event::Empty(ref e)) => {
                values_element(e, false, &mut styleable, &mut result);
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"declare-styleable" {
                    styleable = None;
                }
            }
            Ok(Event::Text(ref e)) => {
                let bytes: &[u8] = e.as_ref();
                let text = String::from_utf8_lossy(bytes);
                if let Some(resource) = AndroidResource::from_xml_reference(&text) {
                    result.references.insert(resource);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!("Error parsing values file {}: {:?}", path.display(), e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "Parsed values file {}: {} resources, {} references",
        path.display(),
        result.declared.len(),
        result.references.len()
    );

    result
}

fn values_element(
    e: &BytesStart,
    has_children: bool,
    styleable: &mut Option<String>,
    result: &mut ValuesParseResult,
) {
    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

    match (tag_name.as_str(), attribute(e, b"name")) {
        // <item type="id" name="x"/> and friends
        ("item", Some(name)) => {
            if let Some(kind) = attribute(e, b"type") {
                result.declared.insert(AndroidResource::new(&kind, &name));
            }
        }
        // Attributes of a styleable are both `attr` and `styleable` entries
        ("attr", Some(name)) if styleable.is_some() => {
            if let Some(parent) = styleable.as_deref() {
                result
                    .declared
                    .insert(AndroidResource::new("styleable", &format!("{}_{}", parent, name)));
            }
            if !name.contains(':') {
                result.declared.insert(AndroidResource::new("attr", &name));
            }
        }
        (tag, Some(name)) => {
            if let Some(kind) = values_tag_type(tag) {
                result.declared.insert(AndroidResource::new(kind, &name));
            }
            if tag == "declare-styleable" && has_children {
                *styleable = Some(name.replace('.', "_"));
            }
        }
        _ => {}
    }

    collect_attribute_references(e, &mut result.references);
}
