//! Android XML inputs: resources, layouts and manifests
//!
//! Parse failures never abort an analysis. A file that cannot be read or
//! parsed contributes whatever was read before the error, usually nothing.

mod layout;
mod manifest;
pub mod resources;

pub use layout::LayoutParser;
pub use manifest::ManifestParser;
pub use resources::{file_resource, is_values_file, parse_values, ValuesParseResult};

use crate::names::AndroidResource;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

/// Result of parsing a layout or manifest file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct XmlParseResult {
    /// Class names referenced in the XML
    pub class_references: BTreeSet<String>,

    /// `@type/name` references
    pub resource_references: BTreeSet<AndroidResource>,

    /// `@+id/name` declarations
    pub declared_ids: BTreeSet<AndroidResource>,

    /// Package name from manifest
    pub package: Option<String>,
}

impl XmlParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: XmlParseResult) {
        self.class_references.extend(other.class_references);
        self.resource_references.extend(other.resource_references);
        self.declared_ids.extend(other.declared_ids);
        if self.package.is_none() {
            self.package = other.package;
        }
    }
}

/// Read an XML input, logging and skipping files that cannot be read
pub async fn read_xml(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Some(contents),
        Err(e) => {
            warn!("Skipping unreadable file {}: {}", path.display(), e);
            None
        }
    }
}
