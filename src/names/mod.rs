//! Symbol names
//!
//! One structured representation is used everywhere: a [`QualifiedName`] is a
//! package plus a chain of simple names. Declarations carry the languages
//! they are visible from and where they came from; references carry the
//! language of the file that wrote them.

mod android;

pub use android::{data_binding_name, is_unqualified_r_reference, r_class_name, AndroidResource};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Anything that can be looked up by its dotted name
pub trait Named {
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Kotlin,
    Java,
    Xml,
}

/// Which languages can see a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applicability {
    #[default]
    Agnostic,
    Kotlin,
    Java,
}

impl Applicability {
    /// XML references resolve against anything
    pub fn admits(self, language: Language) -> bool {
        match (self, language) {
            (Applicability::Agnostic, _) | (_, Language::Xml) => true,
            (Applicability::Kotlin, Language::Kotlin) => true,
            (Applicability::Java, Language::Java) => true,
            _ => false,
        }
    }
}

/// Package plus simple names, e.g. `com.app` + `[Outer, Inner]`
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    fq: Arc<str>,
    package_len: usize,
}

impl QualifiedName {
    pub fn new(package: &str, simple_names: &[&str]) -> Self {
        let mut fq = String::from(package);
        for simple in simple_names {
            if !fq.is_empty() {
                fq.push('.');
            }
            fq.push_str(simple);
        }
        Self {
            fq: fq.into(),
            package_len: package.len(),
        }
    }

    /// Split a dotted name, treating the first capitalized segment as the
    /// start of the simple names (`com.app.R.string.x` -> `com.app` + `R.string.x`)
    pub fn parse(dotted: &str) -> Self {
        let dotted = dotted.trim();
        let mut package_len = 0;
        for (index, segment) in dotted.split('.').enumerate() {
            if segment.starts_with(char::is_uppercase) {
                break;
            }
            package_len += segment.len() + usize::from(index > 0);
        }
        // A name without any capitalized segment is all package, which makes
        // top-level functions and properties look like packages. Keep the last
        // segment as the simple name instead.
        if package_len >= dotted.len() {
            package_len = dotted.rfind('.').unwrap_or(0);
        }
        Self {
            fq: dotted.into(),
            package_len,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.fq
    }

    pub fn package(&self) -> &str {
        &self.fq[..self.package_len]
    }

    pub fn simple_names(&self) -> Vec<&str> {
        let rest = &self.fq[self.package_len..];
        rest.trim_start_matches('.').split('.').filter(|s| !s.is_empty()).collect()
    }

    /// Last simple name
    pub fn simple_name(&self) -> &str {
        self.fq.rsplit('.').next().unwrap_or(&self.fq)
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({})", self.fq)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fq)
    }
}

impl Named for QualifiedName {
    fn name(&self) -> &str {
        self.as_str()
    }
}

/// Where a declared name comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameOrigin {
    /// Written in a source file
    Source,
    /// Produced by a code generator from other names
    Generated { sources: Vec<QualifiedName> },
    /// A member of a generated `R` class
    AndroidResource {
        resource: Arc<AndroidResource>,
        sources: Vec<QualifiedName>,
    },
}

/// A symbol defined by a source set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredName {
    pub name: QualifiedName,
    pub applicability: Applicability,
    pub origin: NameOrigin,
}

impl DeclaredName {
    pub fn source(name: QualifiedName, applicability: Applicability) -> Self {
        Self {
            name,
            applicability,
            origin: NameOrigin::Source,
        }
    }

    pub fn agnostic(dotted: &str) -> Self {
        Self::source(QualifiedName::parse(dotted), Applicability::Agnostic)
    }

    pub fn generated(name: QualifiedName, sources: Vec<QualifiedName>) -> Self {
        Self {
            name,
            applicability: Applicability::Agnostic,
            origin: NameOrigin::Generated { sources },
        }
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }

    /// Names this declaration was generated from, empty for source declarations
    pub fn generated_sources(&self) -> &[QualifiedName] {
        match &self.origin {
            NameOrigin::Source => &[],
            NameOrigin::Generated { sources } | NameOrigin::AndroidResource { sources, .. } => sources,
        }
    }

    pub fn is_generated(&self) -> bool {
        !self.generated_sources().is_empty()
    }

    pub fn resource(&self) -> Option<&Arc<AndroidResource>> {
        match &self.origin {
            NameOrigin::AndroidResource { resource, .. } => Some(resource),
            _ => None,
        }
    }

    pub fn matches(&self, reference: &ReferenceName) -> bool {
        self.as_str() == reference.as_str() && self.applicability.admits(reference.language)
    }
}

impl Named for DeclaredName {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DeclaredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symbol used by a source file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceName {
    name: Arc<str>,
    pub language: Language,
}

impl ReferenceName {
    pub fn new(name: &str, language: Language) -> Self {
        Self {
            name: name.trim().into(),
            language,
        }
    }

    pub fn kotlin(name: &str) -> Self {
        Self::new(name, Language::Kotlin)
    }

    pub fn java(name: &str) -> Self {
        Self::new(name, Language::Java)
    }

    pub fn xml(name: &str) -> Self {
        Self::new(name, Language::Xml)
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Named for ReferenceName {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ReferenceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
