//! Symbol tables per source set
//!
//! Parsing Kotlin and Java is somebody else's job. The engine only sees the
//! result, one [`JvmFile`] per source file, through a [`SymbolProvider`].

use crate::error::Result;
use crate::model::{Module, ModulePath, SourceSetName};
use crate::names::{Applicability, DeclaredName, Language, QualifiedName, ReferenceName};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

/// An annotated declaration with the raw scope argument of the annotation,
/// e.g. `@ContributesTo(scope = AppScope::class) interface AppModule`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDeclaration {
    pub declaration: QualifiedName,
    /// Annotation as written: simple or fully qualified
    pub annotation: String,
    /// Argument text as written, e.g. `scope = AppScope::class`
    pub scope: String,
}

/// Symbol table of one Kotlin or Java source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JvmFile {
    pub path: PathBuf,
    pub language: Language,
    pub package: String,
    pub imports: BTreeSet<String>,
    pub declarations: Vec<DeclaredName>,
    /// Fully resolved references from the file body
    pub references: BTreeSet<String>,
    /// Candidate names for references that could not be resolved exactly,
    /// e.g. through wildcard imports or same-package lookups
    pub maybe_extra_references: BTreeSet<String>,
    /// References that appear in the file's public API (signatures of
    /// public and protected members, supertypes)
    pub api_references: BTreeSet<String>,
    pub annotated: Vec<AnnotatedDeclaration>,
}

impl JvmFile {
    pub fn new(path: impl Into<PathBuf>, language: Language, package: &str) -> Self {
        Self {
            path: path.into(),
            language,
            package: package.to_string(),
            imports: BTreeSet::new(),
            declarations: Vec::new(),
            references: BTreeSet::new(),
            maybe_extra_references: BTreeSet::new(),
            api_references: BTreeSet::new(),
            annotated: Vec::new(),
        }
    }

    pub fn kotlin(path: impl Into<PathBuf>, package: &str) -> Self {
        Self::new(path, Language::Kotlin, package)
    }

    pub fn java(path: impl Into<PathBuf>, package: &str) -> Self {
        Self::new(path, Language::Java, package)
    }

    pub fn declaring(mut self, name: &str) -> Self {
        self.declarations.push(DeclaredName::agnostic(name));
        self
    }

    pub fn declaring_for(mut self, name: &str, applicability: Applicability) -> Self {
        self.declarations
            .push(DeclaredName::source(QualifiedName::parse(name), applicability));
        self
    }

    pub fn importing(mut self, name: &str) -> Self {
        self.imports.insert(name.to_string());
        self
    }

    pub fn referencing(mut self, name: &str) -> Self {
        self.references.insert(name.to_string());
        self
    }

    pub fn maybe_referencing(mut self, name: &str) -> Self {
        self.maybe_extra_references.insert(name.to_string());
        self
    }

    /// A reference that is part of the public API. Public API references are
    /// also plain references.
    pub fn exposing(mut self, name: &str) -> Self {
        self.api_references.insert(name.to_string());
        self.references.insert(name.to_string());
        self
    }

    pub fn annotated(mut self, declaration: &str, annotation: &str, scope: &str) -> Self {
        self.annotated.push(AnnotatedDeclaration {
            declaration: QualifiedName::parse(declaration),
            annotation: annotation.to_string(),
            scope: scope.to_string(),
        });
        self
    }

    /// Imports and resolved references as reference names
    pub fn explicit_references(&self) -> impl Iterator<Item = ReferenceName> + '_ {
        self.imports
            .iter()
            .chain(self.references.iter())
            .map(move |name| ReferenceName::new(name, self.language))
    }

    pub fn speculative_references(&self) -> impl Iterator<Item = ReferenceName> + '_ {
        self.maybe_extra_references
            .iter()
            .map(move |name| ReferenceName::new(name, self.language))
    }

    pub fn public_api_references(&self) -> impl Iterator<Item = ReferenceName> + '_ {
        self.api_references
            .iter()
            .map(move |name| ReferenceName::new(name, self.language))
    }
}

/// Supplies the parsed source files of a module's source set
#[async_trait]
pub trait SymbolProvider: Send + Sync {
    async fn jvm_files(&self, module: &Module, source_set: &SourceSetName) -> Result<Vec<Arc<JvmFile>>>;
}

/// In-memory symbol tables
#[derive(Debug, Default)]
pub struct StaticSymbols {
    files: HashMap<(ModulePath, SourceSetName), Vec<Arc<JvmFile>>>,
}

impl StaticSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: impl Into<ModulePath>, source_set: impl Into<SourceSetName>, file: JvmFile) {
        self.files
            .entry((module.into(), source_set.into()))
            .or_default()
            .push(Arc::new(file));
    }

    pub fn with_file(mut self, module: &str, source_set: &str, file: JvmFile) -> Self {
        self.insert(module, source_set, file);
        self
    }

    pub fn file_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl SymbolProvider for StaticSymbols {
    async fn jvm_files(&self, module: &Module, source_set: &SourceSetName) -> Result<Vec<Arc<JvmFile>>> {
        Ok(self
            .files
            .get(&(module.path.clone(), source_set.clone()))
            .cloned()
            .unwrap_or_default())
    }
}
