use crate::names::{Applicability, Language};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top level of a graph descriptor file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphDescriptor {
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,
    /// Code generators the build uses besides the built-in ones
    #[serde(default)]
    pub code_generators: Vec<crate::model::CodeGeneratorBinding>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDescriptor {
    pub path: String,
    #[serde(default)]
    pub android: Option<AndroidDescriptor>,
    #[serde(default)]
    pub anvil: bool,
    /// The kapt plugin is applied even without `kapt` dependencies
    #[serde(default)]
    pub kapt: bool,
    #[serde(default)]
    pub source_sets: BTreeMap<String, SourceSetDescriptor>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndroidDescriptor {
    #[serde(default)]
    pub base_package: Option<String>,
    #[serde(default)]
    pub source_set_packages: BTreeMap<String, String>,
    #[serde(default = "enabled")]
    pub resources: bool,
    #[serde(default)]
    pub view_binding: bool,
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSetDescriptor {
    /// Direct parents. Left out, every source set but `main` sits on `main`.
    #[serde(default, alias = "upstream")]
    pub parents: Option<Vec<String>>,
    /// Resource files or `res` directories, relative to the descriptor
    #[serde(default)]
    pub resources: Vec<PathBuf>,
    #[serde(default)]
    pub layouts: Vec<PathBuf>,
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

/// Symbol table of one source file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDescriptor {
    pub path: PathBuf,
    /// Taken from the extension when left out
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub declarations: Vec<DeclarationDescriptor>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub maybe_references: Vec<String>,
    #[serde(default)]
    pub api_references: Vec<String>,
    #[serde(default)]
    pub annotated: Vec<AnnotatedDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeclarationDescriptor {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        applicability: Applicability,
        #[serde(default)]
        generated_from: Vec<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotatedDescriptor {
    pub declaration: String,
    pub annotation: String,
    #[serde(default)]
    pub scope: String,
}

/// `project` or `external`, exactly one of them
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyDescriptor {
    pub configuration: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub external: Option<String>,
    #[serde(default)]
    pub test_fixtures: bool,
}
