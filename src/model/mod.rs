//! Build graph model
//!
//! Modules, source sets, configurations and dependency edges. Everything in
//! here is an immutable value once [`ModuleGraph::new`] has accepted it.

mod code_generator;
mod configuration;
mod dependency;
mod graph;
mod module;
mod path;
mod source_set;

pub use code_generator::{default_bindings, CodeGeneratorBinding, CodeGenerators};
pub use configuration::{Configuration, ConfigurationName};
pub use dependency::{ConfiguredDependency, ExternalDependency, ProjectDependency, TransitiveProjectDependency};
pub use graph::ModuleGraph;
pub use module::{AndroidPlatform, Module, Platform};
pub use path::ModulePath;
pub use source_set::{SourceSet, SourceSetName};
