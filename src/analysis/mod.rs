//! Dependency analysis elements
//!
//! Each element is a [`Key`](crate::context::Key) of the per-module context
//! and caches its results per source set. Elements only ever hold module
//! data and other elements' caches, never a [`Project`](crate::context::Project):
//! methods take the project they work on as an argument.

mod android_resources;
mod anvil;
mod classpath;
mod declarations;
mod depth;
mod files;
mod generated;
mod inherited;
mod must_be_api;
mod references;
mod resolved;
mod sources;
mod uses;

pub use android_resources::{AndroidResourceDeclaredNames, ParsedAndroidFiles};
pub use anvil::{clean_scope_argument, AnvilGraph, AnvilScopeName, ScopedDeclarations};
pub use classpath::ClasspathDependencies;
pub use declarations::{dependency_declarations, Declarations};
pub use depth::{ProjectDepth, ProjectDepths};
pub use files::{JvmFiles, SourceFiles};
pub use generated::{GeneratedDeclarations, GeneratedIndex};
pub use inherited::{inherited_dependencies, InheritedDependency};
pub use must_be_api::{maybe_as_api, must_be_api_for, must_be_api_in, references_from_dependencies, MustBeApi, MustBeApiDependency};
pub use references::References;
pub use resolved::{DeclarationSource, ResolvedDeclaredNames};
pub use sources::DependencySources;
pub use uses::{any_reference_declared, unused_dependencies, uses};
