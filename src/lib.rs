//! modcheck - dependency checks for multi-module Gradle/Android builds
//!
//! Given a graph of build modules with their source sets, configurations and
//! per-file symbol tables, modcheck works out which declared dependencies are
//! unused, which are only inherited, which must be `api`, and how deep each
//! module sits in the graph.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **Graph Loading** - Read a descriptor into an immutable [`ModuleGraph`]
//!    and a [`SymbolProvider`]
//! 2. **Context Cache** - One [`ProjectContext`](context::ProjectContext) per
//!    module, each analysis element built at most once
//! 3. **Classpath Resolution** - Direct and `api`-inherited dependencies per
//!    source set
//! 4. **Attribution** - Lazy declaration and reference sets, Android
//!    resources, generated code and Anvil scopes
//! 5. **Rules** - Unused, must-be-api and inherited dependencies
//! 6. **Reporting** - Output results in various formats

pub mod analysis;
pub mod android;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod lazy;
pub mod model;
pub mod names;
pub mod report;
pub mod rules;
pub mod symbols;

pub use config::Config;
pub use context::{Engine, Project};
pub use descriptor::LoadedGraph;
pub use error::{AnalysisError, Result};
pub use model::{ConfiguredDependency, Module, ModuleGraph, ModulePath, ProjectDependency, SourceSetName};
pub use report::{ReportFormat, Reporter};
pub use rules::{Finding, Report, RuleId, RuleRunner};
pub use symbols::{JvmFile, StaticSymbols, SymbolProvider};
