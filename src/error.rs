//! Error types for graph loading and dependency analysis
//!
//! Resolution misses are never errors: a symbol that cannot be attributed is
//! cached as "not present". Everything in here is fatal for the current run.

use crate::model::{ModulePath, SourceSetName};
use miette::Diagnostic;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Every caller awaiting a failed construction receives a clone of its error
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum AnalysisError {
    #[error("module {missing} is not part of the graph (required by {dependent}, source set {source_set})")]
    #[diagnostic(
        code(modcheck::module_not_found),
        help("declare the module in the graph descriptor or remove the dependency")
    )]
    ModuleNotFound {
        missing: ModulePath,
        dependent: ModulePath,
        source_set: SourceSetName,
    },

    #[error("module {0} is not part of the graph")]
    #[diagnostic(code(modcheck::unknown_module))]
    UnknownModule(ModulePath),

    #[error("module {0} is declared more than once")]
    #[diagnostic(code(modcheck::duplicate_module))]
    DuplicateModule(ModulePath),

    #[error("module dependency cycle detected at {0}")]
    #[diagnostic(
        code(modcheck::dependency_cycle),
        help("module graphs must be acyclic; break the cycle before analyzing")
    )]
    DependencyCycle(ModulePath),

    #[error("source set cycle in {module} at {source_set}")]
    #[diagnostic(code(modcheck::source_set_cycle))]
    SourceSetCycle {
        module: ModulePath,
        source_set: SourceSetName,
    },

    #[error("no classpath source for {dependency} in {dependent} (source set {source_set}, test fixtures: {is_test_fixture})")]
    #[diagnostic(code(modcheck::source_not_found))]
    SourceNotFound {
        dependency: ModulePath,
        dependent: ModulePath,
        source_set: SourceSetName,
        is_test_fixture: bool,
    },

    #[error("failed to read {path}")]
    #[diagnostic(code(modcheck::io))]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("invalid graph descriptor {path}: {message}")]
    #[diagnostic(code(modcheck::descriptor))]
    Descriptor { path: PathBuf, message: String },

    #[error("symbol provider failed for {module} ({source_set}): {message}")]
    #[diagnostic(code(modcheck::symbols))]
    Symbols {
        module: ModulePath,
        source_set: SourceSetName,
        message: String,
    },

    #[error("cached element for {key} has an unexpected type")]
    #[diagnostic(code(modcheck::element_type))]
    ElementType { key: &'static str },
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
