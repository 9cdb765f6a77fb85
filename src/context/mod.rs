//! Per-module memoization
//!
//! Every analysis result is an element of a module's [`ProjectContext`],
//! built on first access through its [`Key`]. Elements that are computed per
//! source set keep a [`SafeCache`] of their own.

mod engine;
mod project;
mod safe_cache;

pub use engine::Engine;
pub use project::{Key, Project, ProjectContext};
pub use safe_cache::SafeCache;
