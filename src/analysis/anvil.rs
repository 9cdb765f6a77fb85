//! Anvil scope graph
//!
//! Declarations annotated with `@ContributesTo(AppScope::class)` and friends
//! contribute to a scope. `@MergeComponent(AppScope::class)` merges every
//! contribution of that scope into a component, so a module that contributes
//! to a scope merged downstream is used even without a direct reference.

use super::declarations::dependency_declarations;
use super::files::SourceFiles;
use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::model::SourceSetName;
use crate::names::{Language, QualifiedName};
use crate::symbols::{AnnotatedDeclaration, JvmFile};
use futures::future::BoxFuture;
use futures::FutureExt;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

pub const CONTRIBUTE_ANNOTATIONS: &[&str] = &[
    "com.squareup.anvil.annotations.ContributesTo",
    "com.squareup.anvil.annotations.ContributesBinding",
    "com.squareup.anvil.annotations.ContributesMultibinding",
    "com.squareup.anvil.annotations.ContributesSubcomponent",
];

pub const MERGE_ANNOTATIONS: &[&str] = &[
    "com.squareup.anvil.annotations.MergeComponent",
    "com.squareup.anvil.annotations.MergeSubcomponent",
];

/// Fully qualified name of a scope class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AnvilScopeName(String);

impl AnvilScopeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnvilScopeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScopedDeclarations {
    pub contributions: BTreeMap<AnvilScopeName, BTreeSet<QualifiedName>>,
    pub merges: BTreeMap<AnvilScopeName, BTreeSet<QualifiedName>>,
}

impl ScopedDeclarations {
    pub fn contributed_scopes(&self) -> impl Iterator<Item = &AnvilScopeName> {
        self.contributions.keys()
    }

    pub fn merged_scopes(&self) -> impl Iterator<Item = &AnvilScopeName> {
        self.merges
            .iter()
            .filter(|(_, declarations)| !declarations.is_empty())
            .map(|(scope, _)| scope)
    }
}

#[derive(Default)]
pub struct AnvilGraph {
    cache: SafeCache<SourceSetName, Arc<ScopedDeclarations>>,
}

impl Key for AnvilGraph {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl AnvilGraph {
    pub async fn get(&self, project: &Project, source_set: &SourceSetName) -> Result<Arc<ScopedDeclarations>> {
        self.cache
            .get_or_try_init(source_set.clone(), || scoped_declarations(project, source_set))
            .await
    }

    /// Scopes merged in any source set of the module
    pub async fn merged_scope_names(&self, project: &Project) -> Result<BTreeSet<AnvilScopeName>> {
        let mut merged = BTreeSet::new();
        for source_set in project.module().source_sets.keys() {
            merged.extend(self.get(project, source_set).await?.merged_scopes().cloned());
        }
        Ok(merged)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeUse {
    Contribute,
    Merge,
}

fn mentions(file: &JvmFile, annotation: &str, fq: &str) -> bool {
    if annotation.contains('.') {
        return annotation == fq;
    }
    fq.rsplit('.').next() == Some(annotation)
        && (file.imports.contains(fq) || file.maybe_extra_references.contains(fq) || file.references.contains(fq))
}

/// The annotation as a known Anvil annotation, given the file's imports
fn scope_use(file: &JvmFile, annotation: &str) -> Option<ScopeUse> {
    if CONTRIBUTE_ANNOTATIONS.iter().any(|fq| mentions(file, annotation, fq)) {
        Some(ScopeUse::Contribute)
    } else if MERGE_ANNOTATIONS.iter().any(|fq| mentions(file, annotation, fq)) {
        Some(ScopeUse::Merge)
    } else {
        None
    }
}

/// `scope = AppScope::class` -> `AppScope`
pub fn clean_scope_argument(argument: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?:scope\s*=\s*)?([A-Za-z_][\w.]*)\s*::\s*class").expect("valid scope argument regex")
    });
    re.captures(argument)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

async fn resolve_scope(
    project: &Project,
    source_set: &SourceSetName,
    file: &JvmFile,
    scope: &str,
) -> Result<AnvilScopeName> {
    // Already fully qualified
    if scope.contains('.') && scope.starts_with(char::is_lowercase) {
        return Ok(AnvilScopeName::new(scope));
    }

    let (first, rest) = match scope.split_once('.') {
        Some((first, rest)) => (first, Some(rest)),
        None => (scope, None),
    };

    // 1. explicit import
    let suffix = format!(".{}", first);
    if let Some(import) = file.imports.iter().find(|import| import.ends_with(&suffix)) {
        return Ok(AnvilScopeName::new(match rest {
            Some(rest) => format!("{}.{}", import, rest),
            None => import.clone(),
        }));
    }

    // 2. declared by a dependency and mentioned by the file
    let full_suffix = format!(".{}", scope);
    let candidates: Vec<&String> = file
        .maybe_extra_references
        .iter()
        .filter(|reference| reference.ends_with(&full_suffix))
        .collect();
    if !candidates.is_empty() {
        for dependency in project.module().project_dependencies_for(source_set) {
            let dependency_project = project.dependency(&dependency.path, source_set)?;
            let declarations = dependency_declarations(&dependency_project, dependency.is_test_fixture).await?;
            for candidate in &candidates {
                if declarations.contains_name(candidate).await? {
                    return Ok(AnvilScopeName::new(candidate.as_str()));
                }
            }
        }
    }

    // 3. and 4. the file's own package, whether or not it was referenced
    if file.package.is_empty() {
        Ok(AnvilScopeName::new(scope))
    } else {
        Ok(AnvilScopeName::new(format!("{}.{}", file.package, scope)))
    }
}

async fn scoped_declarations(project: &Project, source_set: &SourceSetName) -> Result<Arc<ScopedDeclarations>> {
    let mut scoped = ScopedDeclarations::default();
    if !project.module().anvil {
        return Ok(Arc::new(scoped));
    }

    let files = SourceFiles::of(project).await?;
    let jvm = files.jvm_files(source_set).await?;

    for file in jvm.iter().filter(|f| f.language == Language::Kotlin) {
        for AnnotatedDeclaration {
            declaration,
            annotation,
            scope,
        } in &file.annotated
        {
            let Some(kind) = scope_use(file, annotation) else {
                continue;
            };
            let Some(cleaned) = clean_scope_argument(scope) else {
                debug!("Unrecognized scope argument `{}` on {}", scope, declaration);
                continue;
            };

            let scope_name = resolve_scope(project, source_set, file, &cleaned).await?;
            let target = match kind {
                ScopeUse::Contribute => &mut scoped.contributions,
                ScopeUse::Merge => &mut scoped.merges,
            };
            target.entry(scope_name).or_default().insert(declaration.clone());
        }
    }

    Ok(Arc::new(scoped))
}
