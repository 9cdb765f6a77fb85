use super::anvil::AnvilGraph;
use super::classpath::ClasspathDependencies;
use super::declarations::{dependency_declarations, Declarations};
use super::references::References;
use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::lazy::LazySet;
use crate::model::{ConfigurationName, ProjectDependency, SourceSetName, TransitiveProjectDependency};
use crate::names::{is_unqualified_r_reference, DeclaredName, ReferenceName};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// A dependency whose declarations appear in the consumer's public API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MustBeApiDependency {
    pub dependency: ProjectDependency,
    /// The direct dependency that puts it on the classpath
    pub source: ProjectDependency,
    pub source_set: SourceSetName,
}

/// Dependencies that must be declared with an `api` configuration
#[derive(Default)]
pub struct MustBeApi {
    cache: SafeCache<(), Arc<Vec<MustBeApiDependency>>>,
}

impl Key for MustBeApi {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl MustBeApi {
    pub async fn get(&self, project: &Project) -> Result<Arc<Vec<MustBeApiDependency>>> {
        self.cache.get_or_try_init((), || must_be_api(project)).await
    }
}

async fn must_be_api(project: &Project) -> Result<Arc<Vec<MustBeApiDependency>>> {
    let mut result = Vec::new();
    let source_sets: Vec<SourceSetName> = project
        .module()
        .source_sets
        .keys()
        .filter(|name| !name.is_testing_only())
        .cloned()
        .collect();

    for source_set in source_sets {
        result.extend(must_be_api_in(project, &source_set).await?);
    }
    Ok(Arc::new(result))
}

/// Public API references of the source set that it does not declare itself
async fn public_references(project: &Project, source_set: &SourceSetName) -> Result<Vec<ReferenceName>> {
    let api = project.get::<References>().await?.api(project, source_set).await?;
    let own = project
        .get::<Declarations>()
        .await?
        .get(project, source_set, true)
        .await?;

    let mut external = Vec::new();
    for reference in api.iter() {
        if own
            .find(reference.as_str(), |declared| declared.matches(reference))
            .await?
            .is_none()
        {
            external.push(reference.clone());
        }
    }
    Ok(external)
}

/// Unqualified `R` references that one of the direct dependencies declares.
/// Resources further down the classpath do not make a dependency api.
pub async fn references_from_dependencies(
    project: &Project,
    source_set: &SourceSetName,
    references: &[ReferenceName],
) -> Result<HashSet<String>> {
    let r_references: Vec<&ReferenceName> = references
        .iter()
        .filter(|reference| is_unqualified_r_reference(reference.as_str()))
        .collect();

    let mut declared = HashSet::new();
    if r_references.is_empty() {
        return Ok(declared);
    }

    for dependency in project.module().project_dependencies_for(source_set) {
        let dependency_project = project.dependency(&dependency.path, source_set)?;
        let declarations = dependency_declarations(&dependency_project, dependency.is_test_fixture).await?;
        for reference in &r_references {
            if declarations.contains_name(reference.as_str()).await? {
                declared.insert(reference.as_str().to_string());
            }
        }
    }
    Ok(declared)
}

async fn exposes(
    references: &[ReferenceName],
    direct_r_references: &HashSet<String>,
    declarations: &LazySet<DeclaredName>,
) -> Result<bool> {
    for reference in references {
        if is_unqualified_r_reference(reference.as_str()) && !direct_r_references.contains(reference.as_str()) {
            continue;
        }
        let declared = declarations
            .find(reference.as_str(), |declared| declared.matches(reference))
            .await?;
        if declared.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn declared_as_api(project: &Project, source_set: &SourceSetName, dependency: &ProjectDependency) -> bool {
    let module = project.module();
    module.declares(&source_set.api_config(), dependency) || module.declares(&ConfigurationName::api(), dependency)
}

/// Classpath dependencies of one source set that must be api.
///
/// Candidates are the non-api classpath entries, plus entries contributing to
/// a scope the module merges. Anything inherited through an `api` edge is an
/// inherited dependency instead.
pub async fn must_be_api_in(project: &Project, source_set: &SourceSetName) -> Result<Vec<MustBeApiDependency>> {
    let references = public_references(project, source_set).await?;
    if references.is_empty() {
        return Ok(Vec::new());
    }

    let direct_r_references = references_from_dependencies(project, source_set, &references).await?;
    let classpath = project
        .get::<ClasspathDependencies>()
        .await?
        .get(project, source_set)
        .await?;

    let mut candidates: Vec<&TransitiveProjectDependency> = classpath
        .iter()
        .filter(|entry| !entry.contributed.configuration.is_api())
        .collect();
    candidates.extend(scope_contributing(project, source_set, &classpath).await?);

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for entry in candidates {
        if declared_as_api(project, source_set, &entry.contributed)
            || !seen.insert((entry.contributed.path.clone(), entry.contributed.is_test_fixture))
        {
            continue;
        }
        if exposes_dependency(project, source_set, &references, &direct_r_references, &entry.contributed).await? {
            result.push(MustBeApiDependency {
                dependency: entry.contributed.clone(),
                source: entry.source.clone(),
                source_set: source_set.clone(),
            });
        }
    }
    Ok(result)
}

/// Classpath entries that contribute to a scope merged by the module
async fn scope_contributing<'a>(
    project: &Project,
    source_set: &SourceSetName,
    classpath: &'a [TransitiveProjectDependency],
) -> Result<Vec<&'a TransitiveProjectDependency>> {
    let merged = project.get::<AnvilGraph>().await?.merged_scope_names(project).await?;
    if merged.is_empty() {
        return Ok(Vec::new());
    }

    let mut contributing = Vec::new();
    for entry in classpath {
        if entry.contributed.configuration == ConfigurationName::api() {
            continue;
        }
        let dependency_project = project.dependency(&entry.contributed.path, source_set)?;
        let scoped = dependency_project
            .get::<AnvilGraph>()
            .await?
            .get(&dependency_project, &SourceSetName::MAIN)
            .await?;
        if scoped.contributed_scopes().any(|scope| merged.contains(scope)) {
            contributing.push(entry);
        }
    }
    Ok(contributing)
}

async fn exposes_dependency(
    project: &Project,
    source_set: &SourceSetName,
    references: &[ReferenceName],
    direct_r_references: &HashSet<String>,
    dependency: &ProjectDependency,
) -> Result<bool> {
    let dependency_project = project.dependency(&dependency.path, source_set)?;
    let declarations = dependency_declarations(&dependency_project, dependency.is_test_fixture).await?;

    Ok(exposes(references, direct_r_references, &declarations).await?
        || exposes_contributed_scope(&dependency_project, references).await?)
}

/// Whether the dependency, declared with its configuration, would have to be
/// `api`: the public API of the configuration's source set names something it
/// declares. Testing source sets never expose anything.
pub async fn must_be_api_for(project: &Project, dependency: &ProjectDependency) -> Result<bool> {
    let source_set = dependency.configuration.to_source_set_name();
    if source_set.is_testing_only() || project.module().source_set(&source_set).is_none() {
        return Ok(false);
    }

    let references = public_references(project, &source_set).await?;
    if references.is_empty() {
        return Ok(false);
    }
    let direct_r_references = references_from_dependencies(project, &source_set, &references).await?;
    exposes_dependency(project, &source_set, &references, &direct_r_references, dependency).await
}

/// A scope the dependency contributes to that the public API names
async fn exposes_contributed_scope(dependency: &Project, references: &[ReferenceName]) -> Result<bool> {
    let scoped = dependency
        .get::<AnvilGraph>()
        .await?
        .get(dependency, &SourceSetName::MAIN)
        .await?;
    let exposes = scoped
        .contributed_scopes()
        .any(|scope| references.iter().any(|reference| reference.as_str() == scope.as_str()));
    Ok(exposes)
}

/// The dependency with the configuration it should be declared with:
/// kapt stays kapt, api when it must be api, implementation otherwise
pub fn maybe_as_api(dependency: &ProjectDependency, must_be_api: &[MustBeApiDependency]) -> ProjectDependency {
    let configuration = if dependency.configuration.is_code_generator() {
        dependency.configuration.kapt_variant()
    } else if must_be_api.iter().any(|api| api.dependency.same_target(dependency)) {
        dependency.configuration.api_variant()
    } else {
        dependency.configuration.implementation_variant()
    };
    dependency.with_configuration(configuration)
}
