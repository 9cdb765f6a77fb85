use super::classpath::ClasspathDependencies;
use super::must_be_api::must_be_api_for;
use super::uses::uses;
use crate::context::Project;
use crate::error::Result;
use crate::model::{Module, ProjectDependency, SourceSetName};
use serde::Serialize;
use std::collections::HashSet;

/// A dependency that is only on the classpath through another dependency,
/// but is used directly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritedDependency {
    /// The declaration to add, configuration included
    pub dependency: ProjectDependency,
    /// The direct dependency it is inherited through
    pub source: ProjectDependency,
    pub source_set: SourceSetName,
}

fn declared_in(module: &Module, source_set: &SourceSetName, dependency: &ProjectDependency) -> bool {
    module
        .configurations
        .values()
        .filter(|configuration| configuration.source_set_name() == *source_set)
        .any(|configuration| configuration.projects.iter().any(|p| p.same_target(dependency)))
}

pub async fn inherited_dependencies(project: &Project) -> Result<Vec<InheritedDependency>> {
    let module = project.module();
    let classpath = project.get::<ClasspathDependencies>().await?;

    let mut seen = HashSet::new();
    let mut inherited = Vec::new();

    for source_set in module.source_sets.keys() {
        for entry in classpath.get(project, source_set).await?.iter() {
            if entry.is_direct() || entry.contributed.path == *project.path() {
                continue;
            }
            let contributed = &entry.contributed;
            if declared_in(module, &SourceSetName::MAIN, contributed)
                || declared_in(module, &entry.source.configuration.to_source_set_name(), contributed)
            {
                continue;
            }

            let as_declared = contributed.with_configuration(entry.source.configuration.clone());
            if !uses(project, &as_declared.clone().into()).await? {
                continue;
            }

            let configuration = if as_declared.configuration.is_code_generator() {
                as_declared.configuration.clone()
            } else if must_be_api_for(project, &as_declared).await? {
                as_declared.configuration.api_variant()
            } else {
                as_declared.configuration.implementation_variant()
            };
            let dependency = as_declared.with_configuration(configuration);

            if seen.insert(dependency.clone()) {
                inherited.push(InheritedDependency {
                    dependency,
                    source: entry.source.clone(),
                    source_set: source_set.clone(),
                });
            }
        }
    }

    Ok(inherited)
}
