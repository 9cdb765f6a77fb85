use super::anvil::{AnvilGraph, AnvilScopeName};
use super::classpath::ClasspathDependencies;
use super::declarations::dependency_declarations;
use super::generated::GeneratedDeclarations;
use super::references::References;
use crate::context::Project;
use crate::error::Result;
use crate::lazy::LazySet;
use crate::model::{CodeGeneratorBinding, ConfigurationName, ConfiguredDependency, ProjectDependency};
use crate::names::{DeclaredName, ReferenceName};
use std::collections::BTreeSet;
use tracing::debug;

/// Whether `project` uses a dependency declared (or about to be declared)
/// on one of its configurations
pub async fn uses(project: &Project, dependency: &ConfiguredDependency) -> Result<bool> {
    match dependency {
        ConfiguredDependency::External(external) => {
            if !external.configuration.is_code_generator() {
                return Ok(true);
            }
            let binding = project
                .engine()
                .code_generators()
                .binding_for(&external.module_coordinates())
                .cloned();
            code_generator_used(project, &external.configuration, binding.as_ref()).await
        }
        ConfiguredDependency::Project(dependency) => {
            if dependency.path == *project.path() {
                return Ok(true);
            }
            if dependency.configuration.is_code_generator() {
                let binding = project
                    .engine()
                    .code_generators()
                    .binding_for(dependency.path.as_str())
                    .cloned();
                return code_generator_used(project, &dependency.configuration, binding.as_ref()).await;
            }
            project_dependency_used(project, dependency).await
        }
    }
}

/// Declared dependencies of every configuration that are not used
pub async fn unused_dependencies(project: &Project) -> Result<Vec<ConfiguredDependency>> {
    let mut unused = Vec::new();
    for dependency in project.module().dependencies() {
        if let ConfiguredDependency::Project(project_dependency) = &dependency {
            if project_dependency.path == *project.path() {
                continue;
            }
        }
        if !uses(project, &dependency).await? {
            debug!("{} does not use {}", project.path(), dependency.identifier());
            unused.push(dependency);
        }
    }
    Ok(unused)
}

async fn code_generator_used(
    project: &Project,
    configuration: &ConfigurationName,
    binding: Option<&CodeGeneratorBinding>,
) -> Result<bool> {
    let Some(binding) = binding else {
        return Ok(true);
    };

    let references = project
        .get::<References>()
        .await?
        .get(project, &configuration.to_source_set_name())
        .await?;
    for annotation in &binding.annotations {
        if references.contains_name(annotation).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Whether any reference resolves to one of the declarations
pub async fn any_reference_declared(
    references: &LazySet<ReferenceName>,
    declarations: &LazySet<DeclaredName>,
) -> Result<bool> {
    for source in references.sources() {
        let index = source.get().await?;
        for reference in index.elements() {
            let declared = declarations
                .find(reference.as_str(), |declared| declared.matches(reference))
                .await?;
            if declared.is_some() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

async fn project_dependency_used(project: &Project, dependency: &ProjectDependency) -> Result<bool> {
    let source_set = dependency.configuration.to_source_set_name();
    let dependency_project = project.dependency(&dependency.path, &source_set)?;
    let declarations = dependency_declarations(&dependency_project, dependency.is_test_fixture).await?;

    let references = project.get::<References>().await?.get(project, &source_set).await?;
    if any_reference_declared(&references, &declarations).await? {
        return Ok(true);
    }

    if generated_code_used(project, dependency, &declarations).await? {
        return Ok(true);
    }

    contributes_to_merged_scope(project, dependency, &dependency_project).await
}

/// A declaration generated in `project` from the dependency's names, used by
/// the project itself or by a module that depends on it
async fn generated_code_used(
    project: &Project,
    dependency: &ProjectDependency,
    declarations: &LazySet<DeclaredName>,
) -> Result<bool> {
    let source_set = dependency.configuration.to_source_set_name();
    let generated = project
        .get::<GeneratedDeclarations>()
        .await?
        .get(project, &source_set)
        .await?;
    if generated.is_empty() {
        return Ok(false);
    }

    let mut from_dependency = Vec::new();
    for declaration in generated.all() {
        for source in declaration.generated_sources() {
            if declarations.contains_name(source.as_str()).await? {
                from_dependency.push(declaration.clone());
                break;
            }
        }
    }
    if from_dependency.is_empty() {
        return Ok(false);
    }

    let references = project.get::<References>().await?.get(project, &source_set).await?;
    if referenced(&references, &from_dependency).await? {
        return Ok(true);
    }

    let engine = project.engine();
    for dependent_path in engine.graph().dependents(project.path()) {
        let dependent = engine.project(dependent_path)?;
        let is_android = dependent.module().is_android();
        let edges: Vec<ProjectDependency> = dependent
            .module()
            .project_dependencies()
            .filter(|edge| edge.path == *project.path())
            .cloned()
            .collect();
        for edge in edges {
            let declaring = edge.declaring_source_set_name(is_android);
            let dependent_references = dependent.get::<References>().await?.get(&dependent, &declaring).await?;
            if referenced(&dependent_references, &from_dependency).await? {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

async fn referenced(references: &LazySet<ReferenceName>, declarations: &[DeclaredName]) -> Result<bool> {
    for declaration in declarations {
        let found = references
            .find(declaration.as_str(), |reference| declaration.matches(reference))
            .await?;
        if found.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Scopes merged by the project or anything on its classpath
async fn merged_scopes(project: &Project, dependency: &ProjectDependency) -> Result<BTreeSet<AnvilScopeName>> {
    let source_set = dependency.configuration.to_source_set_name();
    let mut merged = project
        .get::<AnvilGraph>()
        .await?
        .merged_scope_names(project)
        .await?;

    let classpath = project
        .get::<ClasspathDependencies>()
        .await?
        .get(project, &source_set)
        .await?;
    for entry in classpath.iter() {
        let on_classpath = project.dependency(&entry.contributed.path, &source_set)?;
        let scopes = on_classpath
            .get::<AnvilGraph>()
            .await?
            .merged_scope_names(&on_classpath)
            .await?;
        merged.extend(scopes);
    }
    Ok(merged)
}

async fn contributes_to_merged_scope(
    project: &Project,
    dependency: &ProjectDependency,
    dependency_project: &Project,
) -> Result<bool> {
    let contributions = dependency_project
        .get::<AnvilGraph>()
        .await?
        .get(dependency_project, &crate::model::SourceSetName::MAIN)
        .await?;
    if contributions.contributions.is_empty() {
        return Ok(false);
    }

    let merged = merged_scopes(project, dependency).await?;
    let contributes = contributions.contributed_scopes().any(|scope| merged.contains(scope));
    Ok(contributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Engine;
    use crate::model::{CodeGenerators, Module, ModuleGraph};
    use crate::symbols::{JvmFile, StaticSymbols};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_code_generator_without_binding_is_used() {
        let graph = ModuleGraph::new(vec![
            Module::new(":processor"),
            Module::new(":app")
                .with_project_dependency("kapt", ":processor")
                .with_external_dependency("kapt", "com.example:unknown-compiler:1.0"),
        ])
        .unwrap();
        let engine = Engine::new(graph, Arc::new(StaticSymbols::new()));

        assert!(engine.unused_dependencies(&":app".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_code_generator_binding_needs_annotation() {
        let graph = ModuleGraph::new(vec![
            Module::new(":processor"),
            Module::new(":app")
                .with_project_dependency("kapt", ":processor")
                .with_external_dependency("kapt", "com.google.dagger:dagger-compiler:2.50"),
        ])
        .unwrap();
        let symbols = StaticSymbols::new().with_file(
            ":app",
            "main",
            JvmFile::kotlin("App.kt", "com.app").importing("javax.inject.Inject"),
        );
        let generators = CodeGenerators::with_additional(vec![CodeGeneratorBinding::new(
            "Processor",
            ":processor",
            &["com.example.Generate"],
        )]);
        let engine = Engine::with_code_generators(graph, Arc::new(symbols), generators);

        let unused: Vec<_> = engine
            .unused_dependencies(&":app".into())
            .await
            .unwrap()
            .iter()
            .map(ConfiguredDependency::identifier)
            .collect();
        assert_eq!(unused, vec![":processor"]);
    }

    #[tokio::test]
    async fn test_external_runtime_dependencies_are_used() {
        let graph = ModuleGraph::new(vec![
            Module::new(":app").with_external_dependency("implementation", "com.squareup.okio:okio:3.0.0")
        ])
        .unwrap();
        let engine = Engine::new(graph, Arc::new(StaticSymbols::new()));
        assert!(engine.unused_dependencies(&":app".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generated_declaration_used_downstream() {
        let graph = ModuleGraph::new(vec![
            Module::new(":models"),
            Module::new(":generated").with_project_dependency("implementation", ":models"),
            Module::new(":app").with_project_dependency("implementation", ":generated"),
        ])
        .unwrap();
        let symbols = StaticSymbols::new()
            .with_file(":models", "main", JvmFile::kotlin("User.kt", "com.models").declaring("com.models.User"))
            .with_file(":generated", "main", {
                let mut file = JvmFile::kotlin("UserAdapter.kt", "com.generated");
                file.declarations.push(DeclaredName::generated(
                    crate::names::QualifiedName::parse("com.generated.UserAdapter"),
                    vec![crate::names::QualifiedName::parse("com.models.User")],
                ));
                file
            })
            .with_file(
                ":app",
                "main",
                JvmFile::kotlin("App.kt", "com.app").importing("com.generated.UserAdapter"),
            );
        let engine = Engine::new(graph, Arc::new(symbols));

        let dependency = ProjectDependency::new("implementation", ":models").into();
        assert!(engine.uses(&":generated".into(), &dependency).await.unwrap());
    }
}
