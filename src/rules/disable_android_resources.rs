use super::{Finding, Rule, RuleId};
use crate::analysis::{AndroidResourceDeclaredNames, References};
use crate::context::Project;
use crate::error::Result;
use crate::lazy::LazySet;
use crate::model::{ConfigurationName, SourceSetName};
use crate::names::{data_binding_name, ReferenceName};
use async_trait::async_trait;

/// Android modules generating an `R` class that neither they nor their
/// dependents use
pub struct DisableAndroidResourcesRule;

#[async_trait]
impl Rule for DisableAndroidResourcesRule {
    fn id(&self) -> RuleId {
        RuleId::DisableAndroidResources
    }

    async fn check(&self, project: &Project) -> Result<Vec<Finding>> {
        if !project.module().android_resources_enabled() {
            return Ok(Vec::new());
        }
        if used_locally(project).await? || used_downstream(project).await? {
            return Ok(Vec::new());
        }

        Ok(vec![Finding::new(
            self.id(),
            project.path(),
            &ConfigurationName::new("buildFeatures"),
            "androidResources",
            format!(
                "{} generates an R class but none of its resources are used; set `androidResources = false`",
                project.path()
            ),
        )])
    }
}

pub(super) async fn contains_any(references: &LazySet<ReferenceName>, names: &[String]) -> Result<bool> {
    for name in names {
        if references.contains_name(name).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The `R` class and every resource name of the source set, both spellings
async fn resource_names(project: &Project, source_set: &SourceSetName) -> Result<Option<Vec<String>>> {
    let module = project.module();
    let Some(package) = module.android_base_package(source_set) else {
        return Ok(None);
    };

    let declared = project
        .get::<AndroidResourceDeclaredNames>()
        .await?
        .get(module, source_set)
        .await?;

    let mut names = vec![format!("{}.R", package)];
    names.extend(declared.iter().map(|name| name.as_str().to_string()));
    Ok(Some(names))
}

async fn used_locally(project: &Project) -> Result<bool> {
    let module = project.module();
    let references = project.get::<References>().await?;

    for (name, source_set) in &module.source_sets {
        let Some(mut names) = resource_names(project, name).await? else {
            continue;
        };
        if let Some(package) = module.android_base_package(name) {
            names.extend(
                source_set
                    .layout_files
                    .iter()
                    .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()))
                    .map(|layout| data_binding_name(layout, package).as_str().to_string()),
            );
        }

        if contains_any(&references.get(project, name).await?, &names).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Whether a direct dependent names the `R` class or one of the `main` resources
async fn used_downstream(project: &Project) -> Result<bool> {
    let Some(names) = resource_names(project, &SourceSetName::MAIN).await? else {
        return Ok(false);
    };

    let engine = project.engine();
    for path in engine.graph().dependents(project.path()) {
        let dependent = engine.project(path)?;
        let references = dependent.get::<References>().await?;
        for source_set in dependent.module().source_sets.keys() {
            if contains_any(&references.get(&dependent, source_set).await?, &names).await? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
