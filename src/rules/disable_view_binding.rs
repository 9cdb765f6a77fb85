use super::disable_android_resources::contains_any;
use super::{Finding, Rule, RuleId};
use crate::analysis::References;
use crate::context::Project;
use crate::error::Result;
use crate::model::{ConfigurationName, SourceSetName};
use crate::names::data_binding_name;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Android modules with view binding enabled whose generated bindings are
/// never referenced, by the module or its dependents
pub struct DisableViewBindingRule;

#[async_trait]
impl Rule for DisableViewBindingRule {
    fn id(&self) -> RuleId {
        RuleId::DisableViewBinding
    }

    async fn check(&self, project: &Project) -> Result<Vec<Finding>> {
        let module = project.module();
        if !module.view_binding_enabled() {
            return Ok(Vec::new());
        }

        if let Some(package) = module.android_base_package(&SourceSetName::MAIN) {
            let bindings: Vec<String> = module
                .source_sets
                .values()
                .flat_map(|source_set| source_set.layout_files.iter())
                .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|layout| data_binding_name(layout, package).as_str().to_string())
                .collect();

            if !bindings.is_empty() && bindings_used(project, &bindings).await? {
                return Ok(Vec::new());
            }
        }

        Ok(vec![Finding::new(
            self.id(),
            project.path(),
            &ConfigurationName::new("buildFeatures"),
            "viewBinding",
            format!(
                "none of the view bindings generated for {} are used; set `viewBinding = false`",
                project.path()
            ),
        )])
    }
}

async fn bindings_used(project: &Project, bindings: &[String]) -> Result<bool> {
    let own = project.get::<References>().await?.get(project, &SourceSetName::MAIN).await?;
    if contains_any(&own, bindings).await? {
        return Ok(true);
    }

    let engine = project.engine();
    for path in engine.graph().dependents(project.path()) {
        let dependent = engine.project(path)?;
        let references = dependent
            .get::<References>()
            .await?
            .get(&dependent, &SourceSetName::MAIN)
            .await?;
        if contains_any(&references, bindings).await? {
            return Ok(true);
        }
    }
    Ok(false)
}
