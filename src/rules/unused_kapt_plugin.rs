use super::{Finding, Rule, RuleId};
use crate::analysis::uses;
use crate::config::Config;
use crate::context::Project;
use crate::error::Result;
use crate::model::{ConfigurationName, ConfiguredDependency};
use async_trait::async_trait;

const KAPT_PLUGIN_ID: &str = "org.jetbrains.kotlin.kapt";

/// The kapt plugin applied to a module where no kapt processor is used.
///
/// Processors the configuration ignores count as used, so silencing an
/// unused processor also silences the plugin.
pub struct UnusedKaptPluginRule {
    config: Config,
}

impl UnusedKaptPluginRule {
    pub fn new(config: &Config) -> Self {
        Self { config: config.clone() }
    }
}

#[async_trait]
impl Rule for UnusedKaptPluginRule {
    fn id(&self) -> RuleId {
        RuleId::UnusedKaptPlugin
    }

    async fn check(&self, project: &Project) -> Result<Vec<Finding>> {
        let module = project.module();
        if !module.has_kapt() {
            return Ok(Vec::new());
        }

        let processors: Vec<ConfiguredDependency> = module
            .dependencies()
            .into_iter()
            .filter(|dependency| dependency.configuration().is_kapt())
            .collect();

        for processor in &processors {
            if self.config.should_ignore_dependency(&processor.identifier()) || uses(project, processor).await? {
                return Ok(Vec::new());
            }
        }

        let message = if processors.is_empty() {
            "the kapt plugin is applied but no processor is declared".to_string()
        } else {
            format!(
                "none of the {} kapt processors is used; remove the kapt plugin",
                processors.len()
            )
        };
        Ok(vec![Finding::new(
            self.id(),
            project.path(),
            &ConfigurationName::new("plugins"),
            KAPT_PLUGIN_ID,
            message,
        )])
    }
}
