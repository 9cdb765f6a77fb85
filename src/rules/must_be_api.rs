use super::{Finding, Rule, RuleId};
use crate::analysis::{maybe_as_api, MustBeApi};
use crate::context::Project;
use crate::error::Result;
use async_trait::async_trait;

/// Dependencies whose declarations leak into the module's public API
/// without being declared as `api`
pub struct MustBeApiRule;

#[async_trait]
impl Rule for MustBeApiRule {
    fn id(&self) -> RuleId {
        RuleId::MustBeApi
    }

    async fn check(&self, project: &Project) -> Result<Vec<Finding>> {
        let must_be_api = project.get::<MustBeApi>().await?.get(project).await?;

        let findings = must_be_api
            .iter()
            .map(|api| {
                let declared = api.dependency.with_configuration(api.source.configuration.clone());
                let fixed = maybe_as_api(&declared, &must_be_api);
                let identifier = api.dependency.identifier();

                let finding = Finding::new(
                    self.id(),
                    project.path(),
                    &fixed.configuration,
                    identifier.clone(),
                    format!(
                        "{} is part of the public API of `{}` and should be declared as `{}`",
                        identifier, api.source_set, fixed.configuration
                    ),
                );
                if api.source.same_target(&api.dependency) {
                    finding
                } else {
                    finding.with_source(api.source.identifier())
                }
            })
            .collect();
        Ok(findings)
    }
}
