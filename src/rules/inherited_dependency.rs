use super::{Finding, Rule, RuleId};
use crate::analysis::inherited_dependencies;
use crate::context::Project;
use crate::error::Result;
use async_trait::async_trait;

/// Dependencies used directly that are only on the classpath through
/// another module's `api`
pub struct InheritedDependencyRule;

#[async_trait]
impl Rule for InheritedDependencyRule {
    fn id(&self) -> RuleId {
        RuleId::InheritedDependency
    }

    async fn check(&self, project: &Project) -> Result<Vec<Finding>> {
        let findings = inherited_dependencies(project)
            .await?
            .into_iter()
            .map(|inherited| {
                let identifier = inherited.dependency.identifier();
                Finding::new(
                    self.id(),
                    project.path(),
                    &inherited.dependency.configuration,
                    identifier.clone(),
                    format!(
                        "{} is used directly but only inherited through {}",
                        identifier,
                        inherited.source.identifier()
                    ),
                )
                .with_source(inherited.source.identifier())
            })
            .collect();
        Ok(findings)
    }
}
