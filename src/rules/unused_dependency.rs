use super::{Finding, Rule, RuleId};
use crate::analysis::uses;
use crate::context::Project;
use crate::error::Result;
use crate::model::ConfiguredDependency;
use async_trait::async_trait;

/// Declared runtime dependencies nothing in the module uses
pub struct UnusedDependencyRule;

#[async_trait]
impl Rule for UnusedDependencyRule {
    fn id(&self) -> RuleId {
        RuleId::UnusedDependency
    }

    async fn check(&self, project: &Project) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for dependency in project.module().dependencies() {
            if dependency.is_code_generator() {
                continue;
            }
            if let ConfiguredDependency::Project(edge) = &dependency {
                if edge.path == *project.path() {
                    continue;
                }
            }
            if uses(project, &dependency).await? {
                continue;
            }

            let identifier = dependency.identifier();
            findings.push(Finding::new(
                self.id(),
                project.path(),
                dependency.configuration(),
                identifier.clone(),
                format!("{} is declared as `{}` but never used", identifier, dependency.configuration()),
            ));
        }
        Ok(findings)
    }
}
