use super::{Finding, Rule, RuleId};
use crate::analysis::uses;
use crate::context::Project;
use crate::error::Result;
use async_trait::async_trait;

/// `kapt`, `ksp` and `annotationProcessor` dependencies whose annotations
/// never show up in the module
pub struct UnusedCodeGeneratorRule;

#[async_trait]
impl Rule for UnusedCodeGeneratorRule {
    fn id(&self) -> RuleId {
        RuleId::UnusedCodeGenerator
    }

    async fn check(&self, project: &Project) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for dependency in project
            .module()
            .dependencies()
            .into_iter()
            .filter(|dependency| dependency.is_code_generator())
        {
            if uses(project, &dependency).await? {
                continue;
            }
            let identifier = dependency.identifier();
            findings.push(Finding::new(
                self.id(),
                project.path(),
                dependency.configuration(),
                identifier.clone(),
                format!(
                    "{} runs on `{}` but none of its annotations are used",
                    identifier,
                    dependency.configuration()
                ),
            ));
        }
        Ok(findings)
    }
}
