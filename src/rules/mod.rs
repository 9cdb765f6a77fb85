//! Rules turn analysis results into findings
//!
//! Each rule looks at one module at a time. The [`RuleRunner`] runs every
//! enabled rule over every module of the graph concurrently and collects the
//! findings, sorted, into a [`Report`].

mod disable_android_resources;
mod disable_view_binding;
mod inherited_dependency;
mod must_be_api;
mod unused_code_generator;
mod unused_dependency;
mod unused_kapt_plugin;

pub use disable_android_resources::DisableAndroidResourcesRule;
pub use disable_view_binding::DisableViewBindingRule;
pub use inherited_dependency::InheritedDependencyRule;
pub use must_be_api::MustBeApiRule;
pub use unused_code_generator::UnusedCodeGeneratorRule;
pub use unused_dependency::UnusedDependencyRule;
pub use unused_kapt_plugin::UnusedKaptPluginRule;

use crate::config::Config;
use crate::context::{Engine, Project};
use crate::error::Result;
use crate::model::{ConfigurationName, ModulePath, SourceSetName};
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    UnusedDependency,
    MustBeApi,
    InheritedDependency,
    UnusedCodeGenerator,
    DisableAndroidResources,
    DisableViewBinding,
    UnusedKaptPlugin,
}

impl RuleId {
    pub const ALL: [RuleId; 7] = [
        RuleId::UnusedDependency,
        RuleId::MustBeApi,
        RuleId::InheritedDependency,
        RuleId::UnusedCodeGenerator,
        RuleId::DisableAndroidResources,
        RuleId::DisableViewBinding,
        RuleId::UnusedKaptPlugin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::UnusedDependency => "unused-dependency",
            RuleId::MustBeApi => "must-be-api",
            RuleId::InheritedDependency => "inherited-dependency",
            RuleId::UnusedCodeGenerator => "unused-code-generator",
            RuleId::DisableAndroidResources => "disable-android-resources",
            RuleId::DisableViewBinding => "disable-view-binding",
            RuleId::UnusedKaptPlugin => "unused-kapt-plugin",
        }
    }

    /// Short code shown next to findings
    pub fn code(&self) -> &'static str {
        match self {
            RuleId::UnusedDependency => "MC001",
            RuleId::MustBeApi => "MC002",
            RuleId::InheritedDependency => "MC003",
            RuleId::UnusedCodeGenerator => "MC004",
            RuleId::DisableAndroidResources => "MC005",
            RuleId::DisableViewBinding => "MC006",
            RuleId::UnusedKaptPlugin => "MC007",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RuleId::MustBeApi => Severity::Error,
            RuleId::UnusedDependency | RuleId::InheritedDependency | RuleId::UnusedKaptPlugin => Severity::Warning,
            RuleId::UnusedCodeGenerator | RuleId::DisableAndroidResources | RuleId::DisableViewBinding => {
                Severity::Info
            }
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One problem with one dependency declaration
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Finding {
    pub module: ModulePath,
    pub rule: RuleId,
    pub configuration: ConfigurationName,
    /// `:lib`, `testFixtures(:lib)` or `group:name:version`
    pub dependency: String,
    /// The declared dependency this one is reached through, if not itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(
        rule: RuleId,
        module: &ModulePath,
        configuration: &ConfigurationName,
        dependency: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            module: module.clone(),
            rule,
            configuration: configuration.clone(),
            dependency: dependency.into(),
            source: None,
            severity: rule.severity(),
            message: message.into(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A check run against one module
#[async_trait]
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;

    async fn check(&self, project: &Project) -> Result<Vec<Finding>>;
}

/// Depth of a module's `main` source set and one chain that explains it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthSummary {
    pub module: ModulePath,
    pub source_set: SourceSetName,
    pub depth: usize,
    pub longest_path: Vec<ModulePath>,
}

/// Everything one run found
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub modules_analyzed: usize,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depths: Vec<DepthSummary>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count(&self, rule: RuleId) -> usize {
        self.findings.iter().filter(|f| f.rule == rule).count()
    }

    pub fn findings_for<'a>(&'a self, module: &'a ModulePath) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| &f.module == module)
    }
}

/// Runs rules over every module of an engine's graph
pub struct RuleRunner {
    engine: Engine,
    rules: Vec<Box<dyn Rule>>,
    config: Config,
    include_depths: bool,
}

impl RuleRunner {
    /// Every rule, nothing ignored, depths included
    pub fn new(engine: Engine) -> Self {
        Self::from_config(engine, &Config::default())
    }

    pub fn from_config(engine: Engine, config: &Config) -> Self {
        let checks = &config.checks;
        let mut rules: Vec<Box<dyn Rule>> = Vec::new();
        if checks.unused_dependency {
            rules.push(Box::new(UnusedDependencyRule));
        }
        if checks.must_be_api {
            rules.push(Box::new(MustBeApiRule));
        }
        if checks.inherited_dependency {
            rules.push(Box::new(InheritedDependencyRule));
        }
        if checks.unused_code_generator {
            rules.push(Box::new(UnusedCodeGeneratorRule));
        }
        if checks.disable_android_resources {
            rules.push(Box::new(DisableAndroidResourcesRule));
        }
        if checks.disable_view_binding {
            rules.push(Box::new(DisableViewBindingRule));
        }
        if checks.unused_kapt_plugin {
            rules.push(Box::new(UnusedKaptPluginRule::new(config)));
        }

        Self {
            engine,
            rules,
            config: config.clone(),
            include_depths: config.report.depths,
        }
    }

    pub fn with_depths(mut self, include_depths: bool) -> Self {
        self.include_depths = include_depths;
        self
    }

    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    pub async fn run(&self) -> Result<Report> {
        let projects: Vec<Project> = self
            .engine
            .projects()?
            .into_iter()
            .filter(|project| !self.config.should_ignore_module(project.path()))
            .collect();

        info!(
            "Checking {} modules with {} rules",
            projects.len(),
            self.rules.len()
        );

        let per_module = try_join_all(projects.iter().map(|project| self.check_project(project))).await?;

        let mut findings: Vec<Finding> = per_module
            .into_iter()
            .flatten()
            .filter(|finding| !self.config.should_ignore_dependency(&finding.dependency))
            .collect();
        findings.sort();
        findings.dedup();

        let depths = if self.include_depths {
            self.depths(&projects).await?
        } else {
            Vec::new()
        };

        Ok(Report {
            modules_analyzed: projects.len(),
            findings,
            depths,
        })
    }

    async fn check_project(&self, project: &Project) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for rule in &self.rules {
            let found = rule.check(project).await?;
            debug!("{} found {} issues in {}", rule.id(), found.len(), project.path());
            findings.extend(found);
        }
        Ok(findings)
    }

    /// Deepest modules first
    async fn depths(&self, projects: &[Project]) -> Result<Vec<DepthSummary>> {
        let depths = try_join_all(
            projects
                .iter()
                .map(|project| self.engine.depth(project.path(), &SourceSetName::MAIN)),
        )
        .await?;

        let mut summaries: Vec<DepthSummary> = depths
            .into_iter()
            .map(|depth| DepthSummary {
                module: depth.path.clone(),
                source_set: depth.source_set.clone(),
                depth: depth.depth,
                longest_path: depth.longest_path(),
            })
            .collect();
        summaries.sort_by(|a, b| b.depth.cmp(&a.depth).then_with(|| a.module.cmp(&b.module)));
        Ok(summaries)
    }
}
