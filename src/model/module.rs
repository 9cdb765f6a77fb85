use super::configuration::{Configuration, ConfigurationName};
use super::dependency::{ConfiguredDependency, ExternalDependency, ProjectDependency};
use super::path::ModulePath;
use super::source_set::{SourceSet, SourceSetName};
use std::collections::{BTreeMap, HashSet};

/// Android specific module metadata
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AndroidPlatform {
    /// Namespace of the generated `R` class
    pub base_package: Option<String>,
    /// Per source set namespace overrides
    pub source_set_packages: BTreeMap<SourceSetName, String>,
    pub resources_enabled: bool,
    /// `buildFeatures.viewBinding`
    pub view_binding: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Jvm,
    Android(AndroidPlatform),
}

/// A node of the build graph. Immutable once the graph is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub path: ModulePath,
    pub configurations: BTreeMap<ConfigurationName, Configuration>,
    pub source_sets: BTreeMap<SourceSetName, SourceSet>,
    pub platform: Platform,
    /// Whether the Anvil code generator runs in this module
    pub anvil: bool,
    /// Whether the kapt plugin is applied. Declaring anything on a `kapt`
    /// configuration applies it too.
    pub kapt: bool,
}

impl Module {
    /// A JVM module with only a `main` source set
    pub fn new(path: impl Into<ModulePath>) -> Self {
        let mut source_sets = BTreeMap::new();
        source_sets.insert(SourceSetName::MAIN, SourceSet::new(SourceSetName::MAIN));

        Self {
            path: path.into(),
            configurations: BTreeMap::new(),
            source_sets,
            platform: Platform::Jvm,
            anvil: false,
            kapt: false,
        }
    }

    pub fn android(mut self, base_package: impl Into<String>) -> Self {
        self.platform = Platform::Android(AndroidPlatform {
            base_package: Some(base_package.into()),
            source_set_packages: BTreeMap::new(),
            resources_enabled: true,
            view_binding: false,
        });
        self
    }

    pub fn with_view_binding(mut self, enabled: bool) -> Self {
        if let Platform::Android(android) = &mut self.platform {
            android.view_binding = enabled;
        }
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_anvil(mut self, anvil: bool) -> Self {
        self.anvil = anvil;
        self
    }

    pub fn with_kapt(mut self, kapt: bool) -> Self {
        self.kapt = kapt;
        self
    }

    /// Add or replace a source set
    pub fn with_source_set(mut self, source_set: SourceSet) -> Self {
        self.source_sets.insert(source_set.name.clone(), source_set);
        self
    }

    pub fn with_project_dependency(self, configuration: &str, path: &str) -> Self {
        self.with_dependency(ProjectDependency::new(configuration, path).into())
    }

    pub fn with_test_fixtures_dependency(self, configuration: &str, path: &str) -> Self {
        self.with_dependency(ProjectDependency::test_fixtures(configuration, path).into())
    }

    pub fn with_external_dependency(self, configuration: &str, coordinates: &str) -> Self {
        match ExternalDependency::parse(configuration, coordinates) {
            Some(dependency) => self.with_dependency(dependency.into()),
            None => self,
        }
    }

    pub fn with_dependency(mut self, dependency: ConfiguredDependency) -> Self {
        self.add_dependency(dependency);
        self
    }

    pub fn add_dependency(&mut self, dependency: ConfiguredDependency) {
        let name = dependency.configuration().clone();
        let configuration = self
            .configurations
            .entry(name.clone())
            .or_insert_with(|| Configuration::new(name));

        match dependency {
            ConfiguredDependency::Project(project) => configuration.projects.push(project),
            ConfiguredDependency::External(external) => configuration.externals.push(external),
        }
    }

    pub fn is_android(&self) -> bool {
        matches!(self.platform, Platform::Android(_))
    }

    pub fn android_platform(&self) -> Option<&AndroidPlatform> {
        match &self.platform {
            Platform::Android(android) => Some(android),
            Platform::Jvm => None,
        }
    }

    pub fn android_resources_enabled(&self) -> bool {
        self.android_platform().is_some_and(|a| a.resources_enabled)
    }

    pub fn view_binding_enabled(&self) -> bool {
        self.android_platform().is_some_and(|a| a.view_binding)
    }

    pub fn has_kapt(&self) -> bool {
        self.kapt
            || self
                .configurations
                .values()
                .any(|c| c.name.is_kapt() && !(c.projects.is_empty() && c.externals.is_empty()))
    }

    pub fn source_set(&self, name: &SourceSetName) -> Option<&SourceSet> {
        self.source_sets.get(name)
    }

    /// The `R` namespace for a source set: its own override, else the nearest
    /// upstream override, else the module base package.
    pub fn android_base_package(&self, source_set: &SourceSetName) -> Option<&str> {
        let android = self.android_platform()?;
        source_set
            .with_upstream(self)
            .iter()
            .find_map(|name| android.source_set_packages.get(name))
            .or(android.base_package.as_ref())
            .map(String::as_str)
    }

    /// Every declared dependency, configurations in name order
    pub fn dependencies(&self) -> Vec<ConfiguredDependency> {
        self.configurations
            .values()
            .flat_map(|c| {
                c.projects
                    .iter()
                    .cloned()
                    .map(ConfiguredDependency::Project)
                    .chain(c.externals.iter().cloned().map(ConfiguredDependency::External))
            })
            .collect()
    }

    pub fn project_dependencies(&self) -> impl Iterator<Item = &ProjectDependency> {
        self.configurations.values().flat_map(|c| c.projects.iter())
    }

    /// Project dependencies declared directly in configurations of `source_set`
    /// only, self-dependencies excluded
    pub fn declared_project_dependencies(&self, source_set: &SourceSetName) -> Vec<ProjectDependency> {
        self.configurations
            .values()
            .filter(|c| c.source_set_name() == *source_set)
            .flat_map(|c| c.projects.iter())
            .filter(|d| d.path != self.path)
            .cloned()
            .collect()
    }

    /// Project dependencies visible to `source_set`: its own configurations
    /// and those of its upstream source sets, self-dependencies excluded
    pub fn project_dependencies_for(&self, source_set: &SourceSetName) -> Vec<ProjectDependency> {
        let visible: HashSet<SourceSetName> = source_set.with_upstream(self).into_iter().collect();
        self.configurations
            .values()
            .filter(|c| visible.contains(&c.source_set_name()))
            .flat_map(|c| c.projects.iter())
            .filter(|d| d.path != self.path)
            .cloned()
            .collect()
    }

    /// Whether `configuration` declares exactly this module and test-fixture flag
    pub fn declares(&self, configuration: &ConfigurationName, dependency: &ProjectDependency) -> bool {
        self.configurations
            .get(configuration)
            .is_some_and(|c| c.projects.iter().any(|p| p.same_target(dependency)))
    }
}
