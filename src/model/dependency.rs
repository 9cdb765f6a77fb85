use super::configuration::ConfigurationName;
use super::path::ModulePath;
use super::source_set::SourceSetName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency edge from a module configuration to another module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectDependency {
    pub configuration: ConfigurationName,
    pub path: ModulePath,
    #[serde(default)]
    pub is_test_fixture: bool,
}

impl ProjectDependency {
    pub fn new(configuration: impl Into<ConfigurationName>, path: impl Into<ModulePath>) -> Self {
        Self {
            configuration: configuration.into(),
            path: path.into(),
            is_test_fixture: false,
        }
    }

    /// `testFixtures(project(...))` style edge
    pub fn test_fixtures(configuration: impl Into<ConfigurationName>, path: impl Into<ModulePath>) -> Self {
        Self {
            is_test_fixture: true,
            ..Self::new(configuration, path)
        }
    }

    pub fn with_configuration(&self, configuration: ConfigurationName) -> Self {
        Self {
            configuration,
            ..self.clone()
        }
    }

    pub fn with_test_fixture(&self, is_test_fixture: bool) -> Self {
        Self {
            is_test_fixture,
            ..self.clone()
        }
    }

    /// Same module and test-fixture flag, regardless of configuration
    pub fn same_target(&self, other: &ProjectDependency) -> bool {
        self.path == other.path && self.is_test_fixture == other.is_test_fixture
    }

    /// The consumer source set whose generated code can see this dependency
    pub fn declaring_source_set_name(&self, is_android: bool) -> SourceSetName {
        let source_set = self.configuration.to_source_set_name();
        if self.is_test_fixture {
            SourceSetName::TEST_FIXTURES
        } else if source_set.is_testing_only() {
            if is_android {
                SourceSetName::DEBUG
            } else {
                SourceSetName::MAIN
            }
        } else if source_set.is_test_fixtures() {
            SourceSetName::MAIN
        } else {
            source_set
        }
    }

    /// `:lib` or `testFixtures(:lib)`
    pub fn identifier(&self) -> String {
        if self.is_test_fixture {
            format!("testFixtures({})", self.path)
        } else {
            self.path.to_string()
        }
    }
}

impl fmt::Display for ProjectDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.configuration, self.identifier())
    }
}

/// A dependency on a published library, `group:name:version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalDependency {
    pub configuration: ConfigurationName,
    pub group: String,
    pub name: String,
    pub version: Option<String>,
}

impl ExternalDependency {
    /// Parse `group:name[:version]` coordinates
    pub fn parse(configuration: impl Into<ConfigurationName>, coordinates: &str) -> Option<Self> {
        let mut parts = coordinates.trim().split(':');
        let group = parts.next().filter(|p| !p.is_empty())?;
        let name = parts.next().filter(|p| !p.is_empty())?;
        let version = parts.next().filter(|p| !p.is_empty()).map(str::to_string);

        Some(Self {
            configuration: configuration.into(),
            group: group.to_string(),
            name: name.to_string(),
            version,
        })
    }

    /// `group:name` without the version
    pub fn module_coordinates(&self) -> String {
        format!("{}:{}", self.group, self.name)
    }

    pub fn identifier(&self) -> String {
        match &self.version {
            Some(version) => format!("{}:{}:{}", self.group, self.name, version),
            None => self.module_coordinates(),
        }
    }
}

/// Any dependency declared in a module configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfiguredDependency {
    Project(ProjectDependency),
    External(ExternalDependency),
}

impl ConfiguredDependency {
    pub fn configuration(&self) -> &ConfigurationName {
        match self {
            Self::Project(dependency) => &dependency.configuration,
            Self::External(dependency) => &dependency.configuration,
        }
    }

    pub fn identifier(&self) -> String {
        match self {
            Self::Project(dependency) => dependency.identifier(),
            Self::External(dependency) => dependency.identifier(),
        }
    }

    pub fn is_code_generator(&self) -> bool {
        self.configuration().is_code_generator()
    }
}

impl From<ProjectDependency> for ConfiguredDependency {
    fn from(dependency: ProjectDependency) -> Self {
        Self::Project(dependency)
    }
}

impl From<ExternalDependency> for ConfiguredDependency {
    fn from(dependency: ExternalDependency) -> Self {
        Self::External(dependency)
    }
}

/// A dependency reachable from a module's classpath together with the
/// direct dependency that brought it in. Direct dependencies are their own source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TransitiveProjectDependency {
    pub source: ProjectDependency,
    pub contributed: ProjectDependency,
}

impl TransitiveProjectDependency {
    pub fn new(source: ProjectDependency, contributed: ProjectDependency) -> Self {
        Self { source, contributed }
    }

    pub fn direct(dependency: ProjectDependency) -> Self {
        Self {
            source: dependency.clone(),
            contributed: dependency,
        }
    }

    pub fn is_direct(&self) -> bool {
        self.source == self.contributed
    }
}
