use super::configuration::ConfigurationName;
use super::module::Module;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

/// Name of a source set (`main`, `test`, `debug`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SourceSetName(Cow<'static, str>);

impl SourceSetName {
    pub const MAIN: SourceSetName = SourceSetName(Cow::Borrowed("main"));
    pub const TEST: SourceSetName = SourceSetName(Cow::Borrowed("test"));
    pub const ANDROID_TEST: SourceSetName = SourceSetName(Cow::Borrowed("androidTest"));
    pub const TEST_FIXTURES: SourceSetName = SourceSetName(Cow::Borrowed("testFixtures"));
    pub const DEBUG: SourceSetName = SourceSetName(Cow::Borrowed("debug"));
    pub const RELEASE: SourceSetName = SourceSetName(Cow::Borrowed("release"));
    pub const KAPT: SourceSetName = SourceSetName(Cow::Borrowed("kapt"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_main(&self) -> bool {
        self.as_str() == "main"
    }

    pub fn is_test_fixtures(&self) -> bool {
        self.as_str().starts_with("testFixtures")
    }

    /// `test`, `androidTest` and their variants. Test fixtures are published
    /// code and are not testing-only.
    pub fn is_testing_only(&self) -> bool {
        let name = self.as_str();
        if name.starts_with("testFixtures") {
            return false;
        }
        name.starts_with("androidTest") || name.starts_with("test")
    }

    /// `main` -> `api`, otherwise `<name>Api`
    pub fn api_config(&self) -> ConfigurationName {
        self.config_with_suffix("api", "Api")
    }

    pub fn implementation_config(&self) -> ConfigurationName {
        self.config_with_suffix("implementation", "Implementation")
    }

    /// `main` -> `kapt`, otherwise `kapt<Name>`
    pub fn kapt_config(&self) -> ConfigurationName {
        if self.is_main() {
            ConfigurationName::new("kapt")
        } else {
            ConfigurationName::new(format!("kapt{}", capitalize(self.as_str())))
        }
    }

    fn config_with_suffix(&self, main: &str, suffix: &str) -> ConfigurationName {
        if self.is_main() {
            ConfigurationName::new(main)
        } else {
            ConfigurationName::new(format!("{}{}", self.as_str(), suffix))
        }
    }

    /// This source set followed by its upstream source sets in `module`,
    /// nearest first. Unknown source sets only yield themselves.
    pub fn with_upstream(&self, module: &Module) -> Vec<SourceSetName> {
        let mut names = vec![self.clone()];
        if let Some(source_set) = module.source_set(self) {
            names.extend(source_set.upstream.iter().cloned());
        }
        names
    }

    pub fn with_downstream(&self, module: &Module) -> Vec<SourceSetName> {
        let mut names = vec![self.clone()];
        if let Some(source_set) = module.source_set(self) {
            names.extend(source_set.downstream.iter().cloned());
        }
        names
    }
}

impl fmt::Display for SourceSetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceSetName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SourceSetName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<SourceSetName> for String {
    fn from(name: SourceSetName) -> Self {
        name.0.into_owned()
    }
}

pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub(crate) fn decapitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// A named partition of a module's sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    pub name: SourceSetName,
    /// Directly declared parents, as written in the descriptor
    pub parents: Vec<SourceSetName>,
    /// Every ancestor, nearest first. Filled in when the graph is loaded.
    pub upstream: Vec<SourceSetName>,
    /// Every source set that has this one upstream. Filled in when the graph is loaded.
    pub downstream: Vec<SourceSetName>,
    pub resource_files: Vec<PathBuf>,
    pub layout_files: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
}

impl SourceSet {
    pub fn new(name: impl Into<SourceSetName>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            upstream: Vec::new(),
            downstream: Vec::new(),
            resource_files: Vec::new(),
            layout_files: Vec::new(),
            manifest: None,
        }
    }

    /// Default shape for a source set that is only known through a
    /// configuration name: everything except `main` sits on top of `main`.
    pub fn implicit(name: SourceSetName) -> Self {
        let parents = if name.is_main() {
            Vec::new()
        } else {
            vec![SourceSetName::MAIN]
        };
        Self::new(name).with_parents(parents)
    }

    pub fn with_parents(mut self, parents: Vec<SourceSetName>) -> Self {
        self.parents = parents;
        self
    }

    pub fn with_resource_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.resource_files.push(path.into());
        self
    }

    pub fn with_layout_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.layout_files.push(path.into());
        self
    }

    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = Some(path.into());
        self
    }
}
