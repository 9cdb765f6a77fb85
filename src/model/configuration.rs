use super::dependency::{ExternalDependency, ProjectDependency};
use super::source_set::{capitalize, decapitalize, SourceSetName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configurations that belong to `main` without a source set prefix
const MAIN_CONFIGURATIONS: &[&str] = &[
    "api",
    "compile",
    "compileOnly",
    "compileOnlyApi",
    "implementation",
    "kapt",
    "ksp",
    "annotationProcessor",
    "runtime",
    "runtimeOnly",
    "kotlinCompilerPluginClasspathMain",
];

/// Suffixes stripped from `<sourceSet><Suffix>` names, longest first
const CONFIGURATION_SUFFIXES: &[&str] = &[
    "AnnotationProcessor",
    "CompileOnlyApi",
    "Implementation",
    "CompileOnly",
    "RuntimeOnly",
    "Compile",
    "Runtime",
    "Api",
];

/// Prefixes used by code generator configurations (`kaptTest`, `kspDebug`)
const CODE_GENERATOR_PREFIXES: &[&str] = &["kapt", "ksp"];

/// Name of a dependency bucket (`api`, `testImplementation`, `kaptDebug`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationName(String);

impl ConfigurationName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn api() -> Self {
        Self::new("api")
    }

    pub fn implementation() -> Self {
        Self::new("implementation")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The source set this configuration adds dependencies to
    pub fn to_source_set_name(&self) -> SourceSetName {
        let name = self.as_str();
        if MAIN_CONFIGURATIONS.contains(&name) {
            return SourceSetName::MAIN;
        }

        for prefix in CODE_GENERATOR_PREFIXES {
            if let Some(rest) = name.strip_prefix(prefix) {
                if rest.starts_with(char::is_uppercase) {
                    return SourceSetName::new(decapitalize(rest));
                }
            }
        }

        for suffix in CONFIGURATION_SUFFIXES {
            if let Some(rest) = name.strip_suffix(suffix) {
                if !rest.is_empty() {
                    return SourceSetName::new(decapitalize(rest));
                }
            }
        }

        SourceSetName::new(decapitalize(name))
    }

    /// The configuration name with its source set stripped (`debugApi` -> `api`)
    pub fn name_without_source_set(&self) -> String {
        let source_set = self.to_source_set_name();
        if source_set.is_main() {
            return self.0.clone();
        }

        for prefix in CODE_GENERATOR_PREFIXES {
            if self.0 == format!("{}{}", prefix, capitalize(source_set.as_str())) {
                return prefix.to_string();
            }
        }

        self.0
            .strip_prefix(source_set.as_str())
            .map(decapitalize)
            .unwrap_or_else(|| self.0.clone())
    }

    pub fn api_variant(&self) -> ConfigurationName {
        self.to_source_set_name().api_config()
    }

    pub fn implementation_variant(&self) -> ConfigurationName {
        self.to_source_set_name().implementation_config()
    }

    pub fn kapt_variant(&self) -> ConfigurationName {
        self.to_source_set_name().kapt_config()
    }

    /// Whether dependencies declared here are visible to consumers
    pub fn is_api(&self) -> bool {
        *self == self.api_variant()
    }

    pub fn is_implementation(&self) -> bool {
        *self == self.implementation_variant()
    }

    pub fn is_kapt(&self) -> bool {
        *self == self.kapt_variant()
    }

    /// Annotation processor style configurations (`kapt*`, `ksp*`, `*annotationProcessor`)
    pub fn is_code_generator(&self) -> bool {
        let name = self.as_str();
        CODE_GENERATOR_PREFIXES
            .iter()
            .any(|prefix| name == *prefix || name.strip_prefix(prefix).is_some_and(|rest| rest.starts_with(char::is_uppercase)))
            || name == "annotationProcessor"
            || name.ends_with("AnnotationProcessor")
    }
}

impl fmt::Display for ConfigurationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfigurationName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A configuration of a module together with what it declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub name: ConfigurationName,
    pub projects: Vec<ProjectDependency>,
    pub externals: Vec<ExternalDependency>,
}

impl Configuration {
    pub fn new(name: ConfigurationName) -> Self {
        Self {
            name,
            projects: Vec::new(),
            externals: Vec::new(),
        }
    }

    pub fn source_set_name(&self) -> SourceSetName {
        self.name.to_source_set_name()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.externals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_set_of(name: &str) -> String {
        ConfigurationName::new(name).to_source_set_name().to_string()
    }

    #[test]
    fn test_main_configurations() {
        for name in ["api", "implementation", "compileOnly", "kapt", "runtimeOnly", "compileOnlyApi"] {
            assert_eq!(source_set_of(name), "main", "{}", name);
        }
    }

    #[test]
    fn test_prefixed_configurations() {
        assert_eq!(source_set_of("testImplementation"), "test");
        assert_eq!(source_set_of("androidTestImplementation"), "androidTest");
        assert_eq!(source_set_of("debugApi"), "debug");
        assert_eq!(source_set_of("testFixturesApi"), "testFixtures");
        assert_eq!(source_set_of("testFixturesCompileOnlyApi"), "testFixtures");
        assert_eq!(source_set_of("kaptTest"), "test");
        assert_eq!(source_set_of("kspAndroidTest"), "androidTest");
        assert_eq!(source_set_of("testAnnotationProcessor"), "test");
    }

    #[test]
    fn test_api_flag() {
        assert!(ConfigurationName::new("api").is_api());
        assert!(ConfigurationName::new("testFixturesApi").is_api());
        assert!(ConfigurationName::new("debugApi").is_api());
        assert!(!ConfigurationName::new("implementation").is_api());
        assert!(!ConfigurationName::new("compileOnly").is_api());
    }

    #[test]
    fn test_code_generator_flag() {
        assert!(ConfigurationName::new("kapt").is_code_generator());
        assert!(ConfigurationName::new("kaptTest").is_code_generator());
        assert!(ConfigurationName::new("ksp").is_code_generator());
        assert!(ConfigurationName::new("annotationProcessor").is_code_generator());
        assert!(!ConfigurationName::new("implementation").is_code_generator());
        assert!(ConfigurationName::new("kapt").is_kapt());
    }

    #[test]
    fn test_name_without_source_set() {
        assert_eq!(ConfigurationName::new("debugApi").name_without_source_set(), "api");
        assert_eq!(ConfigurationName::new("testImplementation").name_without_source_set(), "implementation");
        assert_eq!(ConfigurationName::new("kaptTest").name_without_source_set(), "kapt");
        assert_eq!(ConfigurationName::new("api").name_without_source_set(), "api");
    }
}
