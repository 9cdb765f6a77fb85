use crate::model::{CodeGeneratorBinding, ModulePath};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a modcheck run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Module path patterns left out of the report, e.g. `:samples:*`
    pub ignore_modules: Vec<String>,

    /// Dependency identifiers never reported, e.g. `:testing` or `com.google.dagger:*`
    pub ignore_dependencies: Vec<String>,

    /// Which checks run
    pub checks: ChecksConfig,

    /// Code generators in addition to the built-in ones
    pub code_generators: Vec<CodeGeneratorBinding>,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Declared dependencies nothing references
    pub unused_dependency: bool,

    /// `implementation` dependencies that leak into the public API
    pub must_be_api: bool,

    /// Dependencies used directly but only declared further down the graph
    pub inherited_dependency: bool,

    /// `kapt`/`ksp` processors whose annotations are never used
    pub unused_code_generator: bool,

    /// Android modules generating an `R` class nobody uses
    pub disable_android_resources: bool,

    /// Android modules generating view bindings nobody uses
    pub disable_view_binding: bool,

    /// The kapt plugin applied while none of its processors is used
    pub unused_kapt_plugin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,

    /// Include module depths in the report
    pub depths: bool,

    /// Exit with a non-zero status when anything is reported
    pub fail_on_findings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_modules: vec![],
            ignore_dependencies: vec![],
            checks: ChecksConfig::default(),
            code_generators: vec![],
            report: ReportConfig::default(),
        }
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            unused_dependency: true,
            must_be_api: true,
            inherited_dependency: true,
            unused_code_generator: true,
            disable_android_resources: true,
            disable_view_binding: true,
            unused_kapt_plugin: true,
        }
    }
}

impl ChecksConfig {
    /// No check at all, for runs that only report depths
    pub fn disabled() -> Self {
        Self {
            unused_dependency: false,
            must_be_api: false,
            inherited_dependency: false,
            unused_code_generator: false,
            disable_android_resources: false,
            disable_view_binding: false,
            unused_kapt_plugin: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            depths: true,
            fail_on_findings: false,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".modcheck.yml",
            ".modcheck.yaml",
            ".modcheck.toml",
            "modcheck.yml",
            "modcheck.yaml",
            "modcheck.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn should_ignore_module(&self, path: &ModulePath) -> bool {
        self.ignore_modules
            .iter()
            .any(|pattern| glob_match(pattern, path.as_str()))
    }

    pub fn should_ignore_dependency(&self, identifier: &str) -> bool {
        self.ignore_dependencies
            .iter()
            .any(|pattern| glob_match(pattern, identifier))
    }
}

/// Glob matching where `*` stands for any run of characters, `:` included,
/// so `:feature:*` matches every module below `:feature`
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let remaining: Vec<&str> = parts.collect();
    let Some((last, middle)) = remaining.split_last() else {
        // No wildcard at all
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}
