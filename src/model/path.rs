use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable hierarchical module identifier, e.g. `:core:network`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ModulePath(String);

impl ModulePath {
    /// Create a path, adding the leading `:` when it is missing
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path.as_ref().trim();
        if path.starts_with(':') {
            Self(path.to_string())
        } else {
            Self(format!(":{}", path))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the path (`:core:network` -> `network`)
    pub fn name(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModulePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ModulePath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<ModulePath> for String {
    fn from(path: ModulePath) -> Self {
        path.0
    }
}
