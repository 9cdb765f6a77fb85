use super::{Applicability, DeclaredName, NameOrigin, QualifiedName};
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// One entry of a generated `R` class, e.g. (`string`, `app_name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AndroidResource {
    pub kind: String,
    pub name: String,
}

impl AndroidResource {
    pub fn new(kind: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            // Style names use dots in XML and underscores in code
            name: name.replace('.', "_"),
        }
    }

    /// Parse `@string/app_name`, `@+id/title` or `@android:color/white`.
    /// Framework resources are not part of any module and yield `None`.
    pub fn from_xml_reference(value: &str) -> Option<Self> {
        let value = value.trim();
        let rest = value.strip_prefix("@+").or_else(|| value.strip_prefix('@'))?;
        let (kind, name) = rest.split_once('/')?;
        if kind.contains(':') || kind.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(kind, name))
    }

    /// Parse `R.string.app_name`
    pub fn from_r_reference(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('.');
        if parts.next()? != "R" {
            return None;
        }
        let kind = parts.next()?;
        let name = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(kind, name))
    }

    /// `R.string.app_name`
    pub fn unqualified_name(&self) -> QualifiedName {
        QualifiedName::new("", &["R", &self.kind, &self.name])
    }

    /// `com.app.R.string.app_name`
    pub fn qualified_name(&self, package: &str) -> QualifiedName {
        QualifiedName::new(package, &["R", &self.kind, &self.name])
    }

    /// Both spellings of the resource, sharing one resource value. The
    /// qualified form is generated from the unqualified one.
    pub fn declared_names(self: &Arc<Self>, package: Option<&str>) -> Vec<DeclaredName> {
        let unqualified = self.unqualified_name();
        let mut names = vec![DeclaredName {
            name: unqualified.clone(),
            applicability: Applicability::Agnostic,
            origin: NameOrigin::AndroidResource {
                resource: Arc::clone(self),
                sources: Vec::new(),
            },
        }];

        if let Some(package) = package {
            names.push(DeclaredName {
                name: self.qualified_name(package),
                applicability: Applicability::Agnostic,
                origin: NameOrigin::AndroidResource {
                    resource: Arc::clone(self),
                    sources: vec![unqualified],
                },
            });
        }

        names
    }
}

/// The generated `R` class of a package
pub fn r_class_name(package: &str) -> DeclaredName {
    DeclaredName::source(QualifiedName::new(package, &["R"]), Applicability::Agnostic)
}

/// View/data binding class generated for a layout file:
/// `activity_main` -> `<package>.databinding.ActivityMainBinding`,
/// generated from `R.layout.activity_main`
pub fn data_binding_name(layout_name: &str, package: &str) -> DeclaredName {
    let simple: String = layout_name
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<String>()
        + "Binding";

    let binding_package = format!("{}.databinding", package);
    let source = AndroidResource::new("layout", layout_name).unqualified_name();
    DeclaredName::generated(QualifiedName::new(&binding_package, &[&simple]), vec![source])
}

/// `R`, `R.string` or `R.string.app_name`, without a package
pub fn is_unqualified_r_reference(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^R(?:\.\w+){0,2}$").expect("valid R reference regex"));
    re.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_reference() {
        assert_eq!(
            AndroidResource::from_xml_reference("@string/app_name"),
            Some(AndroidResource::new("string", "app_name"))
        );
        assert_eq!(
            AndroidResource::from_xml_reference("@+id/title"),
            Some(AndroidResource::new("id", "title"))
        );
        assert_eq!(AndroidResource::from_xml_reference("@android:color/white"), None);
        assert_eq!(AndroidResource::from_xml_reference("plain text"), None);
    }

    #[test]
    fn test_style_names_use_underscores() {
        let style = AndroidResource::new("style", "Theme.App.Dark");
        assert_eq!(style.unqualified_name().as_str(), "R.style.Theme_App_Dark");
    }

    #[test]
    fn test_dual_addressing_shares_resource() {
        let resource = Arc::new(AndroidResource::new("string", "app_name"));
        let names = resource.declared_names(Some("com.app"));
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].as_str(), "R.string.app_name");
        assert_eq!(names[1].as_str(), "com.app.R.string.app_name");

        let first = names[0].resource().unwrap();
        let second = names[1].resource().unwrap();
        assert!(Arc::ptr_eq(first, second));
        assert_eq!(names[1].generated_sources(), &[names[0].name.clone()]);
    }

    #[test]
    fn test_data_binding_name() {
        let binding = data_binding_name("activity_main", "com.app");
        assert_eq!(binding.as_str(), "com.app.databinding.ActivityMainBinding");
        assert_eq!(binding.generated_sources()[0].as_str(), "R.layout.activity_main");
    }

    #[test]
    fn test_unqualified_r_reference() {
        assert!(is_unqualified_r_reference("R"));
        assert!(is_unqualified_r_reference("R.string"));
        assert!(is_unqualified_r_reference("R.string.app_name"));
        assert!(!is_unqualified_r_reference("com.app.R.string.app_name"));
        assert!(!is_unqualified_r_reference("Router"));
    }
}
