use super::XmlParseResult;
use crate::names::AndroidResource;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use tracing::debug;

/// Parser for AndroidManifest.xml files
pub struct ManifestParser {
    /// Package used for relative class names when the manifest has none,
    /// i.e. the module's namespace
    default_package: Option<String>,
}

impl ManifestParser {
    pub fn new() -> Self {
        Self { default_package: None }
    }

    pub fn with_default_package(package: Option<&str>) -> Self {
        Self {
            default_package: package.map(str::to_string),
        }
    }

    /// Parse a manifest and extract component classes and resource references
    pub fn parse(&self, path: &Path, contents: &str) -> XmlParseResult {
        let mut result = XmlParseResult::new();
        let mut reader = Reader::from_str(contents);
        reader.trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                    if tag_name == "manifest" {
                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            if attr.key.as_ref() == b"package" {
                                result.package = Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }

                    let package = result.package.clone().or_else(|| self.default_package.clone());

                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                        let value = String::from_utf8_lossy(&attr.value).to_string();

                        if key.starts_with("tools:") {
                            continue;
                        }

                        if let Some(resource) = AndroidResource::from_xml_reference(&value) {
                            result.resource_references.insert(resource);
                            continue;
                        }

                        let is_component = matches!(
                            tag_name.as_str(),
                            "activity" | "activity-alias" | "service" | "receiver" | "provider" | "application"
                        );
                        if is_component && (key == "android:name" || key == "android:targetActivity") {
                            result
                                .class_references
                                .insert(self.resolve_class_name(&value, package.as_deref()));
                        }

                        // meta-data values that look like class names
                        if tag_name == "meta-data"
                            && key.ends_with(":value")
                            && value.contains('.')
                            && !value.contains(' ')
                        {
                            result.class_references.insert(value);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    debug!("Error parsing manifest {}: {:?}", path.display(), e);
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        debug!(
            "Parsed manifest {}: {} class references",
            path.display(),
            result.class_references.len()
        );

        result
    }

    /// Resolve a class name, handling relative names like ".MainActivity"
    fn resolve_class_name(&self, name: &str, package: Option<&str>) -> String {
        match (name.strip_prefix('.'), package) {
            (Some(relative), Some(pkg)) => format!("{}.{}", pkg, relative),
            (Some(relative), None) => relative.to_string(),
            (None, Some(pkg)) if !name.contains('.') => format!("{}.{}", pkg, name),
            _ => name.to_string(),
        }
    }
}

impl Default for ManifestParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest = r#"<?xml version="1.0" encoding="utf-8"?>
            <manifest xmlns:android="http://schemas.android.com/apk/res/android"
                package="com.example.app">
                <application android:name=".MyApplication" android:theme="@style/AppTheme">
                    <activity android:name=".MainActivity" android:label="@string/app_name"/>
                    <service android:name="MyService"/>
                    <meta-data android:name="init" android:value="com.example.init.Initializer"/>
                </application>
            </manifest>"#;

        let result = ManifestParser::new().parse(Path::new("AndroidManifest.xml"), manifest);

        assert_eq!(result.package.as_deref(), Some("com.example.app"));
        assert!(result.class_references.contains("com.example.app.MainActivity"));
        assert!(result.class_references.contains("com.example.app.MyService"));
        assert!(result.class_references.contains("com.example.app.MyApplication"));
        assert!(result.class_references.contains("com.example.init.Initializer"));
        assert!(result.resource_references.contains(&AndroidResource::new("style", "AppTheme")));
        assert!(result.resource_references.contains(&AndroidResource::new("string", "app_name")));
    }

    #[test]
    fn test_namespace_fallback() {
        let manifest = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android">
                <application><activity android:name=".Home"/></application>
            </manifest>"#;

        let result = ManifestParser::with_default_package(Some("com.feature"))
            .parse(Path::new("AndroidManifest.xml"), manifest);
        assert!(result.package.is_none());
        assert!(result.class_references.contains("com.feature.Home"));
    }

    #[test]
    fn test_resolve_class_name() {
        let parser = ManifestParser::new();
        assert_eq!(parser.resolve_class_name(".Main", Some("com.app")), "com.app.Main");
        assert_eq!(parser.resolve_class_name("Main", Some("com.app")), "com.app.Main");
        assert_eq!(parser.resolve_class_name("com.other.Main", Some("com.app")), "com.other.Main");
        assert_eq!(parser.resolve_class_name(".Main", None), "Main");
    }
}
