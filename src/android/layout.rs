use super::XmlParseResult;
use crate::names::AndroidResource;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use tracing::debug;

/// Parser for Android layout XML files
pub struct LayoutParser;

impl LayoutParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a layout XML file and extract class references, resource
    /// references and declared view ids
    pub fn parse(&self, path: &Path, contents: &str) -> XmlParseResult {
        let mut result = XmlParseResult::new();
        let mut reader = Reader::from_str(contents);
        reader.trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                    // Custom views are written with their class name
                    if tag_name.contains('.') {
                        result.class_references.insert(tag_name.clone());
                    }

                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                        let value = String::from_utf8_lossy(&attr.value).to_string();

                        // Design time only
                        if key.starts_with("tools:") {
                            continue;
                        }

                        if value.starts_with("@+id/") {
                            if let Some(id) = AndroidResource::from_xml_reference(&value) {
                                result.declared_ids.insert(id);
                            }
                        } else if let Some(resource) = AndroidResource::from_xml_reference(&value) {
                            result.resource_references.insert(resource);
                        }

                        // <view class="..."/>
                        if (tag_name == "view" || tag_name == "View") && key == "class" {
                            result.class_references.insert(value.clone());
                        }

                        // <fragment android:name="..."/>
                        if (tag_name == "fragment" || tag_name == "androidx.fragment.app.FragmentContainerView")
                            && (key == "android:name" || key == "class")
                            && value.contains('.')
                        {
                            result.class_references.insert(value.clone());
                        }

                        // <variable type="..."/> and <import type="..."/> in data binding layouts
                        if (tag_name == "variable" || tag_name == "import") && key == "type" {
                            result.class_references.insert(value.clone());
                        }

                        if key.starts_with("app:") || key.starts_with("bind:") || key.starts_with("android:") {
                            self.extract_binding_references(&value, &mut result);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    debug!("Error parsing layout {}: {:?}", path.display(), e);
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        debug!(
            "Parsed layout {}: {} class references, {} resource references",
            path.display(),
            result.class_references.len(),
            result.resource_references.len()
        );

        result
    }

    /// Extract class references from data binding expressions like
    /// `@{com.example.Util.format(user.name)}`
    fn extract_binding_references(&self, expression: &str, result: &mut XmlParseResult) {
        let Some(inner) = expression
            .strip_prefix("@{")
            .and_then(|rest| rest.strip_suffix('}'))
        else {
            return;
        };

        for word in inner.split(|c: char| !c.is_alphanumeric() && c != '.' && c != '_') {
            let word = word.trim_matches('.');
            if !word.contains('.') {
                continue;
            }
            // Keep the class part of `com.example.Util.format`
            let segments: Vec<&str> = word.split('.').collect();
            if let Some(class_end) = segments.iter().rposition(|s| s.starts_with(char::is_uppercase)) {
                if segments[..class_end].iter().all(|s| s.starts_with(char::is_lowercase)) && class_end > 0 {
                    result.class_references.insert(segments[..=class_end].join("."));
                }
            }
        }
    }
}

impl Default for LayoutParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<layout xmlns:android="http://schemas.android.com/apk/res/android"
    xmlns:app="http://schemas.android.com/apk/res-auto"
    xmlns:tools="http://schemas.android.com/tools">
    <data>
        <variable name="user" type="com.example.model.User"/>
    </data>
    <LinearLayout
        android:layout_width="match_parent"
        android:background="@color/surface"
        tools:context=".MainActivity">
        <com.example.ui.BadgeView
            android:id="@+id/badge"
            android:text="@{com.example.format.Names.display(user)}"/>
        <TextView
            android:id="@+id/title"
            android:text="@string/title"/>
        <androidx.fragment.app.FragmentContainerView
            android:name="com.example.ui.HomeFragment"/>
    </LinearLayout>
</layout>"#;

    #[test]
    fn test_parse_layout() {
        let result = LayoutParser::new().parse(Path::new("activity_main.xml"), LAYOUT);

        assert!(result.class_references.contains("com.example.ui.BadgeView"));
        assert!(result.class_references.contains("com.example.model.User"));
        assert!(result.class_references.contains("com.example.ui.HomeFragment"));
        assert!(result.class_references.contains("com.example.format.Names"));
        assert!(!result.class_references.iter().any(|c| c.contains("MainActivity")));

        assert!(result.declared_ids.contains(&AndroidResource::new("id", "badge")));
        assert!(result.declared_ids.contains(&AndroidResource::new("id", "title")));
        assert!(result.resource_references.contains(&AndroidResource::new("string", "title")));
        assert!(result.resource_references.contains(&AndroidResource::new("color", "surface")));
    }

    #[test]
    fn test_malformed_layout_is_partial() {
        let result = LayoutParser::new().parse(
            Path::new("broken.xml"),
            r#"<FrameLayout android:background="@color/bg"><com.example.View </FrameLayout"#,
        );
        assert!(result.resource_references.contains(&AndroidResource::new("color", "bg")));
    }
}
