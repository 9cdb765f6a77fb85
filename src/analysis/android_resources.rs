use crate::android::{self, file_resource, is_values_file, parse_values, LayoutParser, ManifestParser, XmlParseResult};
use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::model::{Module, SourceSetName};
use crate::names::{AndroidResource, DeclaredName, ReferenceName};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Android inputs of one source set after parsing
#[derive(Debug, Default)]
pub struct ParsedAndroidFiles {
    /// Resources declared by values files, resource files and layout ids
    pub declared: BTreeSet<AndroidResource>,
    /// Class and resource references from layouts, the manifest and values
    pub xml: XmlParseResult,
}

/// Resource declarations and XML references per source set.
///
/// Declarations are empty when the module has Android resources disabled.
/// XML references are collected for every Android module.
#[derive(Default)]
pub struct AndroidResourceDeclaredNames {
    parsed: SafeCache<SourceSetName, Arc<ParsedAndroidFiles>>,
    names: SafeCache<SourceSetName, Arc<Vec<DeclaredName>>>,
    references: SafeCache<SourceSetName, Arc<Vec<ReferenceName>>>,
}

impl Key for AndroidResourceDeclaredNames {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl AndroidResourceDeclaredNames {
    pub async fn parsed(&self, module: &Module, source_set: &SourceSetName) -> Result<Arc<ParsedAndroidFiles>> {
        self.parsed
            .get_or_try_init(source_set.clone(), || async {
                Ok(Arc::new(parse_source_set(module, source_set).await))
            })
            .await
    }

    /// `R.kind.name` and `<package>.R.kind.name` for every declared resource
    pub async fn get(&self, module: &Module, source_set: &SourceSetName) -> Result<Arc<Vec<DeclaredName>>> {
        if !module.android_resources_enabled() {
            return Ok(Arc::new(Vec::new()));
        }

        let parsed = self.parsed(module, source_set).await?;
        let package = module.android_base_package(source_set);
        self.names
            .get_or_try_init(source_set.clone(), || async {
                let names = parsed
                    .declared
                    .iter()
                    .flat_map(|resource| Arc::new(resource.clone()).declared_names(package))
                    .collect();
                Ok(Arc::new(names))
            })
            .await
    }

    /// Names referenced from XML, all as [`Language::Xml`](crate::names::Language::Xml) references
    pub async fn references(
        &self,
        module: &Module,
        source_set: &SourceSetName,
    ) -> Result<Arc<Vec<ReferenceName>>> {
        let parsed = self.parsed(module, source_set).await?;
        self.references
            .get_or_try_init(source_set.clone(), || async {
                let classes = parsed.xml.class_references.iter().map(|name| ReferenceName::xml(name));
                let resources = parsed
                    .xml
                    .resource_references
                    .iter()
                    .map(|resource| ReferenceName::xml(resource.unqualified_name().as_str()));
                Ok(Arc::new(classes.chain(resources).collect()))
            })
            .await
    }
}

fn is_layout_file(path: &Path) -> bool {
    android::resources::resource_directory_type(path).is_some_and(|kind| kind == "layout")
}

async fn parse_source_set(module: &Module, source_set: &SourceSetName) -> ParsedAndroidFiles {
    let mut parsed = ParsedAndroidFiles::default();
    let Some(files) = module.source_set(source_set) else {
        return parsed;
    };
    if !module.is_android() {
        return parsed;
    }

    for path in &files.resource_files {
        if is_values_file(path) {
            if let Some(contents) = android::read_xml(path).await {
                let values = parse_values(path, &contents);
                parsed.declared.extend(values.declared);
                parsed.xml.resource_references.extend(values.references);
            }
        } else if let Some(resource) = file_resource(path) {
            parsed.declared.insert(resource);
        }
    }

    let layouts = LayoutParser::new();
    for path in &files.layout_files {
        if !is_layout_file(path) {
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                parsed.declared.insert(AndroidResource::new("layout", name));
            }
        } else if let Some(resource) = file_resource(path) {
            parsed.declared.insert(resource);
        }

        if let Some(contents) = android::read_xml(path).await {
            let mut layout = layouts.parse(path, &contents);
            parsed.declared.append(&mut layout.declared_ids);
            parsed.xml.merge(layout);
        }
    }

    if let Some(manifest) = &files.manifest {
        if let Some(contents) = android::read_xml(manifest).await {
            let parser = ManifestParser::with_default_package(module.android_base_package(source_set));
            parsed.xml.merge(parser.parse(manifest, &contents));
        }
    }

    debug!(
        "Android files of {} ({}): {} resources, {} class references",
        module.path,
        source_set,
        parsed.declared.len(),
        parsed.xml.class_references.len()
    );

    parsed
}
