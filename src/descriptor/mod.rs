//! Graph descriptor files
//!
//! A descriptor lists the modules of a build with their platform, source
//! sets, dependencies and per-file symbol tables. YAML, TOML and JSON are
//! accepted, picked by extension. Paths inside a descriptor are relative to
//! the descriptor itself.

mod schema;

pub use schema::{
    AndroidDescriptor, AnnotatedDescriptor, DeclarationDescriptor, DependencyDescriptor, FileDescriptor,
    GraphDescriptor, ModuleDescriptor, SourceSetDescriptor,
};

use crate::android::resources::resource_directory_type;
use crate::context::Engine;
use crate::error::{AnalysisError, Result};
use crate::model::{
    AndroidPlatform, CodeGeneratorBinding, CodeGenerators, ConfiguredDependency, ExternalDependency, Module,
    ModuleGraph, Platform, ProjectDependency, SourceSet, SourceSetName,
};
use crate::names::{DeclaredName, Language, NameOrigin, QualifiedName};
use crate::symbols::{JvmFile, StaticSymbols};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A module graph and the symbol tables that go with it
#[derive(Debug)]
pub struct LoadedGraph {
    pub graph: ModuleGraph,
    pub symbols: StaticSymbols,
    pub code_generators: Vec<CodeGeneratorBinding>,
}

impl LoadedGraph {
    /// An engine over the loaded graph. `additional` code generators win over
    /// the descriptor's on equal coordinates.
    pub fn into_engine(self, additional: Vec<CodeGeneratorBinding>) -> Engine {
        let mut bindings = self.code_generators;
        bindings.extend(additional);
        Engine::with_code_generators(
            self.graph,
            Arc::new(self.symbols),
            CodeGenerators::with_additional(bindings),
        )
    }
}

/// Read and load a descriptor file
pub fn load(path: &Path) -> Result<LoadedGraph> {
    let contents = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })?;
    let descriptor = parse(path, &contents)?;
    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    build(descriptor, &base, path)
}

/// Parse descriptor text; the format comes from the extension of `path`
pub fn parse(path: &Path, contents: &str) -> Result<GraphDescriptor> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parsed = match extension {
        "json" => serde_json::from_str(contents).map_err(|e| e.to_string()),
        "toml" => toml::from_str(contents).map_err(|e| e.to_string()),
        _ => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| invalid(path, message))
}

/// Turn a parsed descriptor into a graph. `base` resolves relative paths,
/// `file` names the descriptor in errors.
pub fn build(descriptor: GraphDescriptor, base: &Path, file: &Path) -> Result<LoadedGraph> {
    let GraphDescriptor {
        modules: descriptors,
        code_generators,
    } = descriptor;

    let mut symbols = StaticSymbols::new();
    let mut modules = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        modules.push(build_module(descriptor, base, file, &mut symbols)?);
    }

    let graph = ModuleGraph::new(modules)?;
    info!(
        "Loaded {} modules and {} source files from {}",
        graph.len(),
        symbols.file_count(),
        file.display()
    );

    Ok(LoadedGraph {
        graph,
        symbols,
        code_generators,
    })
}

fn invalid(file: &Path, message: impl Into<String>) -> AnalysisError {
    AnalysisError::Descriptor {
        path: file.to_path_buf(),
        message: message.into(),
    }
}

fn build_module(
    descriptor: ModuleDescriptor,
    base: &Path,
    file: &Path,
    symbols: &mut StaticSymbols,
) -> Result<Module> {
    if !descriptor.path.starts_with(':') {
        return Err(invalid(
            file,
            format!("module path `{}` must start with `:`", descriptor.path),
        ));
    }

    let mut module = Module::new(descriptor.path.as_str())
        .with_anvil(descriptor.anvil)
        .with_kapt(descriptor.kapt);
    if let Some(android) = descriptor.android {
        module = module.with_platform(Platform::Android(AndroidPlatform {
            base_package: android.base_package,
            source_set_packages: android
                .source_set_packages
                .into_iter()
                .map(|(name, package)| (SourceSetName::new(name), package))
                .collect(),
            resources_enabled: android.resources,
            view_binding: android.view_binding,
        }));
    }

    for (name, source_set) in descriptor.source_sets {
        let name = SourceSetName::new(name);
        let mut built = SourceSet::implicit(name.clone());
        if let Some(parents) = source_set.parents {
            built = built.with_parents(parents.into_iter().map(SourceSetName::new).collect());
        }
        for resource in &source_set.resources {
            add_resources(&mut built, &base.join(resource));
        }
        for layout in &source_set.layouts {
            built = built.with_layout_file(base.join(layout));
        }
        if let Some(manifest) = &source_set.manifest {
            built = built.with_manifest(base.join(manifest));
        }
        for jvm in source_set.files {
            let parsed = jvm_file(jvm, base, file, &module)?;
            symbols.insert(module.path.clone(), name.clone(), parsed);
        }
        module = module.with_source_set(built);
    }

    for dependency in &descriptor.dependencies {
        let edge = dependency_of(dependency, &module, file)?;
        module.add_dependency(edge);
    }

    Ok(module)
}

/// Add a resource file, or every file below a resource directory. Files in
/// `layout*` directories count as layouts.
fn add_resources(source_set: &mut SourceSet, path: &Path) {
    if !path.exists() {
        warn!("Skipping missing resource path {}", path.display());
        return;
    }

    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .flatten()
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect()
    } else {
        vec![path.to_path_buf()]
    };

    for file in files {
        if resource_directory_type(&file).is_some_and(|kind| kind == "layout") {
            source_set.layout_files.push(file);
        } else {
            source_set.resource_files.push(file);
        }
    }
    debug!(
        "{}: {} resource files, {} layouts",
        source_set.name,
        source_set.resource_files.len(),
        source_set.layout_files.len()
    );
}

fn language_of(path: &Path) -> Option<Language> {
    match path.extension()?.to_str()? {
        "kt" | "kts" => Some(Language::Kotlin),
        "java" => Some(Language::Java),
        _ => None,
    }
}

fn check_name<'a>(name: &'a str, source: &Path, file: &Path) -> Result<&'a str> {
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) || name.starts_with('.') || name.ends_with('.') {
        return Err(invalid(
            file,
            format!("invalid name `{}` in {}", name, source.display()),
        ));
    }
    Ok(name)
}

/// Split off the file's package when the name starts with it
fn qualified(name: &str, package: &str) -> QualifiedName {
    if !package.is_empty() {
        if let Some(rest) = name.strip_prefix(package).and_then(|r| r.strip_prefix('.')) {
            let simple_names: Vec<&str> = rest.split('.').collect();
            return QualifiedName::new(package, &simple_names);
        }
    }
    QualifiedName::parse(name)
}

fn declared_name(descriptor: &DeclarationDescriptor, package: &str, source: &Path, file: &Path) -> Result<DeclaredName> {
    match descriptor {
        DeclarationDescriptor::Name(name) => {
            let name = check_name(name, source, file)?;
            Ok(DeclaredName::source(qualified(name, package), Default::default()))
        }
        DeclarationDescriptor::Detailed {
            name,
            applicability,
            generated_from,
        } => {
            let name = qualified(check_name(name, source, file)?, package);
            if generated_from.is_empty() {
                return Ok(DeclaredName::source(name, *applicability));
            }
            let sources = generated_from
                .iter()
                .map(|from| check_name(from, source, file).map(QualifiedName::parse))
                .collect::<Result<Vec<_>>>()?;
            Ok(DeclaredName {
                name,
                applicability: *applicability,
                origin: NameOrigin::Generated { sources },
            })
        }
    }
}

fn jvm_file(descriptor: FileDescriptor, base: &Path, file: &Path, module: &Module) -> Result<JvmFile> {
    let source = descriptor.path.as_path();
    let language = match descriptor.language.or_else(|| language_of(source)) {
        Some(Language::Xml) | None => {
            return Err(invalid(
                file,
                format!(
                    "{} in {} is not a Kotlin or Java file",
                    source.display(),
                    module.path
                ),
            ))
        }
        Some(language) => language,
    };

    let mut jvm = JvmFile::new(base.join(source), language, &descriptor.package);
    for declaration in &descriptor.declarations {
        jvm.declarations
            .push(declared_name(declaration, &descriptor.package, source, file)?);
    }
    for name in &descriptor.imports {
        jvm.imports.insert(check_name(name, source, file)?.to_string());
    }
    for name in &descriptor.references {
        jvm.references.insert(check_name(name, source, file)?.to_string());
    }
    for name in &descriptor.maybe_references {
        jvm.maybe_extra_references
            .insert(check_name(name, source, file)?.to_string());
    }
    for name in &descriptor.api_references {
        jvm = jvm.exposing(check_name(name, source, file)?);
    }
    for annotated in &descriptor.annotated {
        let declaration = check_name(&annotated.declaration, source, file)?;
        let annotation = check_name(&annotated.annotation, source, file)?;
        jvm = jvm.annotated(declaration, annotation, &annotated.scope);
    }
    Ok(jvm)
}

fn dependency_of(descriptor: &DependencyDescriptor, module: &Module, file: &Path) -> Result<ConfiguredDependency> {
    if descriptor.configuration.trim().is_empty() {
        return Err(invalid(file, format!("dependency of {} without a configuration", module.path)));
    }
    let configuration = descriptor.configuration.trim();

    match (&descriptor.project, &descriptor.external) {
        (Some(path), None) => {
            let dependency = if descriptor.test_fixtures {
                ProjectDependency::test_fixtures(configuration, path.as_str())
            } else {
                ProjectDependency::new(configuration, path.as_str())
            };
            Ok(dependency.into())
        }
        (None, Some(coordinates)) => ExternalDependency::parse(configuration, coordinates)
            .map(ConfiguredDependency::from)
            .ok_or_else(|| {
                invalid(
                    file,
                    format!("invalid coordinates `{}` in {}", coordinates, module.path),
                )
            }),
        _ => Err(invalid(
            file,
            format!(
                "dependency of {} on `{}` needs exactly one of `project` or `external`",
                module.path, configuration
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
modules:
  - path: ":core"
    source_sets:
      main:
        files:
          - path: src/Widget.kt
            package: com.core
            declarations:
              - com.core.Widget
              - name: com.core.WidgetFactory
                applicability: java
              - name: com.core.WidgetAdapter
                generated_from: [com.core.Widget]
  - path: ":app"
    android:
      base_package: com.app
      view_binding: true
    source_sets:
      main: {}
      debug:
        parents: [main]
    dependencies:
      - configuration: implementation
        project: ":core"
      - configuration: testImplementation
        project: ":core"
        test_fixtures: true
      - configuration: kapt
        external: "com.google.dagger:dagger-compiler:2.50"
"#;

    #[test]
    fn test_parse_yaml() {
        let descriptor = parse(Path::new("graph.yml"), YAML).unwrap();
        assert_eq!(descriptor.modules.len(), 2);
        let core = &descriptor.modules[0].source_sets["main"].files[0];
        assert!(matches!(core.declarations[0], DeclarationDescriptor::Name(_)));
        assert!(matches!(core.declarations[1], DeclarationDescriptor::Detailed { .. }));
    }

    #[test]
    fn test_build_graph() {
        let descriptor = parse(Path::new("graph.yml"), YAML).unwrap();
        let loaded = build(descriptor, Path::new("/repo"), Path::new("/repo/graph.yml")).unwrap();

        let app = loaded.graph.module(&":app".into()).unwrap();
        assert!(app.is_android());
        assert_eq!(app.android_base_package(&SourceSetName::DEBUG), Some("com.app"));
        assert!(app.view_binding_enabled());
        assert!(app.android_resources_enabled());
        assert!(app.has_kapt());
        assert_eq!(app.dependencies().len(), 3);

        let core = loaded.graph.module(&":core".into()).unwrap();
        assert!(!core.has_kapt());
        assert!(app.declares(
            &"testImplementation".into(),
            &ProjectDependency::test_fixtures("testImplementation", ":core")
        ));
        assert_eq!(loaded.symbols.file_count(), 1);
    }

    #[tokio::test]
    async fn test_declarations_keep_details() {
        use crate::names::Applicability;
        use crate::symbols::SymbolProvider;

        let descriptor = parse(Path::new("graph.yml"), YAML).unwrap();
        let loaded = build(descriptor, Path::new("/repo"), Path::new("/repo/graph.yml")).unwrap();
        let core = loaded.graph.module(&":core".into()).unwrap();
        let files = loaded.symbols.jvm_files(core, &SourceSetName::MAIN).await.unwrap();

        let declarations = &files[0].declarations;
        assert_eq!(declarations[0].name.package(), "com.core");
        assert_eq!(declarations[1].applicability, Applicability::Java);
        assert_eq!(declarations[2].generated_sources()[0].as_str(), "com.core.Widget");
        assert_eq!(files[0].path, PathBuf::from("/repo/src/Widget.kt"));
    }

    #[test]
    fn test_dependency_needs_one_target() {
        let yaml = r#"
modules:
  - path: ":app"
    dependencies:
      - configuration: implementation
"#;
        let descriptor = parse(Path::new("graph.yml"), yaml).unwrap();
        let error = build(descriptor, Path::new("."), Path::new("graph.yml")).unwrap_err();
        assert!(matches!(error, AnalysisError::Descriptor { .. }));
        assert!(error.to_string().contains("exactly one"));
    }

    #[test]
    fn test_malformed_symbol_names_are_rejected() {
        let yaml = r#"
modules:
  - path: ":app"
    source_sets:
      main:
        files:
          - path: App.kt
            imports: ["com.example. Broken"]
"#;
        let descriptor = parse(Path::new("graph.yml"), yaml).unwrap();
        let error = build(descriptor, Path::new("."), Path::new("graph.yml")).unwrap_err();
        assert!(error.to_string().contains("App.kt"));

        let unknown_language = r#"
modules:
  - path: ":app"
    source_sets:
      main:
        files:
          - path: build.gradle
"#;
        let descriptor = parse(Path::new("graph.yml"), unknown_language).unwrap();
        assert!(build(descriptor, Path::new("."), Path::new("graph.yml")).is_err());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let yaml = "modules:\n  - path: \":app\"\n    flavour: free\n";
        let error = parse(Path::new("graph.yaml"), yaml).unwrap_err();
        assert!(matches!(error, AnalysisError::Descriptor { .. }));
    }

    #[test]
    fn test_parse_json_and_toml() {
        let json = r#"{"modules": [{"path": ":lib", "anvil": true}]}"#;
        let descriptor = parse(Path::new("graph.json"), json).unwrap();
        assert!(descriptor.modules[0].anvil);

        let toml = "[[modules]]\npath = \":lib\"\n\n[[modules.dependencies]]\nconfiguration = \"api\"\nproject = \":core\"\n";
        let descriptor = parse(Path::new("graph.toml"), toml).unwrap();
        assert_eq!(descriptor.modules[0].dependencies[0].project.as_deref(), Some(":core"));
    }

    #[test]
    fn test_resource_directories_are_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let res = dir.path().join("res");
        std::fs::create_dir_all(res.join("values")).unwrap();
        std::fs::create_dir_all(res.join("layout-land")).unwrap();
        std::fs::write(res.join("values/strings.xml"), "<resources/>").unwrap();
        std::fs::write(res.join("layout-land/main.xml"), "<LinearLayout/>").unwrap();

        let mut source_set = SourceSet::new("main");
        add_resources(&mut source_set, &res);
        add_resources(&mut source_set, &dir.path().join("missing"));

        assert_eq!(source_set.resource_files, vec![res.join("values/strings.xml")]);
        assert_eq!(source_set.layout_files, vec![res.join("layout-land/main.xml")]);
    }
}
