//! Descriptor integration tests
//!
//! Load graph descriptors from disk and run the checks over them.

use modcheck::config::Config;
use modcheck::descriptor;
use modcheck::model::{ConfiguredDependency, ModulePath, ProjectDependency, SourceSetName};
use modcheck::names::ReferenceName;
use modcheck::rules::{RuleId, RuleRunner};
use modcheck::AnalysisError;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to the sample build descriptor
fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample/graph.yml")
}

fn path(value: &str) -> ModulePath {
    ModulePath::new(value)
}

#[test]
fn test_load_sample_descriptor() {
    let loaded = descriptor::load(&sample_path()).expect("Failed to load sample");

    assert_eq!(loaded.graph.len(), 5);
    assert_eq!(loaded.symbols.file_count(), 5);

    let ui = loaded.graph.module(&path(":ui")).expect(":ui is loaded");
    assert!(ui.is_android());
    let main = ui.source_set(&SourceSetName::MAIN).expect(":ui has main");
    assert_eq!(main.resource_files.len(), 1);
    assert_eq!(main.layout_files.len(), 1);
    assert!(main.manifest.is_some());

    let feature = loaded.graph.module(&path(":feature")).expect(":feature is loaded");
    assert_eq!(feature.dependencies().len(), 3);
}

#[tokio::test]
async fn test_sample_findings() {
    let engine = descriptor::load(&sample_path())
        .expect("Failed to load sample")
        .into_engine(Vec::new());
    let report = RuleRunner::new(engine).run().await.expect("Analysis failed");

    assert_eq!(report.modules_analyzed, 5);
    assert_eq!(report.count(RuleId::UnusedDependency), 1);
    assert_eq!(report.count(RuleId::MustBeApi), 1);
    assert_eq!(report.count(RuleId::InheritedDependency), 1);
    assert_eq!(report.count(RuleId::UnusedCodeGenerator), 1);
    assert_eq!(report.count(RuleId::DisableAndroidResources), 1);
    assert_eq!(report.count(RuleId::DisableViewBinding), 0);
    assert_eq!(report.count(RuleId::UnusedKaptPlugin), 1);

    // Everything is reported against :feature
    let feature = path(":feature");
    assert_eq!(report.findings_for(&feature).count(), report.findings.len());

    let unused = report
        .findings
        .iter()
        .find(|f| f.rule == RuleId::UnusedDependency)
        .expect("unused dependency reported");
    assert_eq!(unused.dependency, ":legacy");

    let must_be_api = report
        .findings
        .iter()
        .find(|f| f.rule == RuleId::MustBeApi)
        .expect("must-be-api reported");
    assert_eq!(must_be_api.dependency, ":ui");
    assert_eq!(must_be_api.configuration.as_str(), "api");
    assert!(must_be_api.source.is_none());

    // :core is missing from :feature, not mis-declared
    let inherited = report
        .findings
        .iter()
        .find(|f| f.rule == RuleId::InheritedDependency)
        .expect("inherited dependency reported");
    assert_eq!(inherited.dependency, ":core");
    assert_eq!(inherited.configuration.as_str(), "api");
    assert_eq!(inherited.source.as_deref(), Some(":ui"));

    let generator = report
        .findings
        .iter()
        .find(|f| f.rule == RuleId::UnusedCodeGenerator)
        .expect("unused code generator reported");
    assert_eq!(generator.dependency, "com.google.dagger:dagger-compiler:2.50");
    assert_eq!(generator.configuration.as_str(), "kapt");
}

#[tokio::test]
async fn test_sample_attribution() {
    let engine = descriptor::load(&sample_path())
        .expect("Failed to load sample")
        .into_engine(Vec::new());

    // :feature only reaches :ui through its R class
    let ui = ConfiguredDependency::from(ProjectDependency::new("implementation", ":ui"));
    assert!(engine.uses(&path(":feature"), &ui).await.unwrap());

    let binding = ReferenceName::kotlin("com.example.ui.databinding.UiCardBinding");
    let found = engine
        .declaring_source(&path(":feature"), &SourceSetName::MAIN, &binding)
        .await
        .unwrap()
        .expect("layout binding resolves");
    assert_eq!(found.module, path(":ui"));

    // :app only sees :feature
    let widget = ReferenceName::kotlin("core.Widget");
    assert!(engine
        .declaring_source(&path(":app"), &SourceSetName::MAIN, &widget)
        .await
        .unwrap()
        .is_none());

    let depth = engine.depth(&path(":app"), &SourceSetName::MAIN).await.unwrap();
    assert_eq!(depth.depth, 3);
}

#[tokio::test]
async fn test_config_filters_sample_findings() {
    let config = Config::from_file(
        &PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample/strict.modcheck.yml"),
    )
    .expect("Failed to load config");
    let engine = descriptor::load(&sample_path())
        .expect("Failed to load sample")
        .into_engine(config.code_generators.clone());

    let report = RuleRunner::from_config(engine, &config).run().await.unwrap();

    assert_eq!(report.count(RuleId::UnusedCodeGenerator), 0);
    assert_eq!(report.count(RuleId::InheritedDependency), 0);
    assert_eq!(report.count(RuleId::UnusedDependency), 1);
    assert_eq!(report.count(RuleId::MustBeApi), 1);
    assert_eq!(report.count(RuleId::DisableAndroidResources), 1);
    // The only kapt processor is ignored, so the plugin counts as used
    assert_eq!(report.count(RuleId::UnusedKaptPlugin), 0);
    assert!(report.depths.is_empty());
}

#[test]
fn test_load_json_descriptor() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("graph.json");
    std::fs::write(
        &file,
        r#"{
  "modules": [
    {"path": ":lib"},
    {
      "path": ":app",
      "dependencies": [{"configuration": "implementation", "project": ":lib"}]
    }
  ]
}"#,
    )
    .unwrap();

    let loaded = descriptor::load(&file).unwrap();
    assert_eq!(loaded.graph.len(), 2);
}

#[tokio::test]
async fn test_load_toml_descriptor_with_code_generator() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("graph.toml");
    std::fs::write(
        &file,
        r#"
[[code_generators]]
name = "Moshi"
coordinates = "com.squareup.moshi:moshi-kotlin-codegen"
annotations = ["com.squareup.moshi.JsonClass"]

[[modules]]
path = ":model"

[[modules.source_sets.main.files]]
path = "Payload.kt"
package = "com.model"
declarations = ["com.model.Payload"]
imports = ["com.squareup.moshi.JsonClass"]
references = ["com.squareup.moshi.JsonClass"]

[[modules.dependencies]]
configuration = "ksp"
external = "com.squareup.moshi:moshi-kotlin-codegen:1.15.0"
"#,
    )
    .unwrap();

    let loaded = descriptor::load(&file).unwrap();
    assert_eq!(loaded.code_generators.len(), 1);

    let report = RuleRunner::new(loaded.into_engine(Vec::new())).run().await.unwrap();
    assert_eq!(report.count(RuleId::UnusedCodeGenerator), 0);
}

#[test]
fn test_missing_descriptor() {
    let error = descriptor::load(&PathBuf::from("/nonexistent/graph.yml")).unwrap_err();
    assert!(matches!(error, AnalysisError::Io { .. }));
}

#[test]
fn test_descriptor_errors_name_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("broken.yml");
    std::fs::write(&file, "modules:\n  - path: app\n").unwrap();

    let error = descriptor::load(&file).unwrap_err();
    assert!(matches!(error, AnalysisError::Descriptor { .. }));
    assert!(error.to_string().contains("broken.yml"));
}

#[test]
fn test_descriptor_cycle_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("graph.yml");
    std::fs::write(
        &file,
        r#"
modules:
  - path: ":a"
    dependencies:
      - configuration: api
        project: ":b"
  - path: ":b"
    dependencies:
      - configuration: implementation
        project: ":a"
"#,
    )
    .unwrap();

    let error = descriptor::load(&file).unwrap_err();
    assert!(matches!(error, AnalysisError::DependencyCycle(_)));
}
