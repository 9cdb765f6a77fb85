//! Engine integration tests
//!
//! Whole-graph properties of the analysis engine: classpath resolution,
//! depths, attribution of Android resources and Anvil scopes, and the
//! must-be-api rules.

use modcheck::analysis::AndroidResourceDeclaredNames;
use modcheck::context::Engine;
use modcheck::model::{ConfiguredDependency, Module, ModuleGraph, ModulePath, ProjectDependency, SourceSet, SourceSetName};
use modcheck::names::ReferenceName;
use modcheck::rules::{RuleId, RuleRunner};
use modcheck::symbols::{JvmFile, StaticSymbols};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn engine(modules: Vec<Module>, symbols: StaticSymbols) -> Engine {
    let graph = ModuleGraph::new(modules).expect("acyclic graph");
    Engine::new(graph, Arc::new(symbols))
}

fn path(value: &str) -> ModulePath {
    ModulePath::new(value)
}

fn write_strings(dir: &Path, names: &[&str]) -> PathBuf {
    let values = dir.join("res").join("values");
    std::fs::create_dir_all(&values).expect("Failed to create values dir");
    let entries: String = names
        .iter()
        .map(|name| format!("    <string name=\"{}\">{}</string>\n", name, name))
        .collect();
    let file = values.join("strings.xml");
    std::fs::write(&file, format!("<resources>\n{}</resources>\n", entries)).expect("Failed to write strings");
    file
}

fn android_module(module_path: &str, package: &str, strings: Option<PathBuf>) -> Module {
    let mut main = SourceSet::new("main");
    if let Some(file) = strings {
        main = main.with_resource_file(file);
    }
    Module::new(module_path).android(package).with_source_set(main)
}

// ============================================================================
// Classpath
// ============================================================================

#[tokio::test]
async fn test_transitive_closure_through_api() {
    let engine = engine(
        vec![
            Module::new(":c"),
            Module::new(":b").with_project_dependency("api", ":c"),
            Module::new(":a").with_project_dependency("api", ":b"),
        ],
        StaticSymbols::new(),
    );

    let classpath = engine.classpath(&path(":a"), &SourceSetName::MAIN).await.unwrap();
    let c = classpath
        .iter()
        .find(|entry| entry.contributed.path == path(":c"))
        .expect(":c should be on the classpath of :a");

    assert!(!c.is_direct());
    assert_eq!(c.source, ProjectDependency::new("api", ":b"));
    assert!(!classpath.iter().any(|entry| entry.source.path == path(":c")));
}

#[tokio::test]
async fn test_implementation_does_not_propagate() {
    let engine = engine(
        vec![
            Module::new(":c"),
            Module::new(":b").with_project_dependency("api", ":c"),
            Module::new(":a").with_project_dependency("implementation", ":b"),
            Module::new(":d").with_project_dependency("implementation", ":a"),
        ],
        StaticSymbols::new(),
    );

    let a = engine.classpath(&path(":a"), &SourceSetName::MAIN).await.unwrap();
    assert!(a.iter().any(|entry| entry.contributed.path == path(":c")));

    let d = engine.classpath(&path(":d"), &SourceSetName::MAIN).await.unwrap();
    let paths: Vec<&str> = d.iter().map(|entry| entry.contributed.path.as_str()).collect();
    assert_eq!(paths, vec![":a"]);
}

#[tokio::test]
async fn test_test_fixtures_expose_main() {
    let engine = engine(
        vec![
            Module::new(":b").with_source_set(SourceSet::implicit(SourceSetName::TEST_FIXTURES)),
            Module::new(":a").with_test_fixtures_dependency("testImplementation", ":b"),
        ],
        StaticSymbols::new(),
    );

    let classpath = engine.classpath(&path(":a"), &SourceSetName::TEST).await.unwrap();
    let fixture = ProjectDependency::test_fixtures("testImplementation", ":b");

    assert!(classpath.iter().any(|entry| entry.contributed == fixture && entry.is_direct()));
    let main = classpath
        .iter()
        .find(|entry| entry.contributed.path == path(":b") && !entry.contributed.is_test_fixture)
        .expect("main variant of :b");
    assert_eq!(main.source, fixture);
}

#[tokio::test]
async fn test_missing_module_fails_loudly() {
    let engine = engine(
        vec![Module::new(":a").with_project_dependency("implementation", ":ghost")],
        StaticSymbols::new(),
    );

    let error = engine
        .classpath(&path(":a"), &SourceSetName::MAIN)
        .await
        .expect_err("missing module must fail");
    let message = error.to_string();
    assert!(message.contains(":ghost"));
    assert!(message.contains(":a"));
    assert!(message.contains("main"));
}

#[tokio::test]
async fn test_source_of_transitive_dependency() {
    let engine = engine(
        vec![
            Module::new(":c"),
            Module::new(":b").with_project_dependency("api", ":c"),
            Module::new(":a").with_project_dependency("implementation", ":b"),
        ],
        StaticSymbols::new(),
    );

    let source = engine
        .source_of(&path(":a"), &path(":c"), &SourceSetName::MAIN, false)
        .await
        .unwrap();
    assert_eq!(source, ProjectDependency::new("implementation", ":b"));

    assert!(engine
        .source_of(&path(":c"), &path(":a"), &SourceSetName::MAIN, false)
        .await
        .is_err());
}

// ============================================================================
// Depth
// ============================================================================

#[tokio::test]
async fn test_depth_invariant() {
    let engine = engine(
        vec![
            Module::new(":base"),
            Module::new(":util").with_project_dependency("api", ":base"),
            Module::new(":network")
                .with_project_dependency("implementation", ":util")
                .with_project_dependency("implementation", ":base"),
            Module::new(":data").with_project_dependency("api", ":network"),
            Module::new(":feature")
                .with_project_dependency("implementation", ":data")
                .with_project_dependency("implementation", ":util"),
            Module::new(":app")
                .with_project_dependency("implementation", ":feature")
                .with_project_dependency("testImplementation", ":data"),
        ],
        StaticSymbols::new(),
    );

    for module in engine.graph().modules() {
        let depth = engine.depth(&module.path, &SourceSetName::MAIN).await.unwrap();
        for child in module.project_dependencies_for(&SourceSetName::MAIN) {
            let child_depth = engine.depth(&child.path, &SourceSetName::MAIN).await.unwrap();
            assert!(
                depth.depth > child_depth.depth,
                "{} ({}) should be deeper than {} ({})",
                module.path,
                depth.depth,
                child.path,
                child_depth.depth
            );
        }
    }

    let app = engine.depth(&path(":app"), &SourceSetName::MAIN).await.unwrap();
    assert_eq!(app.depth, 5);
    let chain: Vec<String> = app.longest_path().iter().map(ToString::to_string).collect();
    assert_eq!(chain, vec![":app", ":feature", ":data", ":network", ":util", ":base"]);
}

// ============================================================================
// Android resources
// ============================================================================

#[tokio::test]
async fn test_r_class_dual_addressing() {
    let dir = tempfile::tempdir().unwrap();
    let strings = write_strings(dir.path(), &["app_name"]);
    let engine = engine(
        vec![
            android_module(":lib", "com.lib", Some(strings)),
            Module::new(":app").with_project_dependency("implementation", ":lib"),
        ],
        StaticSymbols::new().with_file(
            ":app",
            "main",
            JvmFile::kotlin("App.kt", "com.app").referencing("com.lib.R.string.app_name"),
        ),
    );

    let lib = engine.project(&path(":lib")).unwrap();
    let names = lib
        .get::<AndroidResourceDeclaredNames>()
        .await
        .unwrap()
        .get(lib.module(), &SourceSetName::MAIN)
        .await
        .unwrap();
    let unqualified = names.iter().find(|n| n.as_str() == "R.string.app_name").unwrap();
    let qualified = names.iter().find(|n| n.as_str() == "com.lib.R.string.app_name").unwrap();
    assert!(Arc::ptr_eq(unqualified.resource().unwrap(), qualified.resource().unwrap()));

    for name in ["R.string.app_name", "com.lib.R.string.app_name"] {
        let source = engine
            .declaring_source(&path(":app"), &SourceSetName::MAIN, &ReferenceName::kotlin(name))
            .await
            .unwrap()
            .expect("resource should resolve");
        assert_eq!(source.module, path(":lib"));
    }

    let dependency: ConfiguredDependency = ProjectDependency::new("implementation", ":lib").into();
    assert!(engine.uses(&path(":app"), &dependency).await.unwrap());
}

#[tokio::test]
async fn test_r_reference_must_be_api_only_from_direct_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let strings = write_strings(dir.path(), &["title"]);
    let exposing = |package: &str| {
        JvmFile::kotlin("Screen.kt", package)
            .declaring(&format!("{}.Screen", package))
            .exposing("R.string.title")
    };

    let engine = engine(
        vec![
            android_module(":res", "com.res", Some(strings)),
            android_module(":middle", "com.middle", None).with_project_dependency("api", ":res"),
            android_module(":deep", "com.deep", None).with_project_dependency("implementation", ":middle"),
            android_module(":direct", "com.direct", None).with_project_dependency("implementation", ":res"),
        ],
        StaticSymbols::new()
            .with_file(":deep", "main", exposing("com.deep"))
            .with_file(":direct", "main", exposing("com.direct")),
    );

    let direct = engine.must_be_api(&path(":direct")).await.unwrap();
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].dependency.path, path(":res"));

    // Two levels down, the R reference does not make :res api
    let deep = engine.must_be_api(&path(":deep")).await.unwrap();
    assert!(deep.iter().all(|api| api.dependency.path != path(":res")));
}

// ============================================================================
// Anvil scopes
// ============================================================================

#[tokio::test]
async fn test_scope_merge_implies_usage() {
    let engine = engine(
        vec![
            Module::new(":scopes"),
            Module::new(":contributor")
                .with_anvil(true)
                .with_project_dependency("implementation", ":scopes"),
            Module::new(":component")
                .with_anvil(true)
                .with_project_dependency("api", ":scopes"),
            Module::new(":app")
                .with_project_dependency("implementation", ":component")
                .with_project_dependency("implementation", ":contributor"),
        ],
        StaticSymbols::new()
            .with_file(":scopes", "main", JvmFile::kotlin("AppScope.kt", "com.scopes").declaring("com.scopes.AppScope"))
            .with_file(
                ":contributor",
                "main",
                JvmFile::kotlin("LoginModule.kt", "com.login")
                    .declaring("com.login.LoginModule")
                    .importing("com.squareup.anvil.annotations.ContributesTo")
                    .importing("com.scopes.AppScope")
                    .annotated("com.login.LoginModule", "ContributesTo", "AppScope::class"),
            )
            .with_file(
                ":component",
                "main",
                JvmFile::kotlin("AppComponent.kt", "com.component")
                    .declaring("com.component.AppComponent")
                    .importing("com.squareup.anvil.annotations.MergeComponent")
                    .importing("com.scopes.AppScope")
                    .annotated("com.component.AppComponent", "MergeComponent", "scope = AppScope::class"),
            )
            .with_file(":app", "main", JvmFile::kotlin("App.kt", "com.app").declaring("com.app.App")),
    );

    let contributor: ConfiguredDependency = ProjectDependency::new("implementation", ":contributor").into();
    assert!(engine.uses(&path(":app"), &contributor).await.unwrap());

    let component: ConfiguredDependency = ProjectDependency::new("implementation", ":component").into();
    assert!(!engine.uses(&path(":app"), &component).await.unwrap());
}

// ============================================================================
// End to end
// ============================================================================

fn core_feature(feature_file: JvmFile) -> Engine {
    engine(
        vec![
            Module::new(":core"),
            Module::new(":feature").with_project_dependency("implementation", ":core"),
        ],
        StaticSymbols::new()
            .with_file(":core", "main", JvmFile::kotlin("Widget.kt", "core").declaring("core.Widget"))
            .with_file(":feature", "main", feature_file),
    )
}

#[tokio::test]
async fn test_core_feature_public_member() {
    let engine = core_feature(
        JvmFile::kotlin("Feature.kt", "feature")
            .declaring("feature.Feature")
            .exposing("core.Widget"),
    );

    let dependency: ConfiguredDependency = ProjectDependency::new("implementation", ":core").into();
    assert!(engine.uses(&path(":feature"), &dependency).await.unwrap());

    let must_be_api = engine.must_be_api(&path(":feature")).await.unwrap();
    assert_eq!(must_be_api.len(), 1);
    assert_eq!(must_be_api[0].dependency.path, path(":core"));

    let report = RuleRunner::new(engine).run().await.unwrap();
    assert_eq!(report.count(RuleId::MustBeApi), 1);
    let finding = report.findings.iter().find(|f| f.rule == RuleId::MustBeApi).unwrap();
    assert_eq!(finding.configuration.as_str(), "api");
    assert_eq!(finding.dependency, ":core");
}

#[tokio::test]
async fn test_core_feature_private_member() {
    let engine = core_feature(
        JvmFile::kotlin("Feature.kt", "feature")
            .declaring("feature.Feature")
            .referencing("core.Widget"),
    );

    let dependency: ConfiguredDependency = ProjectDependency::new("implementation", ":core").into();
    assert!(engine.uses(&path(":feature"), &dependency).await.unwrap());
    assert!(engine.must_be_api(&path(":feature")).await.unwrap().is_empty());

    let report = RuleRunner::new(engine).run().await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_inherited_dependency_reported() {
    let engine = engine(
        vec![
            Module::new(":core"),
            Module::new(":network").with_project_dependency("api", ":core"),
            Module::new(":feature").with_project_dependency("implementation", ":network"),
        ],
        StaticSymbols::new()
            .with_file(":core", "main", JvmFile::kotlin("Widget.kt", "core").declaring("core.Widget"))
            .with_file(":network", "main", JvmFile::kotlin("Client.kt", "network").declaring("network.Client"))
            .with_file(
                ":feature",
                "main",
                JvmFile::kotlin("Feature.kt", "feature")
                    .referencing("network.Client")
                    .referencing("core.Widget"),
            ),
    );

    let inherited = engine.inherited_dependencies(&path(":feature")).await.unwrap();
    assert_eq!(inherited.len(), 1);
    assert_eq!(inherited[0].dependency, ProjectDependency::new("implementation", ":core"));
    assert_eq!(inherited[0].source, ProjectDependency::new("implementation", ":network"));

    let report = RuleRunner::new(engine).run().await.unwrap();
    let finding = report
        .findings
        .iter()
        .find(|f| f.rule == RuleId::InheritedDependency)
        .expect("inherited finding");
    assert_eq!(finding.module, path(":feature"));
    assert_eq!(finding.source.as_deref(), Some(":network"));
}

#[tokio::test]
async fn test_exposed_inherited_dependency_is_reported_once() {
    let engine = engine(
        vec![
            Module::new(":c"),
            Module::new(":b").with_project_dependency("api", ":c"),
            Module::new(":a").with_project_dependency("implementation", ":b"),
        ],
        StaticSymbols::new()
            .with_file(":c", "main", JvmFile::kotlin("Widget.kt", "c").declaring("c.Widget"))
            .with_file(":b", "main", JvmFile::kotlin("Holder.kt", "b").declaring("b.Holder"))
            .with_file(
                ":a",
                "main",
                JvmFile::kotlin("Screen.kt", "a")
                    .declaring("a.Screen")
                    .referencing("b.Holder")
                    .exposing("c.Widget"),
            ),
    );

    // Reached through an api edge, :c is missing rather than mis-declared
    assert!(engine.must_be_api(&path(":a")).await.unwrap().is_empty());

    let report = RuleRunner::new(engine).run().await.unwrap();
    assert_eq!(report.count(RuleId::MustBeApi), 0);
    assert_eq!(report.count(RuleId::InheritedDependency), 1);

    let finding = report
        .findings
        .iter()
        .find(|f| f.rule == RuleId::InheritedDependency)
        .expect("inherited finding");
    assert_eq!(finding.dependency, ":c");
    assert_eq!(finding.configuration.as_str(), "api");
    assert_eq!(finding.source.as_deref(), Some(":b"));
}
