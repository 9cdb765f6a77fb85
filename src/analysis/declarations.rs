use super::files::{source_declarations, SourceFiles};
use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::lazy::{DataSource, LazySet, Priority};
use crate::model::SourceSetName;
use crate::names::{data_binding_name, r_class_name, DeclaredName};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Names declared by each source set, as lazy sets.
///
/// Source declarations are the high priority source. Android modules add
/// the `R` class, binding classes of layouts and resource names.
#[derive(Default)]
pub struct Declarations {
    own: SafeCache<SourceSetName, LazySet<DeclaredName>>,
    with_upstream: SafeCache<SourceSetName, LazySet<DeclaredName>>,
}

impl Key for Declarations {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl Declarations {
    pub async fn get(
        &self,
        project: &Project,
        source_set: &SourceSetName,
        include_upstream: bool,
    ) -> Result<LazySet<DeclaredName>> {
        let files = SourceFiles::of(project).await?;
        if !include_upstream {
            return self.own(&files, source_set).await;
        }

        let upstream = source_set.with_upstream(files.module());
        let mut sets = Vec::with_capacity(upstream.len());
        for name in &upstream {
            sets.push(self.own(&files, name).await?);
        }

        self.with_upstream
            .get_or_try_init(source_set.clone(), || async {
                Ok(sets.iter().fold(LazySet::empty(), |merged, set| merged.union(set)))
            })
            .await
    }

    async fn own(&self, files: &SourceFiles, source_set: &SourceSetName) -> Result<LazySet<DeclaredName>> {
        self.own
            .get_or_try_init(source_set.clone(), || async { Ok(own_declarations(files, source_set)) })
            .await
    }
}

fn own_declarations(files: &SourceFiles, source_set: &SourceSetName) -> LazySet<DeclaredName> {
    let mut sources = Vec::new();

    let loader_files = files.clone();
    let loader_source_set = source_set.clone();
    sources.push(DataSource::new(Priority::High, move || {
        source_declarations(loader_files.clone(), loader_source_set.clone())
    }));

    let module = files.module();
    if module.android_resources_enabled() {
        if let Some(package) = module.android_base_package(source_set) {
            let mut generated = vec![r_class_name(package)];
            if let Some(layouts) = module.source_set(source_set).map(|s| &s.layout_files) {
                generated.extend(
                    layouts
                        .iter()
                        .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()))
                        .map(|layout| data_binding_name(layout, package)),
                );
            }
            sources.push(DataSource::ready(Priority::Medium, generated));
        }

        let loader_files = files.clone();
        let loader_source_set = source_set.clone();
        sources.push(DataSource::new(Priority::Medium, move || {
            resource_declarations(loader_files.clone(), loader_source_set.clone())
        }));
    }

    LazySet::new(sources)
}

async fn resource_declarations(files: SourceFiles, source_set: SourceSetName) -> Result<Vec<DeclaredName>> {
    files.resource_names(&source_set).await.map(|names| names.as_ref().clone())
}

/// Declarations a consumer sees through a dependency on `project`: its
/// `main` source set, or its test fixtures for `testFixtures(...)` edges
pub async fn dependency_declarations(project: &Project, is_test_fixture: bool) -> Result<LazySet<DeclaredName>> {
    let source_set = if is_test_fixture {
        SourceSetName::TEST_FIXTURES
    } else {
        SourceSetName::MAIN
    };
    project.get::<Declarations>().await?.get(project, &source_set, true).await
}
