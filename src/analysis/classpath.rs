use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::model::{ProjectDependency, SourceSetName, TransitiveProjectDependency};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Transitive project dependencies of each source set.
///
/// A dependency's `api` dependencies are on the consumer's classpath, sourced
/// from the direct dependency that exposes them. `implementation`
/// dependencies of a dependency are not.
#[derive(Default)]
pub struct ClasspathDependencies {
    cache: SafeCache<SourceSetName, Arc<Vec<TransitiveProjectDependency>>>,
}

impl Key for ClasspathDependencies {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl ClasspathDependencies {
    pub async fn get(
        &self,
        project: &Project,
        source_set: &SourceSetName,
    ) -> Result<Arc<Vec<TransitiveProjectDependency>>> {
        self.cache
            .get_or_try_init(source_set.clone(), || full_tree(project.clone(), source_set.clone()))
            .await
    }

    /// Classpath of every source set of the module, without duplicates
    pub async fn all(&self, project: &Project) -> Result<Vec<TransitiveProjectDependency>> {
        let mut seen = HashSet::new();
        let mut all = Vec::new();
        for source_set in project.module().source_sets.keys() {
            for dependency in self.get(project, source_set).await?.iter() {
                if seen.insert(dependency.clone()) {
                    all.push(dependency.clone());
                }
            }
        }
        Ok(all)
    }
}

/// Source sets of a dependency whose `api` edges reach the consumer
fn exposed_source_sets(source_set: &SourceSetName, dependency: &ProjectDependency) -> Vec<SourceSetName> {
    let mut names = vec![source_set.api_config().to_source_set_name()];
    if !names.contains(&SourceSetName::MAIN) {
        names.push(SourceSetName::MAIN);
    }
    if dependency.is_test_fixture && !names.contains(&SourceSetName::TEST_FIXTURES) {
        names.push(SourceSetName::TEST_FIXTURES);
    }
    names
}

fn full_tree(project: Project, source_set: SourceSetName) -> BoxFuture<'static, Result<Arc<Vec<TransitiveProjectDependency>>>> {
    async move {
        let module = project.module();
        if module.source_set(&source_set).is_none() {
            return Ok(Arc::new(Vec::new()));
        }

        let direct = module.project_dependencies_for(&source_set);
        let direct_paths: HashSet<_> = direct.iter().map(|d| d.path.clone()).collect();

        let mut inherited = Vec::new();
        let mut seen = HashSet::new();

        for dependency in &direct {
            let dependency_project = project.dependency(&dependency.path, &source_set)?;
            let classpath = dependency_project.get::<ClasspathDependencies>().await?;

            for exposed in exposed_source_sets(&source_set, dependency) {
                let entries = classpath.get(&dependency_project, &exposed).await?;
                for entry in entries.iter() {
                    if !entry.source.configuration.is_api() || !entry.contributed.configuration.is_api() {
                        continue;
                    }
                    if direct_paths.contains(&entry.contributed.path) {
                        continue;
                    }
                    // The same module through another direct dependency is another entry
                    let resourced = TransitiveProjectDependency::new(dependency.clone(), entry.contributed.clone());
                    if seen.insert(resourced.clone()) {
                        inherited.push(resourced);
                    }
                }
            }
        }

        // testFixtures(project(":lib")) also brings in :lib itself
        let fixture_mains = direct.iter().filter(|d| d.is_test_fixture).map(|d| {
            TransitiveProjectDependency::new(d.clone(), d.with_test_fixture(false))
        });

        let tree: Vec<_> = direct
            .iter()
            .cloned()
            .map(TransitiveProjectDependency::direct)
            .chain(inherited)
            .chain(fixture_mains)
            .collect();

        debug!("Classpath of {} ({}): {} entries", project.path(), source_set, tree.len());
        Ok(Arc::new(tree))
    }
    .boxed()
}
