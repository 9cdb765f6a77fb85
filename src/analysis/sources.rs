use super::classpath::ClasspathDependencies;
use crate::context::{Key, Project, SafeCache};
use crate::error::{AnalysisError, Result};
use crate::model::{ModulePath, ProjectDependency, SourceSetName};
use futures::future::BoxFuture;
use futures::FutureExt;

type SourceKey = (SourceSetName, ModulePath, bool);

/// Which direct dependency brings a module into a source set's classpath.
/// Negative answers are cached too.
#[derive(Default)]
pub struct DependencySources {
    cache: SafeCache<SourceKey, Option<ProjectDependency>>,
}

impl Key for DependencySources {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl DependencySources {
    pub async fn source_of(
        &self,
        project: &Project,
        path: &ModulePath,
        source_set: &SourceSetName,
        is_test_fixture: bool,
    ) -> Result<Option<ProjectDependency>> {
        let key = (source_set.clone(), path.clone(), is_test_fixture);
        self.cache
            .get_or_try_init(key, || find_source(project, path, source_set, is_test_fixture))
            .await
    }

    pub async fn require_source_of(
        &self,
        project: &Project,
        path: &ModulePath,
        source_set: &SourceSetName,
        is_test_fixture: bool,
    ) -> Result<ProjectDependency> {
        self.source_of(project, path, source_set, is_test_fixture)
            .await?
            .ok_or_else(|| AnalysisError::SourceNotFound {
                dependency: path.clone(),
                dependent: project.path().clone(),
                source_set: source_set.clone(),
                is_test_fixture,
            })
    }
}

async fn find_source(
    project: &Project,
    path: &ModulePath,
    source_set: &SourceSetName,
    is_test_fixture: bool,
) -> Result<Option<ProjectDependency>> {
    let classpath = project
        .get::<ClasspathDependencies>()
        .await?
        .get(project, source_set)
        .await?;

    Ok(classpath
        .iter()
        .find(|entry| entry.contributed.path == *path && entry.contributed.is_test_fixture == is_test_fixture)
        .map(|entry| entry.source.clone()))
}
