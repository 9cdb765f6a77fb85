use super::classpath::ClasspathDependencies;
use super::declarations::{dependency_declarations, Declarations};
use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::model::{ModulePath, ProjectDependency, SourceSetName};
use crate::names::ReferenceName;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use tracing::debug;

/// Where a referenced name is declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationSource {
    pub module: ModulePath,
    pub source_set: SourceSetName,
    /// Direct dependency through which the declaring module is visible,
    /// `None` for the module's own declarations
    pub via: Option<ProjectDependency>,
}

/// Attribution of referenced names to declaring modules. Misses are cached
/// as `None`.
#[derive(Default)]
pub struct ResolvedDeclaredNames {
    cache: SafeCache<(ReferenceName, SourceSetName), Option<DeclarationSource>>,
}

impl Key for ResolvedDeclaredNames {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl ResolvedDeclaredNames {
    pub async fn get_source(
        &self,
        project: &Project,
        reference: &ReferenceName,
        source_set: &SourceSetName,
    ) -> Result<Option<DeclarationSource>> {
        self.cache
            .get_or_try_init((reference.clone(), source_set.clone()), || {
                resolve(project, reference, source_set)
            })
            .await
    }
}

async fn resolve(
    project: &Project,
    reference: &ReferenceName,
    source_set: &SourceSetName,
) -> Result<Option<DeclarationSource>> {
    let own = project
        .get::<Declarations>()
        .await?
        .get(project, source_set, true)
        .await?;
    if own
        .find(reference.as_str(), |declared| declared.matches(reference))
        .await?
        .is_some()
    {
        return Ok(Some(DeclarationSource {
            module: project.path().clone(),
            source_set: source_set.clone(),
            via: None,
        }));
    }

    let classpath = project
        .get::<ClasspathDependencies>()
        .await?
        .get(project, source_set)
        .await?;

    for entry in classpath.iter() {
        let dependency = project.dependency(&entry.contributed.path, source_set)?;
        let declarations = dependency_declarations(&dependency, entry.contributed.is_test_fixture).await?;
        if declarations
            .find(reference.as_str(), |declared| declared.matches(reference))
            .await?
            .is_some()
        {
            let declaring_source_set = if entry.contributed.is_test_fixture {
                SourceSetName::TEST_FIXTURES
            } else {
                SourceSetName::MAIN
            };
            return Ok(Some(DeclarationSource {
                module: entry.contributed.path.clone(),
                source_set: declaring_source_set,
                via: Some(entry.source.clone()),
            }));
        }
    }

    debug!("{} is not declared on the classpath of {} ({})", reference, project.path(), source_set);
    Ok(None)
}
