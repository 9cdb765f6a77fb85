use super::engine::Engine;
use super::safe_cache::SafeCache;
use crate::error::{AnalysisError, Result};
use crate::model::{Module, ModulePath, SourceSetName};
use futures::future::BoxFuture;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use tracing::debug;

/// A typed cache key. The key is the factory of its element: implementing
/// types describe how to build the element from a [`Project`], and the
/// context makes sure that happens at most once per module.
pub trait Key: Send + Sync + 'static {
    type Element: Send + Sync + 'static;

    fn construct(project: Project) -> BoxFuture<'static, Result<Self::Element>>;
}

/// Per-module memo of computed elements
#[derive(Default)]
pub struct ProjectContext {
    elements: SafeCache<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ProjectContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached element for `K`, constructed on first access
    pub async fn get<K: Key>(&self, project: &Project) -> Result<Arc<K::Element>> {
        let element = self
            .elements
            .get_or_try_init(TypeId::of::<K>(), || {
                let project = project.clone();
                async move {
                    debug!("Constructing {} for {}", short_type_name::<K>(), project.path());
                    K::construct(project)
                        .await
                        .map(|element| Arc::new(element) as Arc<dyn Any + Send + Sync>)
                }
            })
            .await?;

        element
            .downcast::<K::Element>()
            .map_err(|_| AnalysisError::ElementType { key: type_name::<K>() })
    }

    /// Number of constructed elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn short_type_name<K>() -> &'static str {
    let name = type_name::<K>();
    name.rsplit("::").next().unwrap_or(name)
}

/// Handle on one module of an [`Engine`]: the module itself, its context,
/// and a way to reach the modules it depends on.
#[derive(Clone)]
pub struct Project {
    engine: Engine,
    module: Arc<Module>,
    context: Arc<ProjectContext>,
}

impl Project {
    pub(crate) fn new(engine: Engine, module: Arc<Module>, context: Arc<ProjectContext>) -> Self {
        Self {
            engine,
            module,
            context,
        }
    }

    pub fn path(&self) -> &ModulePath {
        &self.module.path
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    pub async fn get<K: Key>(&self) -> Result<Arc<K::Element>> {
        self.context.get::<K>(self).await
    }

    /// A module this project depends on. Missing modules are configuration
    /// errors and name this project and the source set being resolved.
    pub fn dependency(&self, path: &ModulePath, source_set: &SourceSetName) -> Result<Project> {
        self.engine
            .project(path)
            .map_err(|_| AnalysisError::ModuleNotFound {
                missing: path.clone(),
                dependent: self.path().clone(),
                source_set: source_set.clone(),
            })
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project").field("path", self.path()).finish()
    }
}
