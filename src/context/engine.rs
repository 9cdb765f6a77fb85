use super::project::{Project, ProjectContext};
use crate::analysis::{
    self, ClasspathDependencies, DeclarationSource, DependencySources, InheritedDependency, MustBeApi,
    MustBeApiDependency, ProjectDepth, ProjectDepths, ResolvedDeclaredNames,
};
use crate::error::Result;
use crate::model::{
    CodeGenerators, ConfiguredDependency, ModuleGraph, ModulePath, ProjectDependency, SourceSetName,
    TransitiveProjectDependency,
};
use crate::names::ReferenceName;
use crate::symbols::SymbolProvider;
use dashmap::DashMap;
use std::sync::Arc;

struct EngineInner {
    graph: ModuleGraph,
    symbols: Arc<dyn SymbolProvider>,
    code_generators: CodeGenerators,
    contexts: DashMap<ModulePath, Arc<ProjectContext>>,
}

/// Handle on one analysis run: the module graph, the symbol provider, and
/// one [`ProjectContext`] per module. Cheap to clone.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    pub fn new(graph: ModuleGraph, symbols: Arc<dyn SymbolProvider>) -> Self {
        Self::with_code_generators(graph, symbols, CodeGenerators::default())
    }

    pub fn with_code_generators(
        graph: ModuleGraph,
        symbols: Arc<dyn SymbolProvider>,
        code_generators: CodeGenerators,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                graph,
                symbols,
                code_generators,
                contexts: DashMap::new(),
            }),
        }
    }

    pub fn graph(&self) -> &ModuleGraph {
        &self.inner.graph
    }

    pub fn symbols(&self) -> &Arc<dyn SymbolProvider> {
        &self.inner.symbols
    }

    pub fn code_generators(&self) -> &CodeGenerators {
        &self.inner.code_generators
    }

    /// The project for `path`, sharing one context per module
    pub fn project(&self, path: &ModulePath) -> Result<Project> {
        let module = Arc::clone(self.inner.graph.require(path)?);
        let context = {
            let entry = self.inner.contexts.entry(path.clone()).or_default();
            Arc::clone(entry.value())
        };
        Ok(Project::new(self.clone(), module, context))
    }

    /// Every project, dependencies before dependents
    pub fn projects(&self) -> Result<Vec<Project>> {
        self.inner
            .graph
            .topological_order()
            .iter()
            .map(|path| self.project(path))
            .collect()
    }

    pub async fn classpath(
        &self,
        path: &ModulePath,
        source_set: &SourceSetName,
    ) -> Result<Arc<Vec<TransitiveProjectDependency>>> {
        let project = self.project(path)?;
        project
            .get::<ClasspathDependencies>()
            .await?
            .get(&project, source_set)
            .await
    }

    pub async fn depth(&self, path: &ModulePath, source_set: &SourceSetName) -> Result<Arc<ProjectDepth>> {
        let project = self.project(path)?;
        project.get::<ProjectDepths>().await?.get(&project, source_set).await
    }

    pub async fn uses(&self, path: &ModulePath, dependency: &ConfiguredDependency) -> Result<bool> {
        let project = self.project(path)?;
        analysis::uses(&project, dependency).await
    }

    pub async fn unused_dependencies(&self, path: &ModulePath) -> Result<Vec<ConfiguredDependency>> {
        let project = self.project(path)?;
        analysis::unused_dependencies(&project).await
    }

    pub async fn must_be_api(&self, path: &ModulePath) -> Result<Arc<Vec<MustBeApiDependency>>> {
        let project = self.project(path)?;
        project.get::<MustBeApi>().await?.get(&project).await
    }

    pub async fn inherited_dependencies(&self, path: &ModulePath) -> Result<Vec<InheritedDependency>> {
        let project = self.project(path)?;
        analysis::inherited_dependencies(&project).await
    }

    /// The direct dependency of `path` that puts `dependency` on the classpath
    /// of `source_set`
    pub async fn source_of(
        &self,
        path: &ModulePath,
        dependency: &ModulePath,
        source_set: &SourceSetName,
        is_test_fixture: bool,
    ) -> Result<ProjectDependency> {
        let project = self.project(path)?;
        project
            .get::<DependencySources>()
            .await?
            .require_source_of(&project, dependency, source_set, is_test_fixture)
            .await
    }

    /// Which module and source set declares `name` as seen from `path`
    pub async fn declaring_source(
        &self,
        path: &ModulePath,
        source_set: &SourceSetName,
        name: &ReferenceName,
    ) -> Result<Option<DeclarationSource>> {
        let project = self.project(path)?;
        project
            .get::<ResolvedDeclaredNames>()
            .await?
            .get_source(&project, name, source_set)
            .await
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("modules", &self.inner.graph.len())
            .field("contexts", &self.inner.contexts.len())
            .finish()
    }
}
