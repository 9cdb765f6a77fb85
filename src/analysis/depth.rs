use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::model::{ModulePath, SourceSetName};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Longest dependency chain below a module's source set.
///
/// A module without project dependencies has depth 0. Otherwise the depth
/// is one more than the deepest `main` depth of its direct dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDepth {
    pub path: ModulePath,
    pub source_set: SourceSetName,
    pub depth: usize,
    #[serde(skip)]
    pub children: Vec<Arc<ProjectDepth>>,
}

impl ProjectDepth {
    /// Children on a longest path. Ties are all kept.
    pub fn deepest_children(&self) -> Vec<&Arc<ProjectDepth>> {
        let Some(max) = self.children.iter().map(|child| child.depth).max() else {
            return Vec::new();
        };
        self.children.iter().filter(|child| child.depth == max).collect()
    }

    /// One longest chain, this module first
    pub fn longest_path(&self) -> Vec<ModulePath> {
        let mut path = vec![self.path.clone()];
        let mut current = self.deepest_children().first().map(|child| Arc::clone(child));
        while let Some(node) = current {
            path.push(node.path.clone());
            current = node.deepest_children().first().map(|child| Arc::clone(child));
        }
        path
    }
}

#[derive(Default)]
pub struct ProjectDepths {
    cache: SafeCache<SourceSetName, Arc<ProjectDepth>>,
}

impl Key for ProjectDepths {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl ProjectDepths {
    pub async fn get(&self, project: &Project, source_set: &SourceSetName) -> Result<Arc<ProjectDepth>> {
        self.cache
            .get_or_try_init(source_set.clone(), || compute(project.clone(), source_set.clone()))
            .await
    }
}

fn compute(project: Project, source_set: SourceSetName) -> BoxFuture<'static, Result<Arc<ProjectDepth>>> {
    async move {
        let paths: BTreeSet<ModulePath> = project
            .module()
            .project_dependencies_for(&source_set)
            .into_iter()
            .map(|dependency| dependency.path)
            .collect();

        let mut children = Vec::with_capacity(paths.len());
        for path in &paths {
            let dependency = project.dependency(path, &source_set)?;
            let depths = dependency.get::<ProjectDepths>().await?;
            children.push(depths.get(&dependency, &SourceSetName::MAIN).await?);
        }

        let depth = children.iter().map(|child| child.depth + 1).max().unwrap_or(0);
        Ok(Arc::new(ProjectDepth {
            path: project.path().clone(),
            source_set,
            depth,
            children,
        }))
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Engine;
    use crate::model::{Module, ModuleGraph, SourceSet};
    use crate::symbols::StaticSymbols;

    fn engine() -> Engine {
        let graph = ModuleGraph::new(vec![
            Module::new(":a"),
            Module::new(":b").with_project_dependency("api", ":a"),
            Module::new(":c").with_project_dependency("implementation", ":a"),
            Module::new(":d")
                .with_source_set(SourceSet::implicit(SourceSetName::TEST))
                .with_project_dependency("implementation", ":b")
                .with_project_dependency("implementation", ":c")
                .with_project_dependency("testImplementation", ":e"),
            Module::new(":e").with_project_dependency("implementation", ":b"),
        ]);
        Engine::new(graph.unwrap(), Arc::new(StaticSymbols::new()))
    }

    #[tokio::test]
    async fn test_depth_with_ties() {
        let engine = engine();

        let a = engine.depth(&":a".into(), &SourceSetName::MAIN).await.unwrap();
        assert_eq!(a.depth, 0);
        assert!(a.deepest_children().is_empty());

        let d = engine.depth(&":d".into(), &SourceSetName::MAIN).await.unwrap();
        assert_eq!(d.depth, 2);
        let deepest: Vec<_> = d.deepest_children().iter().map(|c| c.path.to_string()).collect();
        assert_eq!(deepest, vec![":b", ":c"]);
        assert_eq!(d.longest_path().len(), 3);
    }

    #[tokio::test]
    async fn test_test_source_set_depth_uses_main_of_dependencies() {
        let engine = engine();
        let test = engine.depth(&":d".into(), &SourceSetName::TEST).await.unwrap();
        // test sees :b and :c through main, plus :e which sits on top of :b
        assert_eq!(test.depth, 3);
        let deepest: Vec<_> = test.deepest_children().iter().map(|c| c.path.to_string()).collect();
        assert_eq!(deepest, vec![":e"]);
    }
}
