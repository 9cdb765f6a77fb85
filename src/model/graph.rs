use super::module::Module;
use super::path::ModulePath;
use super::source_set::{SourceSet, SourceSetName};
use crate::error::{AnalysisError, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Arena of every module of a build, keyed by path.
///
/// Loading normalizes source sets (implicit source sets for configurations,
/// transitive upstream and downstream lists) and rejects cycles, both between
/// modules and between source sets of one module. Edges to modules that are
/// not in the graph are kept; they fail when an analysis resolves them.
#[derive(Debug)]
pub struct ModuleGraph {
    modules: BTreeMap<ModulePath, Arc<Module>>,
    dependents: HashMap<ModulePath, Vec<ModulePath>>,
    /// Dependencies before their dependents
    order: Vec<ModulePath>,
}

impl ModuleGraph {
    pub fn new(modules: impl IntoIterator<Item = Module>) -> Result<Self> {
        let mut by_path = BTreeMap::new();
        for mut module in modules {
            normalize_source_sets(&mut module)?;
            let path = module.path.clone();
            if by_path.insert(path.clone(), Arc::new(module)).is_some() {
                return Err(AnalysisError::DuplicateModule(path));
            }
        }

        let order = topological_order(&by_path)?;

        let mut dependents: HashMap<ModulePath, Vec<ModulePath>> = HashMap::new();
        for module in by_path.values() {
            let targets: HashSet<&ModulePath> = module
                .project_dependencies()
                .map(|d| &d.path)
                .filter(|p| **p != module.path)
                .collect();
            for target in targets {
                dependents
                    .entry(target.clone())
                    .or_default()
                    .push(module.path.clone());
            }
        }
        for list in dependents.values_mut() {
            list.sort();
        }

        debug!("Loaded module graph with {} modules", by_path.len());

        Ok(Self {
            modules: by_path,
            dependents,
            order,
        })
    }

    pub fn module(&self, path: &ModulePath) -> Option<&Arc<Module>> {
        self.modules.get(path)
    }

    pub fn require(&self, path: &ModulePath) -> Result<&Arc<Module>> {
        self.modules
            .get(path)
            .ok_or_else(|| AnalysisError::UnknownModule(path.clone()))
    }

    pub fn modules(&self) -> impl Iterator<Item = &Arc<Module>> {
        self.modules.values()
    }

    /// Modules that declare any dependency on `path`
    pub fn dependents(&self, path: &ModulePath) -> &[ModulePath] {
        self.dependents.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every module, dependencies before dependents
    pub fn topological_order(&self) -> &[ModulePath] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn topological_order(modules: &BTreeMap<ModulePath, Arc<Module>>) -> Result<Vec<ModulePath>> {
    let mut graph: DiGraph<ModulePath, ()> = DiGraph::new();
    let mut nodes: HashMap<&ModulePath, NodeIndex> = HashMap::new();

    for path in modules.keys() {
        nodes.insert(path, graph.add_node(path.clone()));
    }

    for module in modules.values() {
        let from = nodes[&module.path];
        for dependency in module.project_dependencies() {
            if dependency.path == module.path {
                continue;
            }
            // Dangling edges fail at resolution time, with more context
            if let Some(&to) = nodes.get(&dependency.path) {
                graph.update_edge(to, from, ());
            }
        }
    }

    toposort(&graph, None)
        .map(|sorted| sorted.into_iter().map(|idx| graph[idx].clone()).collect())
        .map_err(|cycle| AnalysisError::DependencyCycle(graph[cycle.node_id()].clone()))
}

/// Create source sets implied by configurations and compute transitive
/// upstream/downstream lists
fn normalize_source_sets(module: &mut Module) -> Result<()> {
    let implied: Vec<SourceSetName> = module
        .configurations
        .values()
        .map(|c| c.source_set_name())
        .collect();
    for name in implied {
        module
            .source_sets
            .entry(name.clone())
            .or_insert_with(|| SourceSet::implicit(name));
    }

    // Parents that were never declared become plain source sets
    let missing: Vec<SourceSetName> = module
        .source_sets
        .values()
        .flat_map(|s| s.parents.iter())
        .filter(|p| !module.source_sets.contains_key(*p))
        .cloned()
        .collect();
    for name in missing {
        module
            .source_sets
            .entry(name.clone())
            .or_insert_with(|| SourceSet::implicit(name));
    }

    let mut upstream: BTreeMap<SourceSetName, Vec<SourceSetName>> = BTreeMap::new();
    for name in module.source_sets.keys() {
        let mut visiting = Vec::new();
        let list = collect_upstream(module, name, &mut visiting)?;
        upstream.insert(name.clone(), list);
    }

    let mut downstream: BTreeMap<SourceSetName, Vec<SourceSetName>> = BTreeMap::new();
    for (name, ancestors) in &upstream {
        for ancestor in ancestors {
            downstream.entry(ancestor.clone()).or_default().push(name.clone());
        }
    }

    for (name, source_set) in module.source_sets.iter_mut() {
        source_set.upstream = upstream.remove(name).unwrap_or_default();
        source_set.downstream = downstream.remove(name).unwrap_or_default();
    }

    Ok(())
}

/// Breadth-first ancestors of `name`, nearest first, without duplicates
fn collect_upstream(
    module: &Module,
    name: &SourceSetName,
    visiting: &mut Vec<SourceSetName>,
) -> Result<Vec<SourceSetName>> {
    if visiting.contains(name) {
        return Err(AnalysisError::SourceSetCycle {
            module: module.path.clone(),
            source_set: name.clone(),
        });
    }
    visiting.push(name.clone());

    let mut result: Vec<SourceSetName> = Vec::new();
    let parents = module
        .source_set(name)
        .map(|s| s.parents.clone())
        .unwrap_or_default();

    for parent in &parents {
        if !result.contains(parent) {
            result.push(parent.clone());
        }
    }
    for parent in &parents {
        for ancestor in collect_upstream(module, parent, visiting)? {
            if !result.contains(&ancestor) && ancestor != *name {
                result.push(ancestor);
            }
        }
    }

    visiting.pop();
    Ok(result)
}
