use super::declarations::Declarations;
use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::model::SourceSetName;
use crate::names::DeclaredName;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;

/// Generated declarations of a source set, indexed by the names they were
/// generated from
#[derive(Debug, Default)]
pub struct GeneratedIndex {
    generated: Vec<DeclaredName>,
    by_source: HashMap<String, Vec<usize>>,
}

impl GeneratedIndex {
    fn new(generated: Vec<DeclaredName>) -> Self {
        let mut by_source: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, declaration) in generated.iter().enumerate() {
            for source in declaration.generated_sources() {
                by_source.entry(source.as_str().to_string()).or_default().push(index);
            }
        }
        Self { generated, by_source }
    }

    pub fn all(&self) -> &[DeclaredName] {
        &self.generated
    }

    /// Declarations generated from `source`
    pub fn generated_from<'a>(&'a self, source: &str) -> impl Iterator<Item = &'a DeclaredName> + 'a {
        self.by_source
            .get(source)
            .into_iter()
            .flatten()
            .map(move |&index| &self.generated[index])
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }
}

#[derive(Default)]
pub struct GeneratedDeclarations {
    cache: SafeCache<SourceSetName, Arc<GeneratedIndex>>,
}

impl Key for GeneratedDeclarations {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl GeneratedDeclarations {
    /// Generated declarations visible in the source set, upstream included
    pub async fn get(&self, project: &Project, source_set: &SourceSetName) -> Result<Arc<GeneratedIndex>> {
        self.cache
            .get_or_try_init(source_set.clone(), || index(project, source_set))
            .await
    }
}

async fn index(project: &Project, source_set: &SourceSetName) -> Result<Arc<GeneratedIndex>> {
    let declarations = project
        .get::<Declarations>()
        .await?
        .get(project, source_set, true)
        .await?;
    let generated = declarations
        .elements()
        .await?
        .into_iter()
        .filter(DeclaredName::is_generated)
        .collect();
    Ok(Arc::new(GeneratedIndex::new(generated)))
}
