use super::files::SourceFiles;
use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::lazy::{DataSource, LazySet, Priority};
use crate::model::SourceSetName;
use crate::names::ReferenceName;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Names referenced by each source set and its upstream source sets.
///
/// Explicit references are realized first. XML references follow, and
/// speculative references are only loaded when nothing else matched.
#[derive(Default)]
pub struct References {
    own: SafeCache<SourceSetName, LazySet<ReferenceName>>,
    with_upstream: SafeCache<SourceSetName, LazySet<ReferenceName>>,
    api: SafeCache<SourceSetName, Arc<Vec<ReferenceName>>>,
}

impl Key for References {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl References {
    pub async fn get(&self, project: &Project, source_set: &SourceSetName) -> Result<LazySet<ReferenceName>> {
        let files = SourceFiles::of(project).await?;
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

    /// References from the public API of the source set and its upstream
    pub async fn api(&self, project: &Project, source_set: &SourceSetName) -> Result<Arc<Vec<ReferenceName>>> {
        let files = SourceFiles::of(project).await?;
        self.api
            .get_or_try_init(source_set.clone(), || api_references(&files, source_set))
            .await
    }

    async fn own(&self, files: &SourceFiles, source_set: &SourceSetName) -> Result<LazySet<ReferenceName>> {
        self.own
            .get_or_try_init(source_set.clone(), || async { Ok(own_references(files, source_set)) })
            .await
    }
}

fn own_references(files: &SourceFiles, source_set: &SourceSetName) -> LazySet<ReferenceName> {
    let mut sources = Vec::new();

    let loader_files = files.clone();
    let loader_source_set = source_set.clone();
    sources.push(DataSource::new(Priority::High, move || {
        jvm_references(loader_files.clone(), loader_source_set.clone(), JvmReferences::Explicit)
    }));

    if files.module().is_android() {
        let loader_files = files.clone();
        let loader_source_set = source_set.clone();
        sources.push(DataSource::new(Priority::Medium, move || {
            xml_references(loader_files.clone(), loader_source_set.clone())
        }));
    }

    let loader_files = files.clone();
    let loader_source_set = source_set.clone();
    sources.push(DataSource::new(Priority::Low, move || {
        jvm_references(loader_files.clone(), loader_source_set.clone(), JvmReferences::Speculative)
    }));

    LazySet::new(sources)
}

#[derive(Debug, Clone, Copy)]
enum JvmReferences {
    Explicit,
    Speculative,
}

async fn jvm_references(
    files: SourceFiles,
    source_set: SourceSetName,
    kind: JvmReferences,
) -> Result<Vec<ReferenceName>> {
    let jvm = files.jvm_files(&source_set).await?;
    let mut references = BTreeSet::new();
    for file in jvm.iter() {
        match kind {
            JvmReferences::Explicit => references.extend(file.explicit_references()),
            JvmReferences::Speculative => references.extend(file.speculative_references()),
        }
    }
    Ok(references.into_iter().collect())
}

async fn api_references(files: &SourceFiles, source_set: &SourceSetName) -> Result<Arc<Vec<ReferenceName>>> {
    let mut references = BTreeSet::new();
    for name in source_set.with_upstream(files.module()) {
        let jvm = files.jvm_files(&name).await?;
        references.extend(jvm.iter().flat_map(|file| file.public_api_references()));
    }
    Ok(Arc::new(references.into_iter().collect()))
}

async fn xml_references(files: SourceFiles, source_set: SourceSetName) -> Result<Vec<ReferenceName>> {
    files
        .xml_references(&source_set)
        .await
        .map(|references| references.as_ref().clone())
}
