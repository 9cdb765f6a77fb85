use super::android_resources::AndroidResourceDeclaredNames;
use crate::context::{Key, Project, SafeCache};
use crate::error::Result;
use crate::model::{Module, SourceSetName};
use crate::names::{DeclaredName, ReferenceName};
use crate::symbols::{JvmFile, SymbolProvider};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

/// Symbol tables of each source set, fetched from the provider once
#[derive(Default)]
pub struct JvmFiles {
    cache: SafeCache<SourceSetName, Arc<Vec<Arc<JvmFile>>>>,
}

impl Key for JvmFiles {
    type Element = Self;

    fn construct(_project: Project) -> BoxFuture<'static, Result<Self>> {
        async { Ok(Self::default()) }.boxed()
    }
}

impl JvmFiles {
    pub async fn get(
        &self,
        symbols: &Arc<dyn SymbolProvider>,
        module: &Module,
        source_set: &SourceSetName,
    ) -> Result<Arc<Vec<Arc<JvmFile>>>> {
        self.cache
            .get_or_try_init(source_set.clone(), || async {
                symbols.jvm_files(module, source_set).await.map(Arc::new)
            })
            .await
    }
}

/// The inputs of one module that lazy loaders read from.
///
/// Holds the per-module file caches but not the engine, so a loader that
/// outlives its construction never keeps the module graph alive.
#[derive(Clone)]
pub struct SourceFiles {
    module: Arc<Module>,
    symbols: Arc<dyn SymbolProvider>,
    jvm: Arc<JvmFiles>,
    android: Arc<AndroidResourceDeclaredNames>,
}

impl SourceFiles {
    pub async fn of(project: &Project) -> Result<Self> {
        Ok(Self {
            module: Arc::clone(project.module()),
            symbols: Arc::clone(project.engine().symbols()),
            jvm: project.get::<JvmFiles>().await?,
            android: project.get::<AndroidResourceDeclaredNames>().await?,
        })
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    pub async fn jvm_files(&self, source_set: &SourceSetName) -> Result<Arc<Vec<Arc<JvmFile>>>> {
        self.jvm.get(&self.symbols, &self.module, source_set).await
    }

    pub async fn resource_names(&self, source_set: &SourceSetName) -> Result<Arc<Vec<DeclaredName>>> {
        self.android.get(&self.module, source_set).await
    }

    pub async fn xml_references(&self, source_set: &SourceSetName) -> Result<Arc<Vec<ReferenceName>>> {
        self.android.references(&self.module, source_set).await
    }
}

/// Source declarations of one source set
pub(crate) async fn source_declarations(files: SourceFiles, source_set: SourceSetName) -> Result<Vec<DeclaredName>> {
    let jvm = files.jvm_files(&source_set).await?;
    Ok(jvm.iter().flat_map(|file| file.declarations.iter().cloned()).collect())
}
