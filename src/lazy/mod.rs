//! Prioritized lazy name sets
//!
//! A [`LazySet`] merges several [`DataSource`]s. Each source loads its
//! elements at most once, on first use, and indexes them by name. Lookups
//! visit sources from [`Priority::High`] to [`Priority::Low`] and stop at the
//! first match, so speculative sources are only realized when the explicit
//! ones came up empty.

use crate::context::SafeCache;
use crate::error::Result;
use crate::names::Named;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

type Loader<E> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<E>>> + Send + Sync>;

/// Realized elements of a data source, indexed by name
pub struct NameIndex<E> {
    elements: Vec<E>,
    by_name: HashMap<String, Vec<usize>>,
}

impl<E: Named> NameIndex<E> {
    fn new(elements: Vec<E>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, element) in elements.iter().enumerate() {
            by_name.entry(element.name().to_string()).or_default().push(index);
        }
        Self { elements, by_name }
    }

    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    pub fn named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a E> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(move |&index| &self.elements[index])
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// One lazily loaded source of elements
pub struct DataSource<E> {
    priority: Priority,
    cell: Arc<SafeCache<(), Arc<NameIndex<E>>>>,
    loader: Loader<E>,
}

impl<E> Clone for DataSource<E> {
    fn clone(&self) -> Self {
        Self {
            priority: self.priority,
            cell: Arc::clone(&self.cell),
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<E> fmt::Debug for DataSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("priority", &self.priority)
            .field("realized", &!self.cell.is_empty())
            .finish()
    }
}

impl<E: Named + Send + Sync + 'static> DataSource<E> {
    pub fn new<F, Fut>(priority: Priority, load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<E>>> + Send + 'static,
    {
        Self {
            priority,
            cell: Arc::new(SafeCache::new()),
            loader: Arc::new(move || load().boxed()),
        }
    }

    /// A source whose elements are already known
    pub fn ready(priority: Priority, elements: Vec<E>) -> Self {
        let cell = SafeCache::new();
        cell.insert((), Arc::new(NameIndex::new(elements)));
        Self {
            priority,
            cell: Arc::new(cell),
            loader: Arc::new(|| async { Result::<Vec<E>>::Ok(Vec::new()) }.boxed()),
        }
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_realized(&self) -> bool {
        !self.cell.is_empty()
    }

    /// Load the elements on first call. A failed or cancelled load leaves
    /// the source unrealized.
    pub async fn get(&self) -> Result<Arc<NameIndex<E>>> {
        self.cell
            .get_or_try_init((), || async {
                (self.loader)()
                    .await
                    .map(|elements| Arc::new(NameIndex::new(elements)))
            })
            .await
    }
}

/// Union of prioritized data sources
pub struct LazySet<E> {
    sources: Vec<DataSource<E>>,
}

impl<E> Clone for LazySet<E> {
    fn clone(&self) -> Self {
        Self {
            sources: self.sources.clone(),
        }
    }
}

impl<E> fmt::Debug for LazySet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySet").field("sources", &self.sources).finish()
    }
}

impl<E: Named + Clone + Send + Sync + 'static> LazySet<E> {
    pub fn new(mut sources: Vec<DataSource<E>>) -> Self {
        sources.sort_by_key(DataSource::priority);
        Self { sources }
    }

    pub fn empty() -> Self {
        Self { sources: Vec::new() }
    }

    /// Merge two sets. Sources are shared, so realizing one in the union
    /// realizes it everywhere.
    pub fn union(&self, other: &LazySet<E>) -> LazySet<E> {
        let mut sources = self.sources.clone();
        for source in &other.sources {
            if !sources.iter().any(|s| Arc::ptr_eq(&s.cell, &source.cell)) {
                sources.push(source.clone());
            }
        }
        Self::new(sources)
    }

    /// Sources in lookup order
    pub fn sources(&self) -> &[DataSource<E>] {
        &self.sources
    }

    /// First element named `name` that satisfies `accept`
    pub async fn find(&self, name: &str, accept: impl Fn(&E) -> bool) -> Result<Option<E>> {
        for source in &self.sources {
            let index = source.get().await?;
            let found = index.named(name).find(|e| accept(e)).cloned();
            if let Some(found) = found {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    pub async fn contains_name(&self, name: &str) -> Result<bool> {
        Ok(self.find(name, |_| true).await?.is_some())
    }

    /// Realize every source and collect their elements in priority order
    pub async fn elements(&self) -> Result<Vec<E>> {
        let mut elements = Vec::new();
        for source in &self.sources {
            elements.extend(source.get().await?.elements().iter().cloned());
        }
        Ok(elements)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        for source in &self.sources {
            if !source.get().await?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
