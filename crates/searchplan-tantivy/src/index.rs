use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use searchplan_core::config::IndexMapping;
use searchplan_core::{Context, Document, Error, Index, Result, SearchRequest, SearchResult, ToQueryPlan};

use crate::handle::{ExecuteOptions, TantivyHandle};
use crate::normalize::normalize;

/// Name, storage location and mapping of one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    pub name: String,
    /// Directory holding the index; `None` keeps it in memory.
    pub path: Option<PathBuf>,
    pub mapping: IndexMapping,
}

impl IndexConfig {
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self { name: name.into(), path: None, mapping: IndexMapping::default() }
    }

    pub fn on_disk(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), path: Some(path.into()), mapping: IndexMapping::default() }
    }

    pub fn with_mapping(mut self, mapping: IndexMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub(crate) fn setup(&self) -> Result<TantivyHandle> {
        if self.name.is_empty() {
            return Err(Error::InvalidConfig("index name must not be empty".into()));
        }
        if self.mapping.default_field.is_empty() {
            return Err(Error::InvalidConfig(format!("index {:?} has an empty default_field", self.name)));
        }
        TantivyHandle::open(self.path.as_deref(), &self.mapping)
    }
}

/// Handle to one named index of a [`crate::TantivyEngine`].
///
/// Handles for names the engine does not know are still returned; every
/// operation on them fails with [`Error::UnknownIndex`].
#[derive(Clone)]
pub struct TantivyIndex {
    name: String,
    handle: Option<Arc<TantivyHandle>>,
}

impl TantivyIndex {
    pub(crate) fn bound(name: &str, handle: Arc<TantivyHandle>) -> Self {
        Self { name: name.to_string(), handle: Some(handle) }
    }

    pub(crate) fn unknown(name: &str) -> Self {
        Self { name: name.to_string(), handle: None }
    }

    fn handle(&self, ctx: &Context) -> Result<&TantivyHandle> {
        let handle = self.handle.as_deref().ok_or_else(|| Error::UnknownIndex(self.name.clone()))?;
        ctx.check()?;
        Ok(handle)
    }
}

impl Index for TantivyIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn index(&self, ctx: &Context, id: &str, document: &Document) -> Result<()> {
        self.handle(ctx)?.submit(id, document)
    }

    fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        self.handle(ctx)?.remove(id)
    }

    fn count(&self, ctx: &Context) -> Result<u64> {
        Ok(self.handle(ctx)?.num_docs())
    }

    fn search_request(&self, ctx: &Context, request: &SearchRequest) -> Result<SearchResult> {
        let handle = self.handle(ctx)?;
        let query = handle.compiler().compile(&request.query)?;
        let options = ExecuteOptions {
            size: request.size,
            from: request.from,
            explain: request.explain,
            load_source: !request.fields.is_empty(),
        };
        let response = handle.execute(query.as_ref(), options)?;
        debug!(index = %self.name, query_type = %request.query.query_plan().query_type, total = response.total, took = ?response.took, "search executed");
        Ok(normalize(&self.name, response, &request.fields))
    }
}
