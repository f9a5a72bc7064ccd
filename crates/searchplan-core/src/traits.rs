use crate::context::Context;
use crate::document::Document;
use crate::error::Result;
use crate::query::Query;
use crate::types::{SearchRequest, SearchResult};

/// A set of named indices opened once at construction.
///
/// The name mapping never changes afterwards, so lookups from several
/// threads need no locking.
pub trait Engine: Send + Sync {
    type Index: Index;

    /// Handle bound to `name`. Unknown names still yield a handle; every
    /// operation on it returns [`crate::Error::UnknownIndex`].
    fn index(&self, name: &str) -> Self::Index;

    /// Every bound index, in no particular order.
    fn indices(&self) -> Vec<Self::Index>;
}

/// One named index.
pub trait Index: Send + Sync {
    fn name(&self) -> &str;

    /// Submits (or replaces) the document stored under `id`.
    fn index(&self, ctx: &Context, id: &str, document: &Document) -> Result<()>;

    /// Removes the document stored under `id`; missing ids are not an error.
    fn delete(&self, ctx: &Context, id: &str) -> Result<()>;

    /// Number of searchable documents.
    fn count(&self, ctx: &Context) -> Result<u64>;

    fn search_request(&self, ctx: &Context, request: &SearchRequest) -> Result<SearchResult>;

    /// Runs `query` with default paging. A query that matches nothing is a
    /// successful, empty result.
    fn search(&self, ctx: &Context, query: &Query) -> Result<SearchResult> {
        self.search_request(ctx, &SearchRequest::new(query.clone()))
    }
}
