//! Canonical search request and result shapes shared by every engine.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::query::Query;

/// Default number of hits returned per request.
pub const DEFAULT_SIZE: usize = 10;

/// Requests every stored leaf in [`SearchRequest::fields`].
pub const ALL_FIELDS: &str = "*";

/// A query plus paging and per-hit options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: Query,
    pub size: usize,
    pub from: usize,
    /// Dotted field paths whose values are returned in [`Hit::fields`].
    pub fields: Vec<String>,
    pub explain: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<Query>) -> Self {
        Self { query: query.into(), size: DEFAULT_SIZE, from: 0, fields: Vec::new(), explain: false }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }
}

/// Segment (or shard) bookkeeping for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    pub total: usize,
    pub failed: usize,
    pub successful: usize,
}

/// Recursive score breakdown. Leaves have no children.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Explanation {
    pub value: f64,
    pub message: String,
    pub children: Vec<Explanation>,
}

impl Explanation {
    /// Number of levels in the tree, counting the root.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Explanation::depth).max().unwrap_or(0)
    }
}

/// One matching document.
///
/// `fields` holds the requested values: strings for text, f64 numbers,
/// booleans, and RFC3339 strings for dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hit {
    pub index: String,
    pub id: String,
    pub score: f64,
    pub sort: Vec<String>,
    pub explanation: Option<Explanation>,
    pub fields: BTreeMap<String, JsonValue>,
}

/// Normalized response. Hits keep the order the engine returned them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    pub status: Option<Status>,
    pub hits: Vec<Hit>,
    pub total: u64,
    pub max_score: f64,
    /// Time spent inside the engine.
    pub took: Duration,
}

impl SearchResult {
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits.is_empty() {
            return write!(f, "0 matches, took {:?}", self.took);
        }
        write!(f, "{} matches, took {:?}", self.hits.len(), self.took)?;
        for (i, h) in self.hits.iter().enumerate() {
            write!(f, "\n\t{}. {} ({:.6})", i + 1, h.id, h.score)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::MatchAllQuery;

    #[test]
    fn request_defaults() {
        let req = SearchRequest::new(MatchAllQuery::new());
        assert_eq!(req.size, DEFAULT_SIZE);
        assert_eq!(req.from, 0);
        assert!(req.fields.is_empty());
        assert!(!req.explain);
    }

    #[test]
    fn display_lists_hits_in_order() {
        let result = SearchResult {
            hits: vec![
                Hit { id: "foo1".into(), score: 2.0, ..Hit::default() },
                Hit { id: "bar".into(), score: 1.0, ..Hit::default() },
            ],
            total: 2,
            max_score: 2.0,
            took: Duration::from_millis(3),
            ..SearchResult::default()
        };
        let text = result.to_string();
        assert!(text.starts_with("2 matches, took 3ms"));
        assert!(text.contains("1. foo1 (2.000000)"));
        assert!(text.contains("2. bar (1.000000)"));
        assert_eq!(SearchResult::default().to_string(), "0 matches, took 0ns");
    }

    #[test]
    fn explanation_depth() {
        let leaf = Explanation { value: 1.0, message: "leaf".into(), children: vec![] };
        let mid = Explanation { value: 1.0, message: "mid".into(), children: vec![leaf.clone()] };
        let root = Explanation { value: 2.0, message: "root".into(), children: vec![mid, leaf] };
        assert_eq!(root.depth(), 3);
    }
}
