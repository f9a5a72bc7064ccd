//! searchplan-core
//!
//! Engine-neutral query model, canonical search results and the contract a
//! backend implements. Backends live in their own crates (see
//! `searchplan-tantivy`) and prove their matching semantics against
//! `searchplan-conformance`.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod query;
pub mod traits;
pub mod types;

pub use context::Context;
pub use document::{Document, FieldValue};
pub use error::{Error, Result};
pub use query::{
    BoolFieldQuery, BooleanQuery, Boost, Bound, DateRangeQuery, IdsQuery, MatchAllQuery, MatchNoneQuery,
    MatchPhraseQuery, MatchQuery, MultiPhraseQuery, NumericRangeQuery, Operator, PrefixQuery, Query, QueryPlan,
    QueryType, TermQuery, TermRangeQuery, ToQueryPlan, WildcardQuery,
};
pub use traits::{Engine, Index};
pub use types::{Explanation, Hit, SearchRequest, SearchResult, Status};
