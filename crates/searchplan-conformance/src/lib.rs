//! searchplan-conformance
//!
//! Behavioral checks every searchplan engine must pass. A backend supplies
//! a function that builds a [`Fixture`] around a fresh, empty index and
//! expands [`conformance_tests!`] with it:
//!
//! ```ignore
//! fn init() -> searchplan_conformance::Fixture<MyEngine> { /* ... */ }
//! searchplan_conformance::conformance_tests!(init);
//! ```
//!
//! Each case seeds its own documents, so every case gets a new fixture.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

use std::any::Any;
use std::time::Duration;

use searchplan_core::{Context, Document, Engine, Index, Query, SearchRequest, SearchResult};

mod cases;
pub mod docs;

pub use cases::*;

/// Builds a fixture around a new, empty index.
pub type InitFn<E> = fn() -> Fixture<E>;

/// An engine plus the name of the index the cases run against.
pub struct Fixture<E: Engine> {
    pub engine: E,
    pub index_name: String,
    // Dropped after the engine, e.g. a temporary directory.
    _guard: Option<Box<dyn Any>>,
}

impl<E: Engine> Fixture<E> {
    pub fn new(engine: E, index_name: impl Into<String>) -> Self {
        Self { engine, index_name: index_name.into(), _guard: None }
    }

    /// Keeps `guard` alive until the fixture is dropped.
    pub fn with_guard<G: Any>(mut self, guard: G) -> Self {
        self._guard = Some(Box::new(guard));
        self
    }

    pub fn index(&self) -> E::Index {
        self.engine.index(&self.index_name)
    }

    pub fn seed<'a>(&self, docs: impl IntoIterator<Item = (&'a str, Document)>) {
        let index = self.index();
        let ctx = ctx();
        for (id, doc) in docs {
            if let Err(e) = index.index(&ctx, id, &doc) {
                panic!("indexing {id:?} into {:?} failed: {e}", self.index_name);
            }
        }
    }

    pub fn search(&self, query: impl Into<Query>) -> SearchResult {
        self.search_request(SearchRequest::new(query))
    }

    pub fn search_request(&self, request: SearchRequest) -> SearchResult {
        match self.index().search_request(&ctx(), &request) {
            Ok(result) => result,
            Err(e) => panic!("search {:?} failed: {e}", request.query),
        }
    }
}

/// Per-call context with a generous deadline.
pub fn ctx() -> Context {
    Context::with_timeout(Duration::from_secs(30))
}

/// Hits must be exactly `expected`, in any order. Engines break score ties
/// differently, so order is checked separately where scores differ.
#[track_caller]
pub fn assert_hits(case: &str, result: &SearchResult, expected: &[&str]) {
    let mut got = result.ids();
    got.sort_unstable();
    let mut want = expected.to_vec();
    want.sort_unstable();
    assert_eq!(got, want, "{case}: unexpected hits");
}

/// Scores must never increase down the hit list.
#[track_caller]
pub fn assert_ranked(case: &str, result: &SearchResult) {
    for pair in result.hits.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "{case}: {} ({}) ranked above {} ({})",
            pair[0].id,
            pair[0].score,
            pair[1].id,
            pair[1].score
        );
    }
}

/// Expands to one `#[test]` per conformance case, each calling `$init` for
/// a fresh fixture.
#[macro_export]
macro_rules! conformance_tests {
    ($init:path) => {
        $crate::conformance_tests!(@cases $init;
            bool_field_query,
            date_range_query,
            match_query,
            fuzzy_prefix_within_one_term,
            match_query_operator,
            match_all_query,
            match_none_query,
            match_phrase_query,
            multi_phrase_query,
            numeric_range_query,
            term_range_query,
            term_range_over_terms,
            term_query,
            prefix_query,
            ids_query,
            boolean_query,
            boost_scales_scores,
            explanations_follow_request,
            requested_fields,
            paging,
            upsert_and_delete,
            zero_hits_is_success,
            invalid_queries_are_errors,
            unknown_index_latches_error,
            cancelled_context,
            concurrent_index_and_search,
        );
    };
    (@cases $init:path; $($case:ident),* $(,)?) => {
        $(
            #[test]
            fn $case() {
                $crate::$case($init);
            }
        )*
    };
}
