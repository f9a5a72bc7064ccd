use std::thread;

use chrono::Duration;

use searchplan_core::types::ALL_FIELDS;
use searchplan_core::{
    BoolFieldQuery, BooleanQuery, Context, DateRangeQuery, Document, Engine, Error, IdsQuery, Index, MatchAllQuery,
    MatchNoneQuery, MatchPhraseQuery, MatchQuery, MultiPhraseQuery, NumericRangeQuery, Operator, PrefixQuery, Query,
    SearchRequest, SearchResult, TermQuery, TermRangeQuery, ToQueryPlan,
};

use crate::{assert_hits, assert_ranked, ctx, docs, Fixture, InitFn};

#[track_caller]
fn expect_hits<E: Engine>(fx: &Fixture<E>, case: &str, query: impl Into<Query>, expected: &[&str]) -> SearchResult {
    let result = fx.search(query);
    assert_hits(case, &result, expected);
    result
}

pub fn bool_field_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::bool_docs());

    expect_hits(&fx, "basic true", BoolFieldQuery::new(true), &["1t", "nestedT"]);
    expect_hits(&fx, "basic false", BoolFieldQuery::new(false), &["1f", "2f", "nestedF"]);
    expect_hits(&fx, "nested true", BoolFieldQuery::new(true).with_field("nest.first"), &["nestedT"]);
    expect_hits(&fx, "nested false", BoolFieldQuery::new(false).with_field("nest.first"), &["nestedF"]);
}

pub fn date_range_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    let now = docs::now();
    fx.seed(docs::date_docs(now));
    let days = Duration::days;

    expect_hits(
        &fx,
        "30 day range",
        DateRangeQuery::new(now - days(31), now + days(1)),
        &[
            "bar 30 days ago",
            "bar 20 days ago",
            "bar 10 days ago",
            "bar today",
            "baz 10 days ago",
            "baz today",
            "nested 10 days ago",
            "nested today",
        ],
    );
    let start_included = ["bar 30 days ago", "bar 20 days ago", "bar 10 days ago", "baz 10 days ago", "nested 10 days ago"];
    expect_hits(&fx, "inclusive start and exclusive end by default", DateRangeQuery::new(now - days(30), now), &start_included);
    expect_hits(
        &fx,
        "explicit inclusive start and exclusive end",
        DateRangeQuery::new(now - days(30), now).with_inclusive_start(true).with_inclusive_end(false),
        &start_included,
    );
    expect_hits(
        &fx,
        "exclusive start and end",
        DateRangeQuery::new(now - days(30), now).with_inclusive_start(false).with_inclusive_end(false),
        &["bar 20 days ago", "bar 10 days ago", "baz 10 days ago", "nested 10 days ago"],
    );
    expect_hits(
        &fx,
        "nested exclusive end",
        DateRangeQuery::new(now - days(30), now).with_field("nested.date"),
        &["nested 10 days ago"],
    );
    expect_hits(
        &fx,
        "nested inclusive end",
        DateRangeQuery::new(now - days(30), now).with_field("nested.date").with_inclusive_end(true),
        &["nested 10 days ago", "nested today"],
    );
    expect_hits(
        &fx,
        "open end",
        DateRangeQuery::unbounded().with_start(now - days(15)),
        &["bar 10 days ago", "bar today", "baz 10 days ago", "baz today", "nested 10 days ago", "nested today"],
    );
}

/// Only field values are searchable: `Match("foo1")` misses the document
/// `{"foo1": "bar bug"}` even though its key is `foo1`. Engines that index
/// keys into the default field diverge here on purpose.
pub fn match_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    expect_hits(&fx, "basic bar", MatchQuery::new("bar"), &["foo2", "foo1", "fit"]);
    expect_hits(&fx, "basic foobar", MatchQuery::new("foobar"), &["baz"]);
    let multiple = expect_hits(&fx, "multiple", MatchQuery::new("foobar bar foo"), &["fit", "baz", "foo2", "foo1"]);
    assert_ranked("multiple", &multiple);
    expect_hits(&fx, "nested field", MatchQuery::new("bit").with_field("nest.second"), &["nested bit"]);
    expect_hits(&fx, "field keys are not searchable", MatchQuery::new("foo1"), &[]);
    expect_hits(&fx, "fuzzy 1 off", MatchQuery::new("fobar").with_fuzziness(1), &["baz"]);
    expect_hits(&fx, "fuzzy with prefix", MatchQuery::new("fooba").with_prefix_length(4).with_fuzziness(1), &["baz"]);
    expect_hits(&fx, "fuzzy without prefix", MatchQuery::new("xoobar").with_fuzziness(1), &["baz"]);
    expect_hits(&fx, "fuzzy prefix is exact", MatchQuery::new("xoobar").with_prefix_length(1).with_fuzziness(1), &[]);
}

/// The exact prefix and the fuzzy remainder must come from one term.
pub fn fuzzy_prefix_within_one_term<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed([("d", Document::new().with("a", "foobar xylo"))]);

    let query = |text: &str| MatchQuery::new(text).with_prefix_length(1).with_fuzziness(1);
    expect_hits(&fx, "prefix from another term", query("xoobar"), &[]);
    expect_hits(&fx, "prefix and remainder on one term", query("foobaz"), &["d"]);
    expect_hits(&fx, "remainder off by one", query("xyla"), &["d"]);
    expect_hits(&fx, "prefix longer than the token", MatchQuery::new("xy").with_prefix_length(4).with_fuzziness(2), &["d"]);
}

pub fn match_query_operator<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    expect_hits(&fx, "or by default", MatchQuery::new("foo bar"), &["foo1", "foo2", "fit"]);
    expect_hits(&fx, "and", MatchQuery::new("foo bar").with_operator(Operator::And), &["fit"]);
}

pub fn match_all_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    let seeds = docs::simple_docs();
    let ids: Vec<&str> = seeds.iter().map(|(id, _)| *id).collect();
    fx.seed(seeds.clone());

    let result = expect_hits(&fx, "basic match all", MatchAllQuery::new(), &ids);
    assert_eq!(result.total, ids.len() as u64);
    let count = fx.index().count(&ctx()).unwrap_or_else(|e| panic!("count failed: {e}"));
    assert_eq!(count, ids.len() as u64);
}

pub fn match_none_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    let result = expect_hits(&fx, "basic match none", MatchNoneQuery::new(), &[]);
    assert_eq!(result.total, 0);
}

pub fn match_phrase_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    expect_hits(&fx, "basic phrase", MatchPhraseQuery::new("bar bug"), &["foo1"]);
    expect_hits(&fx, "order matters", MatchPhraseQuery::new("bug bar"), &[]);
    expect_hits(&fx, "terms must be adjacent", MatchPhraseQuery::new("foo bit"), &[]);
    expect_hits(&fx, "inside a longer value", MatchPhraseQuery::new("bar bit"), &["fit"]);
    expect_hits(&fx, "trailing space", MatchPhraseQuery::new("lift it ").with_field("nest.third"), &["nested bit"]);
    expect_hits(&fx, "stop word gap", MatchPhraseQuery::new("lift it up").with_field("nest.third"), &["nested bit"]);
}

pub fn multi_phrase_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    expect_hits(&fx, "alternatives", MultiPhraseQuery::new([vec!["bar"], vec!["bug", "bit"]]), &["foo1", "fit"]);
    expect_hits(&fx, "three positions", MultiPhraseQuery::new([vec!["foo"], vec!["bar"], vec!["bit", "baz"]]), &["fit"]);
    expect_hits(&fx, "no alternative adjacent", MultiPhraseQuery::new([vec!["bug"], vec!["bar", "foo"]]), &[]);
}

pub fn numeric_range_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::numeric_docs());

    expect_hits(&fx, "min zero is inclusive", NumericRangeQuery::new(Some(0.0), None).with_field("n"), &["zero", "five", "ten"]);
    expect_hits(
        &fx,
        "exclusive min",
        NumericRangeQuery::new(Some(0.0), None).with_inclusive_min(false).with_field("n"),
        &["five", "ten"],
    );
    expect_hits(&fx, "max is exclusive", NumericRangeQuery::new(None, Some(5.0)).with_field("n"), &["neg", "zero"]);
    expect_hits(
        &fx,
        "inclusive max",
        NumericRangeQuery::new(None, Some(5.0)).with_inclusive_max(true).with_field("n"),
        &["neg", "zero", "five"],
    );
    expect_hits(&fx, "max zero is a bound", NumericRangeQuery::new(None, Some(0.0)).with_field("n"), &["neg"]);
    expect_hits(&fx, "default field", NumericRangeQuery::new(Some(0.0), Some(8.0)), &["zero", "five", "nested"]);
    expect_hits(&fx, "nested field", NumericRangeQuery::new(Some(0.0), None).with_field("nest.n"), &["nested"]);
}

pub fn term_range_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::code_docs());

    expect_hits(&fx, "nothing above min", TermRangeQuery::new("3", "").with_field("code"), &[]);
    expect_hits(&fx, "open max", TermRangeQuery::new("2", "").with_field("code"), &["c2", "c20"]);
    expect_hits(
        &fx,
        "exclusive min",
        TermRangeQuery::new("2", "").with_inclusive_min(false).with_field("code"),
        &["c20"],
    );
    expect_hits(&fx, "max is exclusive", TermRangeQuery::new("1", "2").with_field("code"), &["c1", "c10"]);
    expect_hits(
        &fx,
        "inclusive max",
        TermRangeQuery::new("1", "2").with_inclusive_max(true).with_field("code"),
        &["c1", "c10", "c2"],
    );
}

pub fn term_range_over_terms<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::mixed_case_docs());

    expect_hits(&fx, "second token in range", TermRangeQuery::new("bug", "c").with_inclusive_max(true).with_field("f"), &["bb"]);
    expect_hits(&fx, "lowercased term", TermRangeQuery::new("y", "").with_field("f"), &["u"]);
    expect_hits(&fx, "first token in range", TermRangeQuery::new("b", "bat").with_field("f"), &["bb"]);
    expect_hits(&fx, "bounds are not analyzed", TermRangeQuery::new("Zed", "").with_field("f"), &["bb", "u", "al"]);
    expect_hits(&fx, "whole value is not a term", TermRangeQuery::new("bar bug", "bar bug").with_inclusive_max(true).with_field("f"), &[]);
    expect_hits(&fx, "default field", TermRangeQuery::new("alpha", "alpha").with_inclusive_max(true), &["al"]);
}

pub fn term_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    expect_hits(&fx, "exact token", TermQuery::new("bar"), &["foo1", "foo2", "fit"]);
    expect_hits(&fx, "not analyzed", TermQuery::new("Bar"), &[]);
    expect_hits(&fx, "whole values are not terms", TermQuery::new("lift it up"), &[]);
    expect_hits(&fx, "nested field", TermQuery::new("bit").with_field("nest.second"), &["nested bit"]);
}

pub fn prefix_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    expect_hits(&fx, "default field", PrefixQuery::new("foo"), &["baz", "fit"]);
    expect_hits(&fx, "nested field", PrefixQuery::new("lif").with_field("nest.third"), &["nested bit"]);
    expect_hits(&fx, "no match", PrefixQuery::new("zz"), &[]);
}

pub fn ids_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    expect_hits(&fx, "known and missing ids", IdsQuery::new(["foo1", "bar", "missing"]), &["foo1", "bar"]);
    expect_hits(&fx, "id with a space", IdsQuery::new(["nested bit"]), &["nested bit"]);
    expect_hits(&fx, "no ids", IdsQuery::new(Vec::<String>::new()), &[]);
}

pub fn boolean_query<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    expect_hits(
        &fx,
        "must and must not",
        BooleanQuery::new().with_must(MatchQuery::new("bar")).with_must_not(MatchQuery::new("bug")),
        &["foo2", "fit"],
    );
    expect_hits(
        &fx,
        "should only",
        BooleanQuery::new().with_should(MatchQuery::new("foobar")).with_should(MatchQuery::new("bit")),
        &["baz", "fit", "nested bit"],
    );
    let ranked = expect_hits(
        &fx,
        "should raises score",
        BooleanQuery::new().with_must(TermQuery::new("bar")).with_should(TermQuery::new("fit")),
        &["foo1", "foo2", "fit"],
    );
    assert_ranked("should raises score", &ranked);
    assert_eq!(ranked.ids().first().copied(), Some("fit"), "should raises score: top hit");
    expect_hits(
        &fx,
        "nested boolean",
        BooleanQuery::new()
            .with_must(BooleanQuery::new().with_should(TermQuery::new("foobar")).with_should(TermQuery::new("bug")))
            .with_must_not(IdsQuery::new(["foo1"])),
        &["baz"],
    );
    expect_hits(&fx, "empty boolean", BooleanQuery::new(), &[]);
}

pub fn boost_scales_scores<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    let plain = expect_hits(&fx, "unboosted", TermQuery::new("foobar"), &["baz"]);
    let boosted = expect_hits(&fx, "boosted", TermQuery::new("foobar").with_boost(2.0), &["baz"]);
    let (plain, boosted) = (plain.hits[0].score, boosted.hits[0].score);
    assert!(plain > 0.0, "unboosted score must be positive");
    assert!((boosted - 2.0 * plain).abs() <= 1e-4 * boosted, "boost 2 scaled {plain} to {boosted}");

    let zero = expect_hits(&fx, "zero boost still matches", TermQuery::new("foobar").with_boost(0.0), &["baz"]);
    assert!(zero.hits[0].score.abs() < 1e-9, "zero boost must zero the score");
}

pub fn explanations_follow_request<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    let explained = fx.search_request(SearchRequest::new(MatchQuery::new("bar")).with_explain(true));
    assert_hits("explained", &explained, &["foo1", "foo2", "fit"]);
    for hit in &explained.hits {
        let Some(explanation) = &hit.explanation else {
            panic!("hit {} has no explanation", hit.id);
        };
        assert!(explanation.depth() >= 1);
        assert!(
            (explanation.value - hit.score).abs() <= 1e-3 * hit.score.max(1.0),
            "explanation value {} differs from score {}",
            explanation.value,
            hit.score
        );
    }

    let plain = fx.search(MatchQuery::new("bar"));
    assert!(plain.hits.iter().all(|h| h.explanation.is_none()));
}

pub fn requested_fields<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());
    let query = TermQuery::new("bit").with_field("nest.second");

    let one = fx.search_request(SearchRequest::new(query.clone()).with_fields(["nest.second", "missing"]));
    assert_hits("one field", &one, &["nested bit"]);
    let fields = &one.hits[0].fields;
    assert_eq!(fields.len(), 1);
    assert_eq!(fields.get("nest.second").and_then(|v| v.as_str()), Some("bit"));

    let all = fx.search_request(SearchRequest::new(query.clone()).with_fields([ALL_FIELDS]));
    let keys: Vec<&str> = all.hits[0].fields.keys().map(String::as_str).collect();
    assert_eq!(keys, ["nest.second", "nest.third"]);

    let none = fx.search(query);
    assert!(none.hits[0].fields.is_empty());
}

pub fn paging<E: Engine>(init: InitFn<E>) {
    let fx = init();
    let seeds = docs::simple_docs();
    let total = seeds.len();
    fx.seed(seeds);

    let mut seen = Vec::new();
    for page in 0..3 {
        let result = fx.search_request(SearchRequest::new(MatchAllQuery::new()).with_size(2).with_from(page * 2));
        assert_eq!(result.hits.len(), 2, "page {page}");
        assert_eq!(result.total, total as u64, "page {page} total");
        seen.extend(result.hits.into_iter().map(|h| h.id));
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), total, "pages overlap");

    let tail = fx.search_request(SearchRequest::new(MatchAllQuery::new()).with_from(4));
    assert_eq!(tail.hits.len(), total - 4);
    let counted = fx.search_request(SearchRequest::new(MatchAllQuery::new()).with_size(0));
    assert!(counted.is_empty());
    assert_eq!(counted.total, total as u64);

    let everything = fx.search_request(SearchRequest::new(MatchAllQuery::new()).with_size(usize::MAX));
    assert_eq!(everything.hits.len(), total);
    let beyond = fx.search_request(SearchRequest::new(MatchAllQuery::new()).with_size(usize::MAX).with_from(usize::MAX));
    assert!(beyond.is_empty());
    assert_eq!(beyond.total, total as u64);
}

pub fn upsert_and_delete<E: Engine>(init: InitFn<E>) {
    let fx = init();
    let index = fx.index();
    let ctx = ctx();
    fx.seed([("a", Document::new().with("name", "first"))]);
    fx.seed([("a", Document::new().with("name", "second"))]);

    assert_eq!(index.count(&ctx).ok(), Some(1));
    expect_hits(&fx, "replaced value", MatchQuery::new("first"), &[]);
    expect_hits(&fx, "new value", MatchQuery::new("second"), &["a"]);

    assert!(index.delete(&ctx, "a").is_ok());
    assert!(index.delete(&ctx, "a").is_ok(), "deleting a missing id");
    assert_eq!(index.count(&ctx).ok(), Some(0));
    expect_hits(&fx, "deleted", MatchQuery::new("second"), &[]);
}

pub fn zero_hits_is_success<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::simple_docs());

    let result = expect_hits(&fx, "no match", MatchQuery::new("nothingmatcheshere"), &[]);
    assert_eq!(result.total, 0);
    assert_eq!(result.max_score, 0.0);
    assert!(result.to_string().starts_with("0 matches"));
}

pub fn invalid_queries_are_errors<E: Engine>(init: InitFn<E>) {
    let fx = init();
    fx.seed(docs::numeric_docs());
    let index = fx.index();

    let invalid: [Query; 3] = [
        NumericRangeQuery::new(None, None).into(),
        TermRangeQuery::new("", "").into(),
        MatchQuery::new("x").with_boost(-1.0).into(),
    ];
    for query in invalid {
        let result = index.search(&ctx(), &query);
        assert!(matches!(result, Err(Error::InvalidQuery(_))), "{query:?} gave {result:?}");
    }
}

pub fn unknown_index_latches_error<E: Engine>(init: InitFn<E>) {
    let fx = init();
    let missing = fx.engine.index("does-not-exist");
    let ctx = ctx();

    assert_eq!(missing.name(), "does-not-exist");
    for _ in 0..2 {
        let result = missing.search(&ctx, &MatchAllQuery::new().into());
        assert!(matches!(result, Err(Error::UnknownIndex(ref name)) if name == "does-not-exist"));
    }
    assert!(matches!(missing.index(&ctx, "a", &Document::new().with("a", "b")), Err(Error::UnknownIndex(_))));
    assert!(matches!(missing.count(&ctx), Err(Error::UnknownIndex(_))));

    let names: Vec<String> = fx.engine.indices().iter().map(|i| i.name().to_string()).collect();
    assert!(names.contains(&fx.index_name));
    assert!(!names.iter().any(|n| n == "does-not-exist"));
}

pub fn cancelled_context<E: Engine>(init: InitFn<E>) {
    let fx = init();
    let index = fx.index();
    let query: Query = MatchAllQuery::new().into();

    let cancelled = Context::background();
    cancelled.cancel();
    assert!(matches!(index.search(&cancelled, &query), Err(Error::Cancelled)));
    assert!(matches!(index.index(&cancelled, "a", &Document::new().with("a", "b")), Err(Error::Cancelled)));

    let expired = Context::with_deadline(std::time::Instant::now());
    assert!(matches!(index.search(&expired, &query), Err(Error::DeadlineExceeded)));

    assert_eq!(index.count(&ctx()).ok(), Some(0), "cancelled write must not land");
}

pub fn concurrent_index_and_search<E: Engine>(init: InitFn<E>) {
    const WRITERS: usize = 4;
    const DOCS_PER_WRITER: usize = 10;

    let fx = init();
    let engine = &fx.engine;
    let name = fx.index_name.as_str();
    let query: Query = MatchAllQuery::new().into();
    let plan = query.query_plan();

    thread::scope(|s| {
        for w in 0..WRITERS {
            s.spawn(move || {
                let index = engine.index(name);
                for i in 0..DOCS_PER_WRITER {
                    let doc = Document::new().with("writer", w as f64).with("body", format!("doc {i}"));
                    if let Err(e) = index.index(&ctx(), &format!("w{w}-{i}"), &doc) {
                        panic!("writer {w}: {e}");
                    }
                }
            });
        }
        for _ in 0..WRITERS {
            let query = &query;
            s.spawn(move || {
                let index = engine.index(name);
                for _ in 0..DOCS_PER_WRITER {
                    if let Err(e) = index.search(&ctx(), query) {
                        panic!("concurrent search: {e}");
                    }
                }
            });
        }
    });

    assert_eq!(query.query_plan(), plan, "plans must not depend on engine state");
    let result = fx.search_request(SearchRequest::new(query).with_size(WRITERS * DOCS_PER_WRITER));
    assert_eq!(result.total, (WRITERS * DOCS_PER_WRITER) as u64);
}
