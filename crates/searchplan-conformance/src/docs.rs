//! Seed documents shared by the conformance cases.

use chrono::{DateTime, Duration, TimeZone, Utc};

use searchplan_core::Document;

pub type Seed = (&'static str, Document);

/// Six small documents with one text field each, plus one nested document.
pub fn simple_docs() -> Vec<Seed> {
    vec![
        ("foo1", Document::new().with("foo1", "bar bug")),
        ("foo2", Document::new().with("foo2", "bar")),
        ("bar", Document::new().with("bar", "baz")),
        ("baz", Document::new().with("baz", "foobar")),
        ("fit", Document::new().with("fit", "foo bar bit fit")),
        ("nested bit", Document::new().with("nest.second", "bit").with("nest.third", "lift it up")),
    ]
}

pub fn bool_docs() -> Vec<Seed> {
    vec![
        ("1t", Document::new().with("bar", true)),
        ("2f", Document::new().with("baz", false)),
        ("1f", Document::new().with("bar", false)),
        ("nestedF", Document::new().with("nest.first", false)),
        ("nestedT", Document::new().with("nest.first", true)),
    ]
}

/// Current time without sub-second precision, so every engine stores the
/// exact instant the cases compare against.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_opt(now.timestamp(), 0).single().unwrap_or(now)
}

pub fn date_docs(now: DateTime<Utc>) -> Vec<Seed> {
    let ago = |days: i64| now - Duration::days(days);
    vec![
        ("bar 30 days ago", Document::new().with("bar", ago(30))),
        ("bar 20 days ago", Document::new().with("bar", ago(20))),
        ("bar 10 days ago", Document::new().with("bar", ago(10))),
        ("bar today", Document::new().with("bar", now)),
        ("baz 10 days ago", Document::new().with("baz", ago(10))),
        ("baz today", Document::new().with("baz", now)),
        ("nested 10 days ago", Document::new().with("nested.date", ago(10))),
        ("nested today", Document::new().with("nested.date", now)),
    ]
}

pub fn numeric_docs() -> Vec<Seed> {
    vec![
        ("neg", Document::new().with("n", -3.0)),
        ("zero", Document::new().with("n", 0.0)),
        ("five", Document::new().with("n", 5.0)),
        ("ten", Document::new().with("n", 10.0)),
        ("nested", Document::new().with("nest.n", 7.0)),
        ("text", Document::new().with("other", "x")),
    ]
}

/// Single-token codes, so a term range compares whole values.
pub fn code_docs() -> Vec<Seed> {
    vec![
        ("c1", Document::new().with("code", "1")),
        ("c10", Document::new().with("code", "10")),
        ("c2", Document::new().with("code", "2")),
        ("c20", Document::new().with("code", "20")),
    ]
}

/// Multi-token and mixed-case values; a term range must see the analyzed
/// terms, not the raw strings.
pub fn mixed_case_docs() -> Vec<Seed> {
    vec![
        ("bb", Document::new().with("f", "bar bug")),
        ("u", Document::new().with("f", "Zed")),
        ("al", Document::new().with("f", "Alpha beta")),
    ]
}
