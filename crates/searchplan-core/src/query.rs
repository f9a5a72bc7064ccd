//! Engine-neutral query model.
//!
//! Every query variant is a small builder struct. All of them lower to the
//! same flattened [`QueryPlan`], which is what backend compilers consume.
//! [`Query`] is the closed union of the variants and is what nested
//! boolean clauses and the search entry points carry around.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// Range queries include the lower bound unless told otherwise.
pub const DEFAULT_INCLUSIVE_MIN: bool = true;
/// Range queries exclude the upper bound unless told otherwise.
pub const DEFAULT_INCLUSIVE_MAX: bool = false;

/// Discriminant of a [`QueryPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Boolean,
    BoolField,
    DateRange,
    Ids,
    Match,
    MatchAll,
    MatchNone,
    MatchPhrase,
    MultiPhrase,
    NumericRange,
    Prefix,
    Term,
    TermRange,
    Wildcard,
}

impl QueryType {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Boolean => "boolean",
            QueryType::BoolField => "bool_field",
            QueryType::DateRange => "date_range",
            QueryType::Ids => "ids",
            QueryType::Match => "match",
            QueryType::MatchAll => "match_all",
            QueryType::MatchNone => "match_none",
            QueryType::MatchPhrase => "match_phrase",
            QueryType::MultiPhrase => "multi_phrase",
            QueryType::NumericRange => "numeric_range",
            QueryType::Prefix => "prefix",
            QueryType::Term => "term",
            QueryType::TermRange => "term_range",
            QueryType::Wildcard => "wildcard",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiplicative score weight. Plans carry `Option<Boost>`: `None` leaves
/// the engine default alone, `Some(Boost(0.0))` is an explicit zero weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Boost(f64);

impl Boost {
    pub fn new(value: f64) -> Self {
        Boost(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Boost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// How the analyzed terms of a match query combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Document must satisfy at least one of the term searches.
    #[default]
    Or,
    /// Document must satisfy all of the term searches.
    And,
}

/// One end of a range. The concrete kind depends on the query type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    #[default]
    Unbounded,
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
}

impl Bound {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Bound::Unbounded)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Bound::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Bound::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Bound::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<Option<f64>> for Bound {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Bound::Unbounded, Bound::Number)
    }
}

impl From<Option<DateTime<Utc>>> for Bound {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Bound::Unbounded, Bound::Date)
    }
}

impl From<Option<String>> for Bound {
    fn from(value: Option<String>) -> Self {
        value.map_or(Bound::Unbounded, Bound::Text)
    }
}

/// Canonical, type-erased form every query variant lowers to.
///
/// `query_type` decides which of the other fields mean anything; the rest
/// keep their defaults. Plans are produced by the variant builders only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct QueryPlan {
    pub query_type: QueryType,

    pub should: Vec<Query>,
    pub must: Vec<Query>,
    pub must_not: Vec<Query>,

    pub analyzer: Option<String>,
    pub boost: Option<Boost>,
    /// Dotted path of the target field; `None` is the default field.
    pub field: Option<String>,
    pub bool_value: bool,

    pub matches: Vec<String>,
    pub fuzziness: u8,
    pub operator: Operator,
    /// Leading characters excluded from fuzzy matching.
    pub prefix_length: usize,

    pub terms: Vec<Vec<String>>,

    pub min: Bound,
    pub max: Bound,
    pub inclusive_min: bool,
    pub inclusive_max: bool,
}

impl QueryPlan {
    fn new(query_type: QueryType) -> Self {
        QueryPlan {
            query_type,
            should: Vec::new(),
            must: Vec::new(),
            must_not: Vec::new(),
            analyzer: None,
            boost: None,
            field: None,
            bool_value: false,
            matches: Vec::new(),
            fuzziness: 0,
            operator: Operator::Or,
            prefix_length: 0,
            terms: Vec::new(),
            min: Bound::Unbounded,
            max: Bound::Unbounded,
            inclusive_min: DEFAULT_INCLUSIVE_MIN,
            inclusive_max: DEFAULT_INCLUSIVE_MAX,
        }
    }

    fn with_common(mut self, field: &Option<String>, boost: Option<Boost>) -> Self {
        self.field = field.clone();
        self.boost = boost;
        self
    }

    /// Boost to apply, resolving the unset state to the 1.0 default.
    pub fn boost_value(&self) -> f64 {
        self.boost.map_or(1.0, Boost::value)
    }

    /// First match string; single-term variants always carry exactly one.
    pub fn first_match(&self) -> Result<&str> {
        self.matches
            .first()
            .map(String::as_str)
            .ok_or_else(|| Error::invalid_query(format!("{} query has no match text", self.query_type)))
    }

    /// Checks the constraints a backend can rely on, recursing into
    /// boolean clauses. Empty boolean clause lists are accepted.
    pub fn validate(&self) -> Result<()> {
        if let Some(boost) = self.boost {
            if !boost.value().is_finite() || boost.value() < 0.0 {
                return Err(Error::invalid_query(format!("boost must be a non-negative finite number, got {boost}")));
            }
        }
        match self.query_type {
            QueryType::Boolean => {
                for clause in self.must.iter().chain(&self.should).chain(&self.must_not) {
                    clause.query_plan().validate()?;
                }
            }
            QueryType::Match | QueryType::MatchPhrase | QueryType::Term | QueryType::Prefix | QueryType::Wildcard => {
                self.first_match()?;
            }
            QueryType::NumericRange => {
                if self.min.is_unbounded() && self.max.is_unbounded() {
                    return Err(Error::invalid_query("numeric range query must specify min or max"));
                }
            }
            QueryType::TermRange => {
                if self.min.is_unbounded() && self.max.is_unbounded() {
                    return Err(Error::invalid_query("term range query must specify min or max"));
                }
            }
            QueryType::DateRange => {
                if self.min.is_unbounded() && self.max.is_unbounded() {
                    return Err(Error::invalid_query("date range query must specify at least one of start/end"));
                }
            }
            QueryType::MultiPhrase => {
                if self.terms.is_empty() || self.terms.iter().any(Vec::is_empty) {
                    return Err(Error::invalid_query("multi phrase query needs at least one term at every position"));
                }
            }
            QueryType::BoolField | QueryType::Ids | QueryType::MatchAll | QueryType::MatchNone => {}
        }
        Ok(())
    }
}

/// Anything that can lower itself to a [`QueryPlan`].
pub trait ToQueryPlan {
    fn query_plan(&self) -> QueryPlan;
}

fn non_empty(field: String) -> Option<String> {
    if field.is_empty() { None } else { Some(field) }
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// Boolean composition of nested queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BooleanQuery {
    pub must: Vec<Query>,
    pub should: Vec<Query>,
    pub must_not: Vec<Query>,
    pub boost: Option<Boost>,
}

impl BooleanQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    pub fn with_should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    pub fn with_must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for BooleanQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::Boolean);
        plan.must = self.must.clone();
        plan.should = self.should.clone();
        plan.must_not = self.must_not.clone();
        plan.boost = self.boost;
        plan
    }
}

/// Matches documents whose boolean field equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolFieldQuery {
    pub value: bool,
    pub field: Option<String>,
    pub boost: Option<Boost>,
}

impl BoolFieldQuery {
    pub fn new(value: bool) -> Self {
        Self { value, field: None, boost: None }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for BoolFieldQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::BoolField).with_common(&self.field, self.boost);
        plan.bool_value = self.value;
        plan
    }
}

/// Half-open `[start, end)` interval over date fields by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DateRangeQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub inclusive_start: Option<bool>,
    pub inclusive_end: Option<bool>,
    pub field: Option<String>,
    pub boost: Option<Boost>,
}

impl DateRangeQuery {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start: Some(start), end: Some(end), ..Self::default() }
    }

    /// A range with neither end set; configure it with `with_start`/`with_end`.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_inclusive_start(mut self, inclusive: bool) -> Self {
        self.inclusive_start = Some(inclusive);
        self
    }

    pub fn with_inclusive_end(mut self, inclusive: bool) -> Self {
        self.inclusive_end = Some(inclusive);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for DateRangeQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::DateRange).with_common(&self.field, self.boost);
        plan.min = self.start.into();
        plan.max = self.end.into();
        plan.inclusive_min = self.inclusive_start.unwrap_or(DEFAULT_INCLUSIVE_MIN);
        plan.inclusive_max = self.inclusive_end.unwrap_or(DEFAULT_INCLUSIVE_MAX);
        plan
    }
}

/// Matches documents by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdsQuery {
    pub ids: Vec<String>,
    pub boost: Option<Boost>,
}

impl IdsQuery {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { ids: ids.into_iter().map(Into::into).collect(), boost: None }
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for IdsQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::Ids);
        plan.matches = self.ids.clone();
        plan.boost = self.boost;
        plan
    }
}

/// Analyzed full-text match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchQuery {
    pub text: String,
    pub analyzer: Option<String>,
    pub field: Option<String>,
    pub boost: Option<Boost>,
    pub prefix_length: usize,
    pub fuzziness: u8,
    pub operator: Operator,
}

impl MatchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            analyzer: None,
            field: None,
            boost: None,
            prefix_length: 0,
            fuzziness: 0,
            operator: Operator::Or,
        }
    }

    pub fn with_analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = non_empty(analyzer.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }

    pub fn with_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    pub fn with_fuzziness(mut self, fuzziness: u8) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }
}

impl ToQueryPlan for MatchQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::Match).with_common(&self.field, self.boost);
        plan.matches = vec![self.text.clone()];
        plan.analyzer = self.analyzer.clone();
        plan.prefix_length = self.prefix_length;
        plan.fuzziness = self.fuzziness;
        plan.operator = self.operator;
        plan
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchAllQuery {
    pub boost: Option<Boost>,
}

impl MatchAllQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for MatchAllQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::MatchAll);
        plan.boost = self.boost;
        plan
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchNoneQuery {
    pub boost: Option<Boost>,
}

impl MatchNoneQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for MatchNoneQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::MatchNone);
        plan.boost = self.boost;
        plan
    }
}

/// Analyzed terms that must appear contiguously and in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPhraseQuery {
    pub phrase: String,
    pub field: Option<String>,
    pub analyzer: Option<String>,
    pub boost: Option<Boost>,
}

impl MatchPhraseQuery {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self { phrase: phrase.into(), field: None, analyzer: None, boost: None }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = non_empty(analyzer.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for MatchPhraseQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::MatchPhrase).with_common(&self.field, self.boost);
        plan.matches = vec![self.phrase.clone()];
        plan.analyzer = self.analyzer.clone();
        plan
    }
}

/// Phrase with alternatives per position: `[["quick", "fast"], ["fox"]]`
/// matches "quick fox" and "fast fox". Terms are not analyzed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultiPhraseQuery {
    pub terms: Vec<Vec<String>>,
    pub field: Option<String>,
    pub boost: Option<Boost>,
}

impl MultiPhraseQuery {
    pub fn new<P, I, S>(terms: P) -> Self
    where
        P: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms = terms.into_iter().map(|pos| pos.into_iter().map(Into::into).collect()).collect();
        Self { terms, field: None, boost: None }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for MultiPhraseQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::MultiPhrase).with_common(&self.field, self.boost);
        plan.terms = self.terms.clone();
        plan
    }
}

/// Range over numeric fields. Either bound may be left open.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericRangeQuery {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub inclusive_min: Option<bool>,
    pub inclusive_max: Option<bool>,
    pub field: Option<String>,
    pub boost: Option<Boost>,
}

impl NumericRangeQuery {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max, ..Self::default() }
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_inclusive_min(mut self, inclusive: bool) -> Self {
        self.inclusive_min = Some(inclusive);
        self
    }

    pub fn with_inclusive_max(mut self, inclusive: bool) -> Self {
        self.inclusive_max = Some(inclusive);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for NumericRangeQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::NumericRange).with_common(&self.field, self.boost);
        plan.min = self.min.into();
        plan.max = self.max.into();
        plan.inclusive_min = self.inclusive_min.unwrap_or(DEFAULT_INCLUSIVE_MIN);
        plan.inclusive_max = self.inclusive_max.unwrap_or(DEFAULT_INCLUSIVE_MAX);
        plan
    }
}

/// Exact (un-analyzed) prefix of a single term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefixQuery {
    pub prefix: String,
    pub field: Option<String>,
    pub boost: Option<Boost>,
}

impl PrefixQuery {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), field: None, boost: None }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for PrefixQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::Prefix).with_common(&self.field, self.boost);
        plan.matches = vec![self.prefix.clone()];
        plan
    }
}

/// Exact (un-analyzed) single term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermQuery {
    pub term: String,
    pub field: Option<String>,
    pub boost: Option<Boost>,
}

impl TermQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into(), field: None, boost: None }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for TermQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::Term).with_common(&self.field, self.boost);
        plan.matches = vec![self.term.clone()];
        plan
    }
}

/// Lexicographic range over terms. An empty bound string means open-ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermRangeQuery {
    pub min: Option<String>,
    pub max: Option<String>,
    pub inclusive_min: Option<bool>,
    pub inclusive_max: Option<bool>,
    pub field: Option<String>,
    pub boost: Option<Boost>,
}

impl TermRangeQuery {
    pub fn new(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self { min: non_empty(min.into()), max: non_empty(max.into()), ..Self::default() }
    }

    pub fn with_inclusive_min(mut self, inclusive: bool) -> Self {
        self.inclusive_min = Some(inclusive);
        self
    }

    pub fn with_inclusive_max(mut self, inclusive: bool) -> Self {
        self.inclusive_max = Some(inclusive);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for TermRangeQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::TermRange).with_common(&self.field, self.boost);
        plan.min = self.min.clone().into();
        plan.max = self.max.clone().into();
        plan.inclusive_min = self.inclusive_min.unwrap_or(DEFAULT_INCLUSIVE_MIN);
        plan.inclusive_max = self.inclusive_max.unwrap_or(DEFAULT_INCLUSIVE_MAX);
        plan
    }
}

/// Glob-style pattern (`*`, `?`) over single terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WildcardQuery {
    pub pattern: String,
    pub field: Option<String>,
    pub boost: Option<Boost>,
}

impl WildcardQuery {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self { pattern: pattern.into(), field: None, boost: None }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = non_empty(field.into());
        self
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(Boost(boost));
        self
    }
}

impl ToQueryPlan for WildcardQuery {
    fn query_plan(&self) -> QueryPlan {
        let mut plan = QueryPlan::new(QueryType::Wildcard).with_common(&self.field, self.boost);
        plan.matches = vec![self.pattern.clone()];
        plan
    }
}

// ---------------------------------------------------------------------------
// Closed union
// ---------------------------------------------------------------------------

/// Any query variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    Boolean(BooleanQuery),
    BoolField(BoolFieldQuery),
    DateRange(DateRangeQuery),
    Ids(IdsQuery),
    Match(MatchQuery),
    MatchAll(MatchAllQuery),
    MatchNone(MatchNoneQuery),
    MatchPhrase(MatchPhraseQuery),
    MultiPhrase(MultiPhraseQuery),
    NumericRange(NumericRangeQuery),
    Prefix(PrefixQuery),
    Term(TermQuery),
    TermRange(TermRangeQuery),
    Wildcard(WildcardQuery),
}

macro_rules! query_variants {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        impl ToQueryPlan for Query {
            fn query_plan(&self) -> QueryPlan {
                match self {
                    $(Query::$variant(q) => q.query_plan(),)*
                }
            }
        }

        $(
            impl From<$ty> for Query {
                fn from(q: $ty) -> Self {
                    Query::$variant(q)
                }
            }
        )*
    };
}

query_variants! {
    Boolean => BooleanQuery,
    BoolField => BoolFieldQuery,
    DateRange => DateRangeQuery,
    Ids => IdsQuery,
    Match => MatchQuery,
    MatchAll => MatchAllQuery,
    MatchNone => MatchNoneQuery,
    MatchPhrase => MatchPhraseQuery,
    MultiPhrase => MultiPhraseQuery,
    NumericRange => NumericRangeQuery,
    Prefix => PrefixQuery,
    Term => TermQuery,
    TermRange => TermRangeQuery,
    Wildcard => WildcardQuery,
}
