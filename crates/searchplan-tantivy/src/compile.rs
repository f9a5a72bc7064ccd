//! Lowers a [`QueryPlan`] to a tantivy query tree.
//!
//! Field values live under the `_doc` JSON field, so every term is
//! built from a dotted path inside it. Queries without a field target the
//! mapping's default path, which holds a copy of every leaf value.

use std::ops::Bound as RangeBound;

use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, EmptyQuery, FuzzyTermQuery, Occur, PhraseQuery, Query as TantivyQuery,
    RangeQuery, TermQuery,
};
use tantivy::schema::IndexRecordOption;
use tantivy::tokenizer::{TokenStream, TokenizerManager};
use tantivy::Term;
use tracing::trace;

use searchplan_core::config::IndexMapping;
use searchplan_core::{Bound, Error, Operator, QueryPlan, QueryType, Result, ToQueryPlan};

use crate::automaton::{AutomatonQuery, FuzzyPrefixAutomaton, RangeEnd, TermRangeAutomaton};
use crate::tantivy_utils::{to_tantivy_date, FieldHandles};

/// Largest edit distance the fuzzy automaton supports.
pub const MAX_FUZZINESS: u8 = 2;

/// Upper bound on phrases a multi-phrase query may expand to.
const MAX_PHRASE_EXPANSIONS: usize = 1024;

type Compiled = Box<dyn TantivyQuery>;

#[derive(Clone)]
pub struct QueryCompiler {
    fields: FieldHandles,
    default_field: String,
    default_analyzer: String,
    tokenizers: TokenizerManager,
}

impl QueryCompiler {
    pub fn new(fields: FieldHandles, mapping: &IndexMapping, tokenizers: TokenizerManager) -> Self {
        Self {
            fields,
            default_field: mapping.default_field.clone(),
            default_analyzer: mapping.default_analyzer.clone(),
            tokenizers,
        }
    }

    /// Validates the plan of `query`, then lowers it.
    pub fn compile(&self, query: &dyn ToQueryPlan) -> Result<Compiled> {
        let plan = query.query_plan();
        plan.validate()?;
        let compiled = self.lower(&plan)?;
        trace!(query_type = %plan.query_type, "query compiled");
        Ok(compiled)
    }

    fn lower(&self, plan: &QueryPlan) -> Result<Compiled> {
        let compiled: Compiled = match plan.query_type {
            QueryType::Boolean => self.boolean(plan)?,
            QueryType::BoolField => {
                let mut term = self.path_term(plan);
                term.append_type_and_fast_value(plan.bool_value);
                Box::new(TermQuery::new(term, IndexRecordOption::Basic))
            }
            QueryType::DateRange => self.range(plan, |bound| {
                bound.as_date().map(|date| {
                    let mut term = self.path_term(plan);
                    term.append_type_and_fast_value(to_tantivy_date(date));
                    term
                })
            })?,
            QueryType::NumericRange => self.range(plan, |bound| {
                bound.as_number().map(|n| {
                    let mut term = self.path_term(plan);
                    term.append_type_and_fast_value(n);
                    term
                })
            })?,
            QueryType::TermRange => self.term_range(plan)?,
            QueryType::Ids => {
                let clauses = plan
                    .matches
                    .iter()
                    .map(|id| {
                        let term = Term::from_field_text(self.fields.id, id);
                        (Occur::Should, Box::new(TermQuery::new(term, IndexRecordOption::Basic)) as Compiled)
                    })
                    .collect();
                disjunction(clauses)
            }
            QueryType::Match => self.match_query(plan)?,
            QueryType::MatchAll => Box::new(AllQuery),
            QueryType::MatchNone => Box::new(EmptyQuery),
            QueryType::MatchPhrase => {
                let tokens = self.analyze(plan.analyzer.as_deref(), plan.first_match()?)?;
                self.phrase(plan, tokens)
            }
            QueryType::MultiPhrase => self.multi_phrase(plan)?,
            QueryType::Prefix => {
                let term = self.text_term(plan, plan.first_match()?);
                Box::new(FuzzyTermQuery::new_prefix(term, 0, false))
            }
            QueryType::Term => {
                let term = self.text_term(plan, plan.first_match()?);
                Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs))
            }
            QueryType::Wildcard => return Err(Error::UnsupportedQueryType(plan.query_type)),
        };
        Ok(match plan.boost {
            Some(boost) => Box::new(BoostQuery::new(compiled, boost.value() as f32)),
            None => compiled,
        })
    }

    fn boolean(&self, plan: &QueryPlan) -> Result<Compiled> {
        let mut clauses = Vec::with_capacity(plan.must.len() + plan.should.len() + plan.must_not.len());
        for (occur, queries) in [(Occur::Must, &plan.must), (Occur::Should, &plan.should), (Occur::MustNot, &plan.must_not)] {
            for query in queries {
                clauses.push((occur, self.lower(&query.query_plan())?));
            }
        }
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    fn match_query(&self, plan: &QueryPlan) -> Result<Compiled> {
        if plan.fuzziness > MAX_FUZZINESS {
            return Err(Error::invalid_query(format!(
                "fuzziness {} exceeds the supported maximum of {MAX_FUZZINESS}",
                plan.fuzziness
            )));
        }
        let occur = match plan.operator {
            Operator::Or => Occur::Should,
            Operator::And => Occur::Must,
        };
        let tokens = self.analyze(plan.analyzer.as_deref(), plan.first_match()?)?;
        let clauses = tokens
            .into_iter()
            .map(|(_, token)| -> Result<(Occur, Compiled)> {
                let term = self.text_term(plan, &token);
                let clause: Compiled = if plan.fuzziness == 0 {
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs))
                } else if plan.prefix_length > 0 {
                    self.fuzzy_prefix(plan, &token)?
                } else {
                    Box::new(FuzzyTermQuery::new(term, plan.fuzziness, true))
                };
                Ok((occur, clause))
            })
            .collect::<Result<_>>()?;
        Ok(disjunction(clauses))
    }

    /// The first `prefix_length` characters of `token` match exactly and the
    /// rest within `fuzziness` edits, both on the same indexed term.
    fn fuzzy_prefix(&self, plan: &QueryPlan, token: &str) -> Result<Compiled> {
        let split = token.char_indices().nth(plan.prefix_length).map_or(token.len(), |(at, _)| at);
        let (prefix, rest) = token.split_at(split);
        let exact = self.text_term(plan, prefix).serialized_value_bytes().to_vec();
        let automaton = FuzzyPrefixAutomaton::new(exact, rest, plan.fuzziness)
            .ok_or_else(|| Error::invalid_query(format!("no fuzzy automaton for distance {}", plan.fuzziness)))?;
        Ok(Box::new(AutomatonQuery::new(self.fields.doc, automaton)))
    }

    /// Bounds compare against indexed terms, not whole values, and are not
    /// analyzed.
    fn term_range(&self, plan: &QueryPlan) -> Result<Compiled> {
        let end = |bound: &Bound, inclusive: bool| {
            bound.as_text().map(|text| RangeEnd { value: text.as_bytes().to_vec(), inclusive })
        };
        let (low, high) = (end(&plan.min, plan.inclusive_min), end(&plan.max, plan.inclusive_max));
        if low.is_none() && high.is_none() {
            return Err(Error::invalid_query(format!("{} query has no usable bound", plan.query_type)));
        }
        let path = self.text_term(plan, "").serialized_value_bytes().to_vec();
        Ok(Box::new(AutomatonQuery::new(self.fields.doc, TermRangeAutomaton::new(path, low, high))))
    }

    fn phrase(&self, plan: &QueryPlan, tokens: Vec<(usize, String)>) -> Compiled {
        match tokens.as_slice() {
            [] => Box::new(EmptyQuery),
            [(_, token)] => Box::new(TermQuery::new(self.text_term(plan, token), IndexRecordOption::WithFreqs)),
            [(first, _), ..] => {
                let base = *first;
                let terms = tokens.iter().map(|(position, token)| (position - base, self.text_term(plan, token))).collect();
                Box::new(PhraseQuery::new_with_offset(terms))
            }
        }
    }

    fn multi_phrase(&self, plan: &QueryPlan) -> Result<Compiled> {
        let mut combinations: Vec<Vec<&str>> = vec![Vec::new()];
        for alternatives in &plan.terms {
            if combinations.len() * alternatives.len() > MAX_PHRASE_EXPANSIONS {
                return Err(Error::invalid_query(format!(
                    "multi phrase query expands to more than {MAX_PHRASE_EXPANSIONS} phrases"
                )));
            }
            combinations = combinations
                .iter()
                .flat_map(|prefix| {
                    alternatives.iter().map(move |term| {
                        let mut next = prefix.clone();
                        next.push(term.as_str());
                        next
                    })
                })
                .collect();
        }
        let clauses = combinations
            .into_iter()
            .map(|phrase| {
                let tokens = phrase.into_iter().enumerate().map(|(pos, t)| (pos, t.to_string())).collect();
                (Occur::Should, self.phrase(plan, tokens))
            })
            .collect();
        Ok(disjunction(clauses))
    }

    fn range<F>(&self, plan: &QueryPlan, to_term: F) -> Result<Compiled>
    where
        F: Fn(&Bound) -> Option<Term>,
    {
        let lower = range_bound(to_term(&plan.min), plan.inclusive_min);
        let upper = range_bound(to_term(&plan.max), plan.inclusive_max);
        if matches!((&lower, &upper), (RangeBound::Unbounded, RangeBound::Unbounded)) {
            return Err(Error::invalid_query(format!("{} query has no usable bound", plan.query_type)));
        }
        Ok(Box::new(RangeQuery::new(lower, upper)))
    }

    /// Runs `text` through the named analyzer, keeping token positions.
    fn analyze(&self, analyzer: Option<&str>, text: &str) -> Result<Vec<(usize, String)>> {
        let name = analyzer.unwrap_or(&self.default_analyzer);
        let mut analyzer =
            self.tokenizers.get(name).ok_or_else(|| Error::invalid_query(format!("unknown analyzer {name:?}")))?;
        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            let token = stream.token();
            tokens.push((token.position, token.text.clone()));
        }
        Ok(tokens)
    }

    fn path_term(&self, plan: &QueryPlan) -> Term {
        let path = plan.field.as_deref().unwrap_or(&self.default_field);
        Term::from_field_json_path(self.fields.doc, path, true)
    }

    fn text_term(&self, plan: &QueryPlan, text: &str) -> Term {
        let mut term = self.path_term(plan);
        term.append_type_and_str(text);
        term
    }
}

fn range_bound(term: Option<Term>, inclusive: bool) -> RangeBound<Term> {
    match term {
        Some(term) if inclusive => RangeBound::Included(term),
        Some(term) => RangeBound::Excluded(term),
        None => RangeBound::Unbounded,
    }
}

/// Collapses single-clause lists; an empty list matches nothing.
fn disjunction(mut clauses: Vec<(Occur, Compiled)>) -> Compiled {
    match clauses.len() {
        0 => Box::new(EmptyQuery),
        1 => clauses.remove(0).1,
        _ => Box::new(BooleanQuery::new(clauses)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchplan_core::{
        BooleanQuery as PlanBoolean, IdsQuery, MatchPhraseQuery, MatchQuery, MultiPhraseQuery, NumericRangeQuery,
        TermQuery as PlanTerm, TermRangeQuery, WildcardQuery,
    };
    use tantivy::Index;

    use crate::tantivy_utils::{build_schema, register_tokenizer};

    fn compiler() -> QueryCompiler {
        let mapping = IndexMapping::default();
        let index = Index::create_in_ram(build_schema(&mapping));
        register_tokenizer(&index);
        let fields = FieldHandles::from_schema(&index.schema()).expect("fields");
        QueryCompiler::new(fields, &mapping, index.tokenizers().clone())
    }

    #[test]
    fn wildcard_is_unsupported() {
        let err = compiler().compile(&WildcardQuery::new("fo*")).err();
        assert!(matches!(err, Some(Error::UnsupportedQueryType(QueryType::Wildcard))));
    }

    #[test]
    fn fuzziness_above_two_is_rejected() {
        let err = compiler().compile(&MatchQuery::new("fobar").with_fuzziness(3)).err();
        assert!(matches!(err, Some(Error::InvalidQuery(_))));
        assert!(compiler().compile(&MatchQuery::new("fobar").with_fuzziness(2)).is_ok());
    }

    #[test]
    fn unknown_analyzer_is_invalid() {
        let err = compiler().compile(&MatchQuery::new("bar").with_analyzer("klingon")).err();
        assert!(matches!(err, Some(Error::InvalidQuery(_))));
    }

    #[test]
    fn boost_wraps_only_when_set() {
        let c = compiler();
        let plain = c.compile(&PlanTerm::new("bar")).expect("compiles");
        assert!(!plain.is::<BoostQuery>());
        let zero = c.compile(&PlanTerm::new("bar").with_boost(0.0)).expect("compiles");
        assert!(zero.is::<BoostQuery>());
    }

    #[test]
    fn single_token_phrase_becomes_term() {
        let c = compiler();
        let q = c.compile(&MatchPhraseQuery::new("lift it ").with_field("nest.third")).expect("compiles");
        assert!(q.is::<TermQuery>());
        let q = c.compile(&MatchPhraseQuery::new("bar bug")).expect("compiles");
        assert!(q.is::<PhraseQuery>());
    }

    #[test]
    fn multi_phrase_expands_alternatives() {
        let c = compiler();
        let q = c.compile(&MultiPhraseQuery::new([vec!["foo"], vec!["bar", "baz"]])).expect("compiles");
        assert!(q.is::<BooleanQuery>());
        let wide: Vec<Vec<String>> = (0..4).map(|p| (0..8).map(|i| format!("t{p}{i}")).collect()).collect();
        let err = c.compile(&MultiPhraseQuery::new(wide)).err();
        assert!(matches!(err, Some(Error::InvalidQuery(_))));
    }

    #[test]
    fn fuzzy_prefix_is_one_term_automaton() {
        let c = compiler();
        let q = c.compile(&MatchQuery::new("xoobar").with_prefix_length(1).with_fuzziness(1)).expect("compiles");
        assert!(q.is::<AutomatonQuery<FuzzyPrefixAutomaton>>());
        let q = c.compile(&MatchQuery::new("xoobar").with_fuzziness(1)).expect("compiles");
        assert!(q.is::<FuzzyTermQuery>());
    }

    #[test]
    fn term_range_uses_the_term_dictionary() {
        let q = compiler().compile(&TermRangeQuery::new("bug", "c").with_field("f")).expect("compiles");
        assert!(q.is::<AutomatonQuery<TermRangeAutomaton>>());
    }

    #[test]
    fn open_range_is_rejected_before_lowering() {
        let err = compiler().compile(&NumericRangeQuery::new(None, None)).err();
        assert!(matches!(err, Some(Error::InvalidQuery(_))));
    }

    #[test]
    fn empty_inputs_match_nothing() {
        let c = compiler();
        assert!(c.compile(&IdsQuery::new(Vec::<String>::new())).expect("compiles").is::<EmptyQuery>());
        assert!(c.compile(&MatchQuery::new("the and of")).expect("compiles").is::<EmptyQuery>());
        assert!(c.compile(&PlanBoolean::new()).expect("compiles").is::<BooleanQuery>());
    }
}
