//! Term dictionary automata for matches tantivy has no query for.
//!
//! Keys of the `_doc` dictionary are `path \0 s text` for string values, so
//! each automaton first walks the exact path bytes and then decides on the
//! text that follows.

use std::fmt;
use std::sync::{Arc, OnceLock};

use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, DFA, SINK_STATE};
use tantivy::query::{AutomatonWeight, EnableScoring, Query, Weight};
use tantivy::schema::Field;
use tantivy_fst::Automaton;

/// Runs `A` over the term dictionary of `field`. Matching documents get a
/// constant score, like tantivy's own fuzzy and prefix queries.
pub struct AutomatonQuery<A> {
    field: Field,
    automaton: Arc<A>,
}

impl<A> AutomatonQuery<A> {
    pub fn new(field: Field, automaton: A) -> Self {
        Self { field, automaton: Arc::new(automaton) }
    }
}

impl<A> Clone for AutomatonQuery<A> {
    fn clone(&self) -> Self {
        Self { field: self.field, automaton: Arc::clone(&self.automaton) }
    }
}

impl<A: fmt::Debug> fmt::Debug for AutomatonQuery<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomatonQuery").field("field", &self.field).field("automaton", &self.automaton).finish()
    }
}

impl<A> Query for AutomatonQuery<A>
where
    A: Automaton + fmt::Debug + Send + Sync + 'static,
    A::State: Clone,
{
    fn weight(&self, _enable_scoring: EnableScoring<'_>) -> tantivy::Result<Box<dyn Weight>> {
        Ok(Box::new(AutomatonWeight::<A>::new(self.field, Arc::clone(&self.automaton))))
    }
}

fn levenshtein_builder(distance: u8) -> Option<&'static LevenshteinAutomatonBuilder> {
    static BUILDERS: [OnceLock<LevenshteinAutomatonBuilder>; 3] = [OnceLock::new(), OnceLock::new(), OnceLock::new()];
    let slot = BUILDERS.get(usize::from(distance))?;
    Some(slot.get_or_init(|| LevenshteinAutomatonBuilder::new(distance, true)))
}

/// Keys starting with `exact` whose remaining bytes are within `distance`
/// edits of `fuzzy`. Both conditions hold on the same term.
pub struct FuzzyPrefixAutomaton {
    exact: Vec<u8>,
    distance: u8,
    dfa: DFA,
}

#[derive(Debug, Clone, Copy)]
pub enum FuzzyPrefixState {
    Exact(usize),
    Fuzzy(u32),
    Dead,
}

impl FuzzyPrefixAutomaton {
    /// `None` when no automaton exists for `distance`.
    pub fn new(exact: Vec<u8>, fuzzy: &str, distance: u8) -> Option<Self> {
        let dfa = levenshtein_builder(distance)?.build_dfa(fuzzy);
        Some(Self { exact, distance, dfa })
    }

    fn after_exact(&self, matched: usize) -> FuzzyPrefixState {
        if matched == self.exact.len() {
            FuzzyPrefixState::Fuzzy(self.dfa.initial_state())
        } else {
            FuzzyPrefixState::Exact(matched)
        }
    }
}

impl fmt::Debug for FuzzyPrefixAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyPrefixAutomaton")
            .field("exact", &String::from_utf8_lossy(&self.exact))
            .field("distance", &self.distance)
            .finish_non_exhaustive()
    }
}

impl Automaton for FuzzyPrefixAutomaton {
    type State = FuzzyPrefixState;

    fn start(&self) -> FuzzyPrefixState {
        self.after_exact(0)
    }

    fn is_match(&self, state: &FuzzyPrefixState) -> bool {
        match state {
            FuzzyPrefixState::Fuzzy(s) => matches!(self.dfa.distance(*s), Distance::Exact(_)),
            _ => false,
        }
    }

    fn can_match(&self, state: &FuzzyPrefixState) -> bool {
        match state {
            FuzzyPrefixState::Exact(_) => true,
            FuzzyPrefixState::Fuzzy(s) => *s != SINK_STATE,
            FuzzyPrefixState::Dead => false,
        }
    }

    fn accept(&self, state: &FuzzyPrefixState, byte: u8) -> FuzzyPrefixState {
        match *state {
            FuzzyPrefixState::Exact(i) if self.exact.get(i) == Some(&byte) => self.after_exact(i + 1),
            FuzzyPrefixState::Fuzzy(s) => FuzzyPrefixState::Fuzzy(self.dfa.transition(s, byte)),
            _ => FuzzyPrefixState::Dead,
        }
    }
}

/// One end of a [`TermRangeAutomaton`].
#[derive(Debug, Clone)]
pub struct RangeEnd {
    pub value: Vec<u8>,
    pub inclusive: bool,
}

/// Progress of the key against one range end: still equal to its first
/// `n` bytes, or already strictly inside the range on that side.
#[derive(Debug, Clone, Copy)]
pub enum Edge {
    Equal(usize),
    Inside,
}

#[derive(Debug, Clone, Copy)]
pub enum RangeState {
    Path(usize),
    Value { low: Edge, high: Edge },
    Dead,
}

/// Keys starting with `path` whose remaining bytes compare
/// lexicographically between `low` and `high`.
#[derive(Debug)]
pub struct TermRangeAutomaton {
    path: Vec<u8>,
    low: Option<RangeEnd>,
    high: Option<RangeEnd>,
}

impl TermRangeAutomaton {
    pub fn new(path: Vec<u8>, low: Option<RangeEnd>, high: Option<RangeEnd>) -> Self {
        Self { path, low, high }
    }

    fn after_path(&self, matched: usize) -> RangeState {
        if matched < self.path.len() {
            return RangeState::Path(matched);
        }
        let edge = |end: &Option<RangeEnd>| if end.is_some() { Edge::Equal(0) } else { Edge::Inside };
        RangeState::Value { low: edge(&self.low), high: edge(&self.high) }
    }

    fn step_low(&self, edge: Edge, byte: u8) -> Option<Edge> {
        let (Edge::Equal(i), Some(low)) = (edge, &self.low) else {
            return Some(Edge::Inside);
        };
        match low.value.get(i) {
            // Longer than the bound with the bound as prefix sorts after it.
            None => Some(Edge::Inside),
            Some(&b) if byte > b => Some(Edge::Inside),
            Some(&b) if byte == b => Some(Edge::Equal(i + 1)),
            Some(_) => None,
        }
    }

    fn step_high(&self, edge: Edge, byte: u8) -> Option<Edge> {
        let (Edge::Equal(i), Some(high)) = (edge, &self.high) else {
            return Some(Edge::Inside);
        };
        match high.value.get(i) {
            None => None,
            Some(&b) if byte < b => Some(Edge::Inside),
            Some(&b) if byte == b => Some(Edge::Equal(i + 1)),
            Some(_) => None,
        }
    }
}

impl Automaton for TermRangeAutomaton {
    type State = RangeState;

    fn start(&self) -> RangeState {
        self.after_path(0)
    }

    fn is_match(&self, state: &RangeState) -> bool {
        let RangeState::Value { low, high } = *state else {
            return false;
        };
        let low_ok = match (low, &self.low) {
            (Edge::Equal(i), Some(end)) => i == end.value.len() && end.inclusive,
            _ => true,
        };
        let high_ok = match (high, &self.high) {
            (Edge::Equal(i), Some(end)) => i < end.value.len() || end.inclusive,
            _ => true,
        };
        low_ok && high_ok
    }

    fn can_match(&self, state: &RangeState) -> bool {
        !matches!(state, RangeState::Dead)
    }

    fn accept(&self, state: &RangeState, byte: u8) -> RangeState {
        match *state {
            RangeState::Path(i) if self.path.get(i) == Some(&byte) => self.after_path(i + 1),
            RangeState::Value { low, high } => match (self.step_low(low, byte), self.step_high(high, byte)) {
                (Some(low), Some(high)) => RangeState::Value { low, high },
                _ => RangeState::Dead,
            },
            _ => RangeState::Dead,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<A: Automaton>(automaton: &A, key: &str) -> bool {
        let mut state = automaton.start();
        for &byte in key.as_bytes() {
            if !automaton.can_match(&state) {
                return false;
            }
            state = automaton.accept(&state, byte);
        }
        automaton.is_match(&state)
    }

    fn end(value: &str, inclusive: bool) -> Option<RangeEnd> {
        Some(RangeEnd { value: value.as_bytes().to_vec(), inclusive })
    }

    #[test]
    fn fuzzy_prefix_needs_exact_prefix_on_the_same_term() {
        let automaton = FuzzyPrefixAutomaton::new(b"p:x".to_vec(), "oobar", 1).expect("distance 1");
        assert!(run(&automaton, "p:xoobar"));
        assert!(run(&automaton, "p:xobar"));
        assert!(!run(&automaton, "p:foobar"));
        assert!(!run(&automaton, "p:xylo"));
        assert!(!run(&automaton, "q:xoobar"));
    }

    #[test]
    fn fuzzy_prefix_rejects_unsupported_distance() {
        assert!(FuzzyPrefixAutomaton::new(Vec::new(), "abc", 3).is_none());
    }

    #[test]
    fn term_range_compares_bytes_after_path() {
        let automaton = TermRangeAutomaton::new(b"p:".to_vec(), end("bug", true), end("c", false));
        assert!(run(&automaton, "p:bug"));
        assert!(run(&automaton, "p:bugs"));
        assert!(!run(&automaton, "p:bar"));
        assert!(!run(&automaton, "p:bu"));
        assert!(!run(&automaton, "p:c"));
        assert!(!run(&automaton, "p:ca"));
        assert!(!run(&automaton, "q:bug"));
    }

    #[test]
    fn term_range_respects_inclusiveness_and_open_ends() {
        let exclusive = TermRangeAutomaton::new(b"p:".to_vec(), end("2", false), end("3", true));
        assert!(!run(&exclusive, "p:2"));
        assert!(run(&exclusive, "p:20"));
        assert!(run(&exclusive, "p:3"));
        assert!(!run(&exclusive, "p:30"));

        let open = TermRangeAutomaton::new(b"p:".to_vec(), end("y", true), None);
        assert!(run(&open, "p:zed"));
        assert!(!run(&open, "p:Zed"));
        let below = TermRangeAutomaton::new(b"p:".to_vec(), None, end("b", false));
        assert!(run(&below, "p:a"));
        assert!(run(&below, "p:"));
        assert!(!run(&below, "p:b"));
    }
}
