//! searchplan-tantivy
//!
//! Tantivy backend for searchplan. `compile` lowers query plans to tantivy
//! queries (with term automata from `automaton` where tantivy has none), `handle` wraps one tantivy index, `normalize` maps raw responses
//! back to canonical results and `engine`/`index` expose the facade. See
//! `examples/` for CLI-like usage during development.
pub mod automaton;
pub mod compile;
pub mod engine;
pub mod handle;
pub mod index;
pub mod normalize;
pub mod tantivy_utils;

pub use compile::QueryCompiler;
pub use engine::TantivyEngine;
pub use index::{IndexConfig, TantivyIndex};
