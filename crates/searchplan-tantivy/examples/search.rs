use std::env;
use std::path::{Path, PathBuf};

use searchplan_core::{Context, Engine, Index, MatchPhraseQuery, MatchQuery, Query, SearchRequest};
use searchplan_tantivy::{IndexConfig, TantivyEngine};
use tracing_subscriber::EnvFilter;

// Query an existing index and print normalized results.
// Usage:
//   cargo run -p searchplan-tantivy --example search -- "your query" \
//     [--index ../dev_data/indexes/searchplan] [--field nest.path] [--limit 10] [--phrase] [--fuzzy N] [--explain]

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: cargo run -p searchplan-tantivy --example search -- <query> [--index DIR] [--field PATH] [--limit N] [--phrase] [--fuzzy N] [--explain]");
        std::process::exit(1);
    }
    let mut text = String::new();
    let mut index_dir: Option<PathBuf> = None;
    let mut field: Option<String> = None;
    let mut limit: usize = 10;
    let mut fuzziness: u8 = 0;
    let mut phrase = false;
    let mut explain = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--index" | "--field" | "--limit" | "--fuzzy" => {
                if i + 1 >= args.len() { eprintln!("{} requires a value", args[i]); std::process::exit(2); }
                let value = &args[i + 1];
                match args[i].as_str() {
                    "--index" => index_dir = Some(PathBuf::from(value)),
                    "--field" => field = Some(value.clone()),
                    "--limit" => limit = value.parse().unwrap_or(limit),
                    _ => fuzziness = value.parse().unwrap_or(fuzziness),
                }
                i += 2; continue;
            }
            "--phrase" => { phrase = true; i += 1; continue; }
            "--explain" => { explain = true; i += 1; continue; }
            s if s.starts_with("-") => {
                eprintln!("Unknown flag: {}", s); std::process::exit(2);
            }
            s => {
                if text.is_empty() { text = s.to_string(); }
                i += 1; continue;
            }
        }
    }

    if text.is_empty() {
        eprintln!("Missing <query> argument");
        std::process::exit(1);
    }

    let index_dir = if let Some(dir) = index_dir {
        dir
    } else if let Ok(env_path) = env::var("SEARCHPLAN_INDEX_DIR") {
        PathBuf::from(env_path)
    } else {
        let base = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap_or(Path::new("."));
        base.join("dev_data/indexes/searchplan")
    };

    let query: Query = if phrase {
        let q = MatchPhraseQuery::new(text.clone());
        match &field { Some(f) => q.with_field(f.clone()).into(), None => q.into() }
    } else {
        let q = MatchQuery::new(text.clone()).with_fuzziness(fuzziness);
        match &field { Some(f) => q.with_field(f.clone()).into(), None => q.into() }
    };

    println!("searchplan search\n=================");
    println!("Index: {}", index_dir.display());
    println!("Query: {} (limit {})\n", text, limit);

    let engine = TantivyEngine::open([IndexConfig::on_disk("default", index_dir)])?;
    let request = SearchRequest::new(query).with_size(limit).with_fields(["*"]).with_explain(explain);
    let result = engine.index("default").search_request(&Context::background(), &request)?;
    println!("{}", result);
    for hit in &result.hits {
        for (path, value) in &hit.fields {
            println!("    {} = {}", path, value);
        }
        if let Some(explanation) = &hit.explanation {
            println!("    explanation: {:.3} {} ({} levels)", explanation.value, explanation.message, explanation.depth());
        }
    }
    Ok(())
}
