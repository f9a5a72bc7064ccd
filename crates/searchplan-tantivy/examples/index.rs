use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use searchplan_core::{Context, Document, Engine, Index};
use searchplan_tantivy::{IndexConfig, TantivyEngine};
use tracing_subscriber::EnvFilter;

// Load a JSON-lines file into an on-disk index. Each line is an object; its
// "id" key (or the line number) becomes the document id.
// Usage:
//   cargo run -p searchplan-tantivy --example index -- <docs.jsonl> [--index ../dev_data/indexes/searchplan]
// Notes:
//   - Documents with an existing id are replaced.
//   - RUST_LOG=searchplan_tantivy=debug shows index lifecycle events.

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut docs_file: Option<PathBuf> = None;
    let mut index_dir: Option<PathBuf> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--index" => {
                if i + 1 >= args.len() { eprintln!("--index requires a path"); std::process::exit(2); }
                index_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2; continue;
            }
            s if s.starts_with('-') => {
                eprintln!("Unknown flag: {}", s); std::process::exit(2);
            }
            s => {
                if docs_file.is_none() { docs_file = Some(PathBuf::from(s)); }
                i += 1;
            }
        }
    }
    let Some(docs_file) = docs_file else {
        eprintln!("Usage: cargo run -p searchplan-tantivy --example index -- <docs.jsonl> [--index DIR]");
        std::process::exit(1);
    };

    // Resolve index path precedence: flag > SEARCHPLAN_INDEX_DIR > workspace-relative fallback
    let index_dir = index_dir
        .or_else(|| env::var("SEARCHPLAN_INDEX_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| {
            let ws_root = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap_or(Path::new("."));
            ws_root.join("dev_data/indexes/searchplan")
        });

    println!("searchplan index\n================");
    println!("Docs file: {}", docs_file.display());
    println!("Index dir: {}", index_dir.display());

    let engine = TantivyEngine::open([IndexConfig::on_disk("default", index_dir)])?;
    let index = engine.index("default");
    let ctx = Context::background();
    let mut count = 0;
    for (n, line) in fs::read_to_string(&docs_file)?.lines().enumerate() {
        if line.trim().is_empty() { continue; }
        let mut value: serde_json::Value = serde_json::from_str(line)?;
        let id = match value.as_object_mut().and_then(|o| o.remove("id")) {
            Some(serde_json::Value::String(id)) => id,
            Some(other) => other.to_string(),
            None => (n + 1).to_string(),
        };
        index.index(&ctx, &id, &Document::try_from(value)?)?;
        count += 1;
    }
    println!("Done. Indexed {} documents ({} total).", count, index.count(&ctx)?);
    Ok(())
}
