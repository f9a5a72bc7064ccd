//! Thin adapter over one tantivy index: open, submit, delete, count and
//! execute a compiled query. Everything engine-neutral happens elsewhere.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{Explanation as TantivyExplanation, Query as TantivyQuery};
use tantivy::schema::{OwnedValue, Value};
use tantivy::{DocAddress, Index, IndexReader, IndexWriter, ReloadPolicy, Score, TantivyDocument, Term};
use tracing::{debug, trace};

use searchplan_core::config::IndexMapping;
use searchplan_core::{Document, Error, FieldValue, Result};

use crate::compile::QueryCompiler;
use crate::tantivy_utils::{build_schema, indexed_analyzer, register_tokenizer, to_tantivy_date, FieldHandles};

/// Paging and per-hit options for [`TantivyHandle::execute`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    pub size: usize,
    pub from: usize,
    pub explain: bool,
    pub load_source: bool,
}

#[derive(Debug)]
pub struct NativeHit {
    pub address: DocAddress,
    pub id: String,
    pub score: Score,
    pub explanation: Option<TantivyExplanation>,
    /// Stored JSON of the submitted document, when requested and kept.
    pub source: Option<String>,
}

/// Raw response of one execution, before normalization.
#[derive(Debug)]
pub struct NativeResponse {
    pub hits: Vec<NativeHit>,
    pub total: usize,
    pub max_score: Option<Score>,
    pub segments: usize,
    pub took: Duration,
}

pub struct TantivyHandle {
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: FieldHandles,
    mapping: IndexMapping,
    compiler: QueryCompiler,
}

impl TantivyHandle {
    /// Opens the index stored in `location`, creating it when the directory
    /// holds none yet. `None` keeps the index in memory.
    pub fn open(location: Option<&Path>, mapping: &IndexMapping) -> Result<Self> {
        let index = match location {
            Some(dir) if dir.join("meta.json").exists() => {
                debug!(path = %dir.display(), "opening existing index");
                Index::open_in_dir(dir).map_err(Error::engine)?
            }
            Some(dir) => {
                debug!(path = %dir.display(), "creating index");
                fs::create_dir_all(dir)?;
                Index::create_in_dir(dir, build_schema(mapping)).map_err(Error::engine)?
            }
            None => Index::create_in_ram(build_schema(mapping)),
        };
        register_tokenizer(&index);
        if index.tokenizers().get(&mapping.default_analyzer).is_none() {
            return Err(Error::InvalidConfig(format!("unknown analyzer {:?}", mapping.default_analyzer)));
        }

        let schema = index.schema();
        let fields = FieldHandles::from_schema(&schema)?;
        // Queries are analyzed with the mapping's analyzer, so it must be the
        // one the stored documents went through.
        match indexed_analyzer(&schema, fields.doc) {
            Some(indexed) if indexed == mapping.default_analyzer => {}
            indexed => {
                return Err(Error::InvalidConfig(format!(
                    "index was built with analyzer {indexed:?}, mapping asks for {:?}",
                    mapping.default_analyzer
                )))
            }
        }
        let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into().map_err(Error::engine)?;
        let writer: IndexWriter = index
            .writer_with_num_threads(1, mapping.writer_memory_bytes)
            .map_err(|e| Error::InvalidConfig(format!("cannot create index writer: {e}")))?;
        let compiler = QueryCompiler::new(fields, mapping, index.tokenizers().clone());

        Ok(Self { reader, writer: Mutex::new(writer), fields, mapping: mapping.clone(), compiler })
    }

    pub fn compiler(&self) -> &QueryCompiler {
        &self.compiler
    }

    /// Adds `document` under `id`, replacing any previous document with the
    /// same id, and makes it visible to searches before returning.
    pub fn submit(&self, id: &str, document: &Document) -> Result<()> {
        let doc = self.to_tantivy(id, document)?;
        {
            let mut writer = self.writer.lock();
            writer.delete_term(Term::from_field_text(self.fields.id, id));
            writer.add_document(doc).map_err(Error::engine)?;
            writer.commit().map_err(Error::engine)?;
        }
        self.reader.reload().map_err(Error::engine)?;
        trace!(id, "document committed");
        Ok(())
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        {
            let mut writer = self.writer.lock();
            writer.delete_term(Term::from_field_text(self.fields.id, id));
            writer.commit().map_err(Error::engine)?;
        }
        self.reader.reload().map_err(Error::engine)?;
        Ok(())
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    pub fn execute(&self, query: &dyn TantivyQuery, options: ExecuteOptions) -> Result<NativeResponse> {
        let searcher = self.reader.searcher();
        let started = Instant::now();

        // TopDocs refuses a zero limit; a zero-size page only needs the count.
        // Neither end of the page can usefully exceed the number of documents.
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        let limit = options.size.min(num_docs).max(1);
        let page = TopDocs::with_limit(limit).and_offset(options.from.min(num_docs));
        let (mut top_docs, total, best) =
            searcher.search(query, &(page, Count, TopDocs::with_limit(1))).map_err(Error::engine)?;
        if options.size == 0 {
            top_docs.clear();
        }

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address).map_err(Error::engine)?;
            let id = doc
                .get_first(self.fields.id)
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::Engine(format!("stored document at {address:?} has no id")))?
                .to_string();
            let source = if options.load_source {
                doc.get_first(self.fields.source).and_then(|v| v.as_str()).map(str::to_string)
            } else {
                None
            };
            let explanation =
                if options.explain { Some(query.explain(&searcher, address).map_err(Error::engine)?) } else { None };
            hits.push(NativeHit { address, id, score, explanation, source });
        }

        Ok(NativeResponse {
            hits,
            total,
            max_score: best.first().map(|(score, _)| *score),
            segments: searcher.segment_readers().len(),
            took: started.elapsed(),
        })
    }

    fn to_tantivy(&self, id: &str, document: &Document) -> Result<TantivyDocument> {
        let all_path = self.mapping.default_field.as_str();
        if document.get(all_path).is_some() {
            return Err(Error::InvalidDocument(format!("field {all_path:?} is reserved")));
        }

        let mut object: BTreeMap<String, OwnedValue> =
            document.iter().map(|(key, value)| (key.clone(), owned_value(value))).collect();
        let all = document.leaves().into_iter().map(|(_, value)| owned_value(value)).collect();
        object.insert(all_path.to_string(), OwnedValue::Array(all));

        let mut doc = TantivyDocument::default();
        doc.add_text(self.fields.id, id);
        doc.add_object(self.fields.doc, object);
        if self.mapping.store_source {
            let source = serde_json::to_string(document).map_err(|e| Error::InvalidDocument(e.to_string()))?;
            doc.add_text(self.fields.source, source);
        }
        Ok(doc)
    }
}

fn owned_value(value: &FieldValue) -> OwnedValue {
    match value {
        FieldValue::Text(text) => OwnedValue::Str(text.clone()),
        FieldValue::Number(n) => OwnedValue::F64(*n),
        FieldValue::Bool(b) => OwnedValue::Bool(*b),
        FieldValue::Date(date) => OwnedValue::Date(to_tantivy_date(*date)),
        FieldValue::List(items) => OwnedValue::Array(items.iter().map(owned_value).collect()),
        FieldValue::Object(doc) => OwnedValue::Object(doc.iter().map(|(k, v)| (k.clone(), owned_value(v))).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchplan_core::MatchAllQuery;

    use crate::tantivy_utils::SIMPLE_ANALYZER;

    fn handle() -> TantivyHandle {
        TantivyHandle::open(None, &IndexMapping::default()).expect("in-memory index")
    }

    #[test]
    fn resubmitting_an_id_replaces_the_document() {
        let h = handle();
        h.submit("a", &Document::new().with("name", "first")).expect("submit");
        h.submit("a", &Document::new().with("name", "second")).expect("submit");
        assert_eq!(h.num_docs(), 1);
        h.remove("a").expect("remove");
        h.remove("never-there").expect("remove missing");
        assert_eq!(h.num_docs(), 0);
    }

    #[test]
    fn zero_size_page_still_counts() {
        let h = handle();
        for id in ["a", "b", "c"] {
            h.submit(id, &Document::new().with("name", id)).expect("submit");
        }
        let query = h.compiler().compile(&MatchAllQuery::new()).expect("compiles");
        let resp = h.execute(query.as_ref(), ExecuteOptions { size: 0, ..Default::default() }).expect("executes");
        assert!(resp.hits.is_empty());
        assert_eq!(resp.total, 3);
        assert!(resp.max_score.is_some());

        let resp = h
            .execute(query.as_ref(), ExecuteOptions { size: 10, from: 2, load_source: true, ..Default::default() })
            .expect("executes");
        assert_eq!(resp.hits.len(), 1);
        assert!(resp.hits[0].source.as_deref().is_some_and(|s| s.contains("\"name\"")));
    }

    #[test]
    fn oversized_pages_are_clamped() {
        let h = handle();
        for id in ["a", "b"] {
            h.submit(id, &Document::new().with("name", id)).expect("submit");
        }
        let query = h.compiler().compile(&MatchAllQuery::new()).expect("compiles");
        let resp = h.execute(query.as_ref(), ExecuteOptions { size: usize::MAX, ..Default::default() }).expect("executes");
        assert_eq!(resp.hits.len(), 2);
        let resp = h
            .execute(query.as_ref(), ExecuteOptions { size: usize::MAX, from: usize::MAX, ..Default::default() })
            .expect("executes");
        assert!(resp.hits.is_empty());
        assert_eq!(resp.total, 2);
    }

    #[test]
    fn reserved_default_path_is_rejected() {
        let err = handle().submit("a", &Document::new().with("_all", "x")).err();
        assert!(matches!(err, Some(Error::InvalidDocument(_))));
    }

    #[test]
    fn reopening_a_directory_keeps_documents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("idx");
        {
            let h = TantivyHandle::open(Some(&path), &IndexMapping::default()).expect("create");
            h.submit("a", &Document::new().with("name", "kept")).expect("submit");
        }
        let h = TantivyHandle::open(Some(&path), &IndexMapping::default()).expect("reopen");
        assert_eq!(h.num_docs(), 1);
    }

    #[test]
    fn reopening_with_another_analyzer_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("idx");
        drop(TantivyHandle::open(Some(&path), &IndexMapping::default()).expect("create"));

        let simple = IndexMapping { default_analyzer: SIMPLE_ANALYZER.to_string(), ..IndexMapping::default() };
        let err = TantivyHandle::open(Some(&path), &simple).err();
        assert!(matches!(err, Some(Error::InvalidConfig(_))));
        assert!(TantivyHandle::open(Some(&path), &IndexMapping::default()).is_ok());
    }
}
