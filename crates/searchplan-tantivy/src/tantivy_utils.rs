use chrono::{DateTime, Utc};
use tantivy::schema::{
    Field, FieldType, IndexRecordOption, JsonObjectOptions, Schema, TextFieldIndexing, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

use searchplan_core::config::IndexMapping;
use searchplan_core::{Error, Result};

/// Exact, stored document identifier.
pub const ID_FIELD: &str = "_id";
/// Every submitted value, addressed by JSON path.
pub const DOC_FIELD: &str = "_doc";
/// Submitted document serialized as JSON, stored only.
pub const SOURCE_FIELD: &str = "_source";

/// Analyzers registered on every index, besides tantivy's built-ins.
pub const STANDARD_ANALYZER: &str = "standard";
pub const SIMPLE_ANALYZER: &str = "simple";

const MAX_TOKEN_LEN: usize = 255;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it", "no", "not",
    "of", "on", "or", "such", "that", "the", "their", "then", "there", "these", "they", "this", "to", "was",
    "will", "with",
];

pub fn build_schema(mapping: &IndexMapping) -> Schema {
    let mut schema_builder = Schema::builder();
    let _id_field = schema_builder.add_text_field(ID_FIELD, STRING | STORED);
    let doc_indexing = TextFieldIndexing::default()
        .set_tokenizer(&mapping.default_analyzer)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let doc_options = JsonObjectOptions::default()
        .set_indexing_options(doc_indexing)
        .set_expand_dots_enabled()
        .set_fast(None);
    let _doc_field = schema_builder.add_json_field(DOC_FIELD, doc_options);
    let _source_field = schema_builder.add_text_field(SOURCE_FIELD, STORED);
    schema_builder.build()
}

/// Analyzer the `_doc` field of an existing schema was indexed with.
pub fn indexed_analyzer(schema: &Schema, doc: Field) -> Option<&str> {
    match schema.get_field_entry(doc).field_type() {
        FieldType::JsonObject(options) => options.get_text_indexing_options().map(TextFieldIndexing::tokenizer),
        _ => None,
    }
}

pub fn register_tokenizer(index: &Index) {
    let standard = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
        .build();
    index.tokenizers().register(STANDARD_ANALYZER, standard);

    let simple = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .build();
    index.tokenizers().register(SIMPLE_ANALYZER, simple);
}

pub fn to_tantivy_date(date: DateTime<Utc>) -> tantivy::DateTime {
    tantivy::DateTime::from_timestamp_micros(date.timestamp_micros())
}

/// Resolved schema fields of an index built by [`build_schema`].
#[derive(Debug, Clone, Copy)]
pub struct FieldHandles {
    pub id: Field,
    pub doc: Field,
    pub source: Field,
}

impl FieldHandles {
    pub fn from_schema(schema: &Schema) -> Result<Self> {
        let get = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| Error::InvalidConfig(format!("index schema has no {name:?} field")))
        };
        Ok(Self { id: get(ID_FIELD)?, doc: get(DOC_FIELD)?, source: get(SOURCE_FIELD)? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tantivy::tokenizer::TokenStream;

    fn tokens(index: &Index, analyzer: &str, text: &str) -> Vec<(usize, String)> {
        let mut analyzer = index.tokenizers().get(analyzer).expect("registered analyzer");
        let mut stream = analyzer.token_stream(text);
        let mut out = Vec::new();
        while stream.advance() {
            let token = stream.token();
            out.push((token.position, token.text.clone()));
        }
        out
    }

    #[test]
    fn schema_has_reserved_fields() {
        let schema = build_schema(&IndexMapping::default());
        let handles = FieldHandles::from_schema(&schema).expect("fields");
        assert_eq!(schema.get_field_name(handles.id), ID_FIELD);
        assert_eq!(schema.get_field_name(handles.doc), DOC_FIELD);
        assert_eq!(schema.get_field_name(handles.source), SOURCE_FIELD);
    }

    #[test]
    fn schema_records_the_mapping_analyzer() {
        let simple = IndexMapping { default_analyzer: SIMPLE_ANALYZER.to_string(), ..IndexMapping::default() };
        let schema = build_schema(&simple);
        let handles = FieldHandles::from_schema(&schema).expect("fields");
        assert_eq!(indexed_analyzer(&schema, handles.doc), Some(SIMPLE_ANALYZER));
        assert_eq!(indexed_analyzer(&schema, handles.id), None);
    }

    #[test]
    fn standard_analyzer_drops_stop_words_but_keeps_positions() {
        let index = Index::create_in_ram(build_schema(&IndexMapping::default()));
        register_tokenizer(&index);
        assert_eq!(tokens(&index, STANDARD_ANALYZER, "Lift it UP"), vec![(0, "lift".to_string()), (2, "up".to_string())]);
        assert_eq!(
            tokens(&index, SIMPLE_ANALYZER, "Lift it"),
            vec![(0, "lift".to_string()), (1, "it".to_string())]
        );
    }
}
