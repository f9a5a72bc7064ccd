use serde_json::json;

use searchplan_core::config::IndexMapping;
use searchplan_core::{
    Context, Document, Engine, Error, Index, MatchQuery, QueryType, SearchRequest, TermQuery, WildcardQuery,
};
use searchplan_tantivy::{IndexConfig, TantivyEngine};

fn json_doc(value: serde_json::Value) -> Document {
    Document::try_from(value).expect("valid document")
}

#[test]
fn tantivy_full_flow() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("articles.idx");
    let ctx = Context::background();

    {
        let engine = TantivyEngine::open([IndexConfig::on_disk("articles", &path)]).expect("engine");
        let index = engine.index("articles");
        let docs = [
            ("fire", json!({"title": "Fire craft", "body": "starting a fire without matches", "meta": {"pages": 12}})),
            ("net", json!({"title": "Networking", "body": "mesh radios and antennas", "meta": {"pages": 40}})),
            ("pc", json!({"title": "Computer repair", "body": "replacing a fire damaged board", "meta": {"pages": 25}})),
        ];
        for (id, value) in docs {
            index.index(&ctx, id, &json_doc(value)).expect("index");
        }
        assert_eq!(index.count(&ctx).expect("count"), 3);
    }

    // Reopening the same directory keeps every document.
    let engine = TantivyEngine::open([IndexConfig::on_disk("articles", &path)]).expect("reopen");
    let index = engine.index("articles");
    assert_eq!(index.count(&ctx).expect("count"), 3);

    let request = SearchRequest::new(MatchQuery::new("fire")).with_fields(["title", "meta.pages"]).with_explain(true);
    let result = index.search_request(&ctx, &request).expect("search");
    eprintln!("{result}");
    assert_eq!(result.total, 2);
    assert_eq!(result.hits.len(), 2);
    assert!(result.hits[0].score >= result.hits[1].score);
    assert!((result.max_score - result.hits[0].score).abs() < 1e-6);
    let status = result.status.expect("status");
    assert_eq!(status.failed, 0);
    assert_eq!(status.total, status.successful);

    let fire = result.hits.iter().find(|h| h.id == "fire").expect("fire hit");
    assert_eq!(fire.index, "articles");
    assert_eq!(fire.fields.get("title"), Some(&json!("Fire craft")));
    assert_eq!(fire.fields.get("meta.pages"), Some(&json!(12.0)));
    assert!(fire.sort.is_empty());
    assert!(fire.explanation.is_some());

    let nested = index.search(&ctx, &TermQuery::new("antennas").with_field("body").into()).expect("term");
    assert_eq!(nested.ids(), vec!["net"]);
}

#[test]
fn unsupported_and_invalid_queries() {
    let engine = TantivyEngine::open([IndexConfig::in_memory("base")]).expect("engine");
    let index = engine.index("base");
    let ctx = Context::background();
    index.index(&ctx, "a", &Document::new().with("name", "foobar")).expect("index");

    let err = index.search(&ctx, &WildcardQuery::new("foo*").into()).err();
    assert!(matches!(err, Some(Error::UnsupportedQueryType(QueryType::Wildcard))));

    let err = index.search(&ctx, &MatchQuery::new("fobarhm").with_fuzziness(3).into()).err();
    assert!(matches!(err, Some(Error::InvalidQuery(_))));
}

#[test]
fn custom_default_field_and_analyzer() {
    let mapping = IndexMapping { default_field: "_everything".into(), default_analyzer: "simple".into(), ..Default::default() };
    let engine = TantivyEngine::open([IndexConfig::in_memory("base").with_mapping(mapping)]).expect("engine");
    let index = engine.index("base");
    let ctx = Context::background();
    index.index(&ctx, "a", &Document::new().with("text", "lift it up")).expect("index");

    // The simple analyzer keeps stop words.
    let result = index.search(&ctx, &TermQuery::new("it").into()).expect("search");
    assert_eq!(result.ids(), vec!["a"]);

    let unknown = TantivyEngine::open([IndexConfig::in_memory("bad").with_mapping(IndexMapping {
        default_analyzer: "klingon".into(),
        ..Default::default()
    })]);
    assert!(matches!(unknown, Err(Error::InvalidConfig(_))));
}
