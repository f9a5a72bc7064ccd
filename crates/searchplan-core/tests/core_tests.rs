use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use searchplan_core::{
    BoolFieldQuery, BooleanQuery, Bound, DateRangeQuery, Document, FieldValue, IdsQuery, MatchQuery, Operator,
    Query, QueryType, SearchRequest, ToQueryPlan,
};

#[test]
fn nested_boolean_plan_lowers_every_clause() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single().expect("valid date");
    let query: Query = BooleanQuery::new()
        .with_must(MatchQuery::new("bar").with_operator(Operator::And))
        .with_should(DateRangeQuery::new(start, start + Duration::days(7)).with_field("nested.date"))
        .with_must_not(IdsQuery::new(["foo2"]))
        .with_boost(3.0)
        .into();

    let plan = query.query_plan();
    assert_eq!(plan.query_type, QueryType::Boolean);
    assert_eq!(plan.boost_value(), 3.0);

    let must = plan.must[0].query_plan();
    assert_eq!(must.operator, Operator::And);

    let should = plan.should[0].query_plan();
    assert_eq!(should.field.as_deref(), Some("nested.date"));
    assert_eq!(should.min, Bound::Date(start));
    assert!(should.inclusive_min && !should.inclusive_max);

    let must_not = plan.must_not[0].query_plan();
    assert_eq!(must_not.matches, vec!["foo2".to_string()]);
    assert!(plan.validate().is_ok());
}

#[test]
fn request_serializes_with_tagged_query() -> anyhow::Result<()> {
    let req = SearchRequest::new(BoolFieldQuery::new(true).with_field("nest.first"))
        .with_size(5)
        .with_fields(["nest.first"])
        .with_explain(true);
    let value = serde_json::to_value(&req)?;
    assert_eq!(value["query"]["type"], json!("bool_field"));
    assert_eq!(value["query"]["field"], json!("nest.first"));
    assert_eq!(value["size"], json!(5));
    assert_eq!(value["explain"], json!(true));
    Ok(())
}

#[test]
fn documents_from_json_keep_nested_paths() -> anyhow::Result<()> {
    let doc = Document::try_from(json!({
        "nest": {"second": "bit", "third": "lift it up"},
        "score": 7
    }))?;
    assert_eq!(doc.get("nest.second"), Some(&FieldValue::Text("bit".into())));
    assert_eq!(doc.get("score"), Some(&FieldValue::Number(7.0)));
    let paths: Vec<String> = doc.leaves().into_iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["nest.second", "nest.third", "score"]);
    Ok(())
}
