//! Converts a [`NativeResponse`] into the engine-neutral [`SearchResult`].

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use tantivy::query::Explanation as TantivyExplanation;

use searchplan_core::document::PATH_SEPARATOR;
use searchplan_core::types::ALL_FIELDS;
use searchplan_core::{Explanation, Hit, SearchResult, Status};

use crate::handle::{NativeHit, NativeResponse};

pub fn normalize(index_name: &str, response: NativeResponse, fields: &[String]) -> SearchResult {
    let hits = response.hits.into_iter().map(|hit| normalize_hit(index_name, hit, fields)).collect();
    SearchResult {
        status: Some(Status { total: response.segments, failed: 0, successful: response.segments }),
        hits,
        total: response.total as u64,
        max_score: response.max_score.map_or(0.0, f64::from),
        took: response.took,
    }
}

fn normalize_hit(index_name: &str, hit: NativeHit, fields: &[String]) -> Hit {
    Hit {
        index: index_name.to_string(),
        id: hit.id,
        score: f64::from(hit.score),
        // Only relevance ordering is supported, so there are no sort keys.
        sort: Vec::new(),
        explanation: hit.explanation.as_ref().map(convert_explanation),
        fields: hit.source.as_deref().map(|source| extract_fields(source, fields)).unwrap_or_default(),
    }
}

/// Copies the whole explanation tree, every level deep.
pub fn convert_explanation(explanation: &TantivyExplanation) -> Explanation {
    match serde_json::to_value(explanation) {
        Ok(json) => explanation_from_json(&json),
        Err(_) => Explanation { value: f64::from(explanation.value()), message: String::new(), children: Vec::new() },
    }
}

fn explanation_from_json(json: &JsonValue) -> Explanation {
    Explanation {
        value: json.get("value").and_then(JsonValue::as_f64).unwrap_or_default(),
        message: json.get("description").and_then(JsonValue::as_str).unwrap_or_default().to_string(),
        children: json
            .get("details")
            .and_then(JsonValue::as_array)
            .map(|details| details.iter().map(explanation_from_json).collect())
            .unwrap_or_default(),
    }
}

/// Picks the requested paths out of a stored source document. `*` returns
/// every leaf under its dotted path; missing paths are left out.
pub fn extract_fields(source: &str, requested: &[String]) -> BTreeMap<String, JsonValue> {
    let mut out = BTreeMap::new();
    if requested.is_empty() {
        return out;
    }
    let Ok(root) = serde_json::from_str::<JsonValue>(source) else {
        return out;
    };
    for path in requested {
        if path == ALL_FIELDS {
            collect_leaves(&root, String::new(), &mut out);
        } else if let Some(value) = lookup(&root, path) {
            out.insert(path.clone(), value.clone());
        }
    }
    out
}

fn lookup<'a>(root: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split(PATH_SEPARATOR).try_fold(root, |node, key| node.get(key)).filter(|v| !v.is_null())
}

fn collect_leaves(node: &JsonValue, prefix: String, out: &mut BTreeMap<String, JsonValue>) {
    match node {
        JsonValue::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}{PATH_SEPARATOR}{key}") };
                collect_leaves(child, path, out);
            }
        }
        JsonValue::Null => {}
        leaf => {
            out.insert(prefix, leaf.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explanation_keeps_grandchildren() {
        let mut leaf_parent = TantivyExplanation::new("weight(tf)", 1.5);
        leaf_parent.add_detail(TantivyExplanation::new("termFreq", 1.0));
        let mut root = TantivyExplanation::new("sum of", 2.5);
        root.add_detail(leaf_parent);
        root.add_detail(TantivyExplanation::new("boost", 1.0));

        let converted = convert_explanation(&root);
        assert_eq!(converted.message, "sum of");
        assert_eq!(converted.value, 2.5);
        assert_eq!(converted.children.len(), 2);
        assert_eq!(converted.children[0].children[0].message, "termFreq");
        assert_eq!(converted.depth(), 3);
    }

    #[test]
    fn extracts_requested_and_all_fields() {
        let source = json!({"nest": {"second": "bit", "list": [1.0, 2.0]}, "name": "x"}).to_string();
        let picked = extract_fields(&source, &["nest.second".to_string(), "missing".to_string()]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked["nest.second"], json!("bit"));

        let all = extract_fields(&source, &[ALL_FIELDS.to_string()]);
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["name", "nest.list", "nest.second"]);
        assert_eq!(all["nest.list"], json!([1.0, 2.0]));
    }

    #[test]
    fn nothing_requested_means_no_fields() {
        assert!(extract_fields("{\"a\":1}", &[]).is_empty());
    }
}
