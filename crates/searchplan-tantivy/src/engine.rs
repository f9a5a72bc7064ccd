use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use searchplan_core::config::Settings;
use searchplan_core::{Engine, Error, Result};

use crate::handle::TantivyHandle;
use crate::index::{IndexConfig, TantivyIndex};

/// A fixed set of tantivy indices, opened once and addressed by name.
pub struct TantivyEngine {
    indices: HashMap<String, Arc<TantivyHandle>>,
}

impl TantivyEngine {
    /// Opens every index in `configs`. At least one is required and names
    /// must be unique; the first failing index aborts construction.
    pub fn open(configs: impl IntoIterator<Item = IndexConfig>) -> Result<Self> {
        let mut indices = HashMap::new();
        for config in configs {
            if indices.contains_key(&config.name) {
                return Err(Error::InvalidConfig(format!("duplicate index name {:?}", config.name)));
            }
            let handle = config.setup()?;
            debug!(index = %config.name, path = ?config.path, "index ready");
            indices.insert(config.name, Arc::new(handle));
        }
        if indices.is_empty() {
            return Err(Error::InvalidConfig("at least one index is required".into()));
        }
        Ok(Self { indices })
    }

    /// Opens the indices listed in loaded [`Settings`].
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::open(settings.indices.iter().map(|index| IndexConfig {
            name: index.name.clone(),
            path: settings.index_path(index),
            mapping: index.mapping.clone(),
        }))
    }
}

impl Engine for TantivyEngine {
    type Index = TantivyIndex;

    fn index(&self, name: &str) -> TantivyIndex {
        match self.indices.get(name) {
            Some(handle) => TantivyIndex::bound(name, Arc::clone(handle)),
            None => TantivyIndex::unknown(name),
        }
    }

    fn indices(&self) -> Vec<TantivyIndex> {
        self.indices.iter().map(|(name, handle)| TantivyIndex::bound(name, Arc::clone(handle))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchplan_core::{Context, Index, MatchAllQuery};

    #[test]
    fn rejects_empty_and_duplicate_configs() {
        assert!(matches!(TantivyEngine::open(Vec::new()), Err(Error::InvalidConfig(_))));
        let dup = TantivyEngine::open([IndexConfig::in_memory("a"), IndexConfig::in_memory("a")]);
        assert!(matches!(dup, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn unknown_index_fails_on_every_call() {
        let engine = TantivyEngine::open([IndexConfig::in_memory("base")]).expect("engine");
        let missing = engine.index("nope");
        assert_eq!(missing.name(), "nope");
        let ctx = Context::background();
        for _ in 0..2 {
            let err = missing.search(&ctx, &MatchAllQuery::new().into()).err();
            assert!(matches!(err, Some(Error::UnknownIndex(ref n)) if n == "nope"));
        }
        assert!(matches!(missing.count(&ctx), Err(Error::UnknownIndex(_))));
    }

    #[test]
    fn builds_from_settings() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "indices": [{"name": "a"}, {"name": "b", "default_analyzer": "simple"}]
        }))
        .expect("settings");
        let engine = TantivyEngine::from_settings(&settings).expect("engine");
        let mut names: Vec<String> = engine.indices().iter().map(|i| i.name().to_string()).collect();
        names.sort();
        assert_eq!(names, ["a", "b"]);
    }
}
