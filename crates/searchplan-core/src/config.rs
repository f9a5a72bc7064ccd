use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Path every leaf value is copied under; queries without a field use it.
pub const DEFAULT_FIELD: &str = "_all";
/// Analyzer applied to text unless a query overrides it.
pub const DEFAULT_ANALYZER: &str = "standard";
/// Indexing memory budget handed to the engine's writer.
pub const DEFAULT_WRITER_MEMORY: usize = 50_000_000;

/// How documents are laid out in one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexMapping {
    pub default_field: String,
    pub default_analyzer: String,
    pub writer_memory_bytes: usize,
    /// Keep the submitted document so hits can return field values.
    pub store_source: bool,
}

impl Default for IndexMapping {
    fn default() -> Self {
        Self {
            default_field: DEFAULT_FIELD.to_string(),
            default_analyzer: DEFAULT_ANALYZER.to_string(),
            writer_memory_bytes: DEFAULT_WRITER_MEMORY,
            store_source: true,
        }
    }
}

/// One entry of the `indices` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    pub name: String,
    /// Directory holding the index; omitted means in-memory.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(flatten)]
    pub mapping: IndexMapping,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub indices: Vec<IndexSettings>,
    /// Base directory for relative index paths; defaults to the working directory.
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl Settings {
    /// Merges `searchplan.toml`, `searchplan.<env>.toml` (from `RUST_ENV`)
    /// and `SEARCHPLAN_*` environment variables.
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("searchplan.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("searchplan.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("searchplan.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("searchplan.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("SEARCHPLAN_").split("__"));

        Self::from_figment(&figment)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(format!("failed to load settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for index in &self.indices {
            if index.name.is_empty() {
                return Err(Error::InvalidConfig("index name must not be empty".into()));
            }
            if !seen.insert(index.name.as_str()) {
                return Err(Error::InvalidConfig(format!("duplicate index name {:?}", index.name)));
            }
            if index.mapping.default_field.is_empty() {
                return Err(Error::InvalidConfig(format!("index {:?} has an empty default_field", index.name)));
            }
        }
        Ok(())
    }

    /// Resolves the storage directory of an index against `data_dir`.
    pub fn index_path(&self, index: &IndexSettings) -> Option<PathBuf> {
        let path = index.path.as_deref()?;
        let base = self.data_dir.as_deref().map(expand_path).unwrap_or_else(|| PathBuf::from("."));
        Some(resolve_with_base(&base, path))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn loads_indices_from_toml_and_env() {
        Jail::expect_with(|jail| {
            jail.set_env("RUST_ENV", "test");
            jail.create_file(
                "searchplan.toml",
                r#"
                data_dir = "/var/lib/search"

                [[indices]]
                name = "base"
                path = "base.idx"

                [[indices]]
                name = "scratch"
                default_analyzer = "raw"
                "#,
            )?;
            jail.create_file("searchplan.test.toml", "data_dir = \"/tmp/search\"")?;

            let settings = Settings::load().expect("settings");
            assert_eq!(settings.indices.len(), 2);
            assert_eq!(settings.indices[0].name, "base");
            assert_eq!(settings.indices[0].mapping, IndexMapping::default());
            assert_eq!(settings.indices[1].mapping.default_analyzer, "raw");
            assert_eq!(settings.index_path(&settings.indices[0]), Some(PathBuf::from("/tmp/search/base.idx")));
            assert_eq!(settings.index_path(&settings.indices[1]), None);
            Ok(())
        });
    }

    #[test]
    fn rejects_duplicate_names() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "searchplan.toml",
                r#"
                [[indices]]
                name = "a"

                [[indices]]
                name = "a"
                "#,
            )?;
            assert!(matches!(Settings::load(), Err(Error::InvalidConfig(_))));
            Ok(())
        });
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let base = Path::new("/base");
        assert_eq!(resolve_with_base(base, "/abs/idx"), PathBuf::from("/abs/idx"));
        assert_eq!(resolve_with_base(base, "rel/idx"), PathBuf::from("/base/rel/idx"));
    }
}
