use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Tunables for a [`Library`](crate::Library).
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub cache: CacheConfig,
    /// Notify the search indexer after each text save.
    pub search_index_on_save: bool,
    /// Derive commentary and citation links after each text save.
    pub derive_links_on_save: bool,
    /// HTML tags kept in saved text; every other tag is stripped.
    pub allowed_tags: Vec<String>,
    /// Context levels used when a request does not name one.
    pub default_context: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            search_index_on_save: true,
            derive_links_on_save: true,
            allowed_tags: ["i", "b", "u", "strong", "em", "big", "small"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_context: 1,
        }
    }
}

impl LibraryConfig {
    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Lifetime of cached text responses; 0 keeps them until invalidated.
    pub text_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            text_ttl_secs: 3600,
        }
    }
}

impl CacheConfig {
    pub fn text_ttl(&self) -> Option<Duration> {
        (self.text_ttl_secs > 0).then(|| Duration::from_secs(self.text_ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = LibraryConfig::default();
        assert!(c.cache.enabled);
        assert_eq!(c.cache.text_ttl(), Some(Duration::from_secs(3600)));
        assert!(c.search_index_on_save);
        assert!(c.derive_links_on_save);
        assert_eq!(c.allowed_tags.len(), 7);
        assert_eq!(c.default_context, 1);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = LibraryConfig::from_toml_str(
            r#"
            derive_links_on_save = false

            [cache]
            text_ttl_secs = 0
            "#,
        )
        .unwrap();
        assert!(!c.derive_links_on_save);
        assert!(c.cache.enabled);
        assert_eq!(c.cache.text_ttl(), None);
        assert_eq!(c.default_context, 1);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = LibraryConfig::from_toml_str("default_context = \"one\"").unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "allowed_tags = [\"b\"]").unwrap();
        let c = LibraryConfig::load(file.path()).unwrap();
        assert_eq!(c.allowed_tags, vec!["b"]);

        assert!(LibraryConfig::load("/nonexistent/lectern.toml").is_err());
    }
}
