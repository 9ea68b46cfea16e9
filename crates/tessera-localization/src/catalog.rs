//! Localization catalog
//!
//! Lookups are total over keys: a missing mapping for the given
//! culture or channel returns the key verbatim. The culture is always
//! an explicit parameter; concurrent request handling cannot rely on
//! thread affinity for context propagation.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use tessera_errors::{invalid_argument, localization, DataResult};

use crate::reader::{read_localization_files, ResourceValue};

/// Culture tag, e.g. `en-US` or `pt-BR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Culture(String);

impl Culture {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Culture {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl From<String> for Culture {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl std::fmt::Display for Culture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Culture configuration, bound from application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CultureSettings {
    pub default_culture: Culture,
}

impl Default for CultureSettings {
    fn default() -> Self {
        Self {
            default_culture: Culture::from("en-US"),
        }
    }
}

/// Immutable per-culture key/string catalog, loaded once at startup.
#[derive(Debug)]
pub struct Catalog {
    tables: HashMap<Culture, HashMap<String, Vec<ResourceValue>>>,
}

impl Catalog {
    /// Load every `localization*.json` file under `base_dir`.
    ///
    /// Files without a culture segment in the name bind to
    /// `settings.default_culture`. I/O and parse failures fail the
    /// load with `ERR_LOCALIZATION`, wrapping the reader error.
    pub fn load(base_dir: &Path, settings: &CultureSettings) -> DataResult<Self> {
        let tables = read_localization_files(base_dir, &settings.default_culture)
            .map_err(|e| localization("failed to load localization catalog", e))?;
        Ok(Self { tables })
    }

    /// An empty catalog; every lookup falls back to the key.
    pub fn empty() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Number of cultures with at least one mapping.
    pub fn culture_count(&self) -> usize {
        self.tables.len()
    }

    /// Resolve `key` for a culture and optional channel.
    ///
    /// Resolution order: channel-specific value, then the culture's
    /// channel-less default, then the key itself verbatim. Only an
    /// empty key is an error.
    pub fn get(
        &self,
        key: &str,
        culture: &Culture,
        channel: Option<&str>,
    ) -> DataResult<String> {
        if key.is_empty() {
            return Err(invalid_argument("localization.get", "key must not be empty"));
        }

        let Some(values) = self.tables.get(culture).and_then(|table| table.get(key)) else {
            return Ok(key.to_string());
        };

        if let Some(channel) = channel {
            if let Some(matched) = values
                .iter()
                .find(|v| v.channel.as_deref() == Some(channel))
            {
                return Ok(matched.value.clone());
            }
        }
        if let Some(default) = values.iter().find(|v| v.channel.is_none()) {
            return Ok(default.value.clone());
        }
        Ok(key.to_string())
    }
}
