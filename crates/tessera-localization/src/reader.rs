//! Resource-file discovery and parsing
//!
//! Files are named `localization.json` (default culture) or
//! `localization.<culture>.json`, discovered recursively under the
//! base directory. Any I/O or parse failure aborts the load with a
//! `ReaderError`; a catalog is never half-loaded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::catalog::Culture;

/// Reader-specific failure during the one-time catalog load.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("cannot walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One channel-scoped value of a resource item. A value without a
/// channel is the culture-wide default.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceValue {
    #[serde(default)]
    pub channel: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceItem {
    pub key: String,
    pub values: Vec<ResourceValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceFile {
    pub items: Vec<ResourceItem>,
}

/// Parse a discovered file name into its culture segment.
/// `localization.json` has none; `localization.pt-BR.json` names one;
/// anything else is not a localization file.
fn culture_segment(file_name: &str) -> Option<Option<&str>> {
    let parts: Vec<&str> = file_name.split('.').collect();
    match parts.as_slice() {
        ["localization", "json"] => Some(None),
        ["localization", culture, "json"] => Some(Some(culture)),
        _ => None,
    }
}

/// Read every localization file under `base_dir` into per-culture key
/// tables.
pub fn read_localization_files(
    base_dir: &Path,
    default_culture: &Culture,
) -> Result<HashMap<Culture, HashMap<String, Vec<ResourceValue>>>, ReaderError> {
    let mut tables: HashMap<Culture, HashMap<String, Vec<ResourceValue>>> = HashMap::new();

    for entry in WalkDir::new(base_dir) {
        let entry = entry.map_err(|source| ReaderError::Walk {
            path: base_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(segment) = culture_segment(file_name) else {
            continue;
        };
        let culture = segment
            .map(Culture::from)
            .unwrap_or_else(|| default_culture.clone());

        let path = entry.path();
        let json = std::fs::read_to_string(path).map_err(|source| ReaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ResourceFile =
            serde_json::from_str(&json).map_err(|source| ReaderError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            culture = %culture,
            items = file.items.len(),
            path = %path.display(),
            "localization file loaded"
        );

        let table = tables.entry(culture).or_default();
        for item in file.items {
            table.insert(item.key, item.values);
        }
    }

    Ok(tables)
}
