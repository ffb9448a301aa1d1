//! Localized species names.
//!
//! Translations are best-effort decoration: a missing animal entry or an
//! unknown language code resolves to the fallback label instead of an
//! error.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::catalog::DataLoadError;

/// Label returned when no matching translation exists.
pub const FALLBACK_LABEL: &str = "Unknown";

/// Immutable animal name -> {language code -> label} table.
///
/// An animal present in the catalog need not appear here, and a present
/// entry need not cover every language a client might request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl TranslationTable {
    /// Load a translation export from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse a translation export from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, DataLoadError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolve the localized label for an animal, falling back to
    /// [`FALLBACK_LABEL`]. Never fails.
    pub fn resolve(&self, animal: &str, lang: Option<&str>) -> String {
        self.resolve_or(animal, lang, FALLBACK_LABEL)
    }

    /// Same as [`resolve`](Self::resolve) with a caller-chosen fallback.
    pub fn resolve_or(&self, animal: &str, lang: Option<&str>, fallback: &str) -> String {
        let Some(entry) = self.entries.get(animal) else {
            return fallback.to_string();
        };
        lang.and_then(|code| entry.get(code))
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn animal_count(&self) -> usize {
        self.entries.len()
    }
}
