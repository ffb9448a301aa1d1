//! Animal image catalog loaded from a JSON export.
//!
//! The catalog is produced out-of-band and read once at startup. After
//! loading it is shared read-only across all requests, so no locking is
//! needed anywhere in the lookup path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File extension shared by every catalog image.
pub const IMAGE_EXT: &str = "jpg";

/// Failure to load one of the startup data files. Always fatal: the
/// process must not come up with a missing or malformed catalog.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read data file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog contains no animals")]
    NoAnimals,

    #[error("animal '{name}' has no image identifiers")]
    EmptyAnimal { name: String },
}

/// Immutable name -> {id -> filename} table plus the URL prefix shared
/// by all image URLs.
///
/// Ordered maps keep iteration deterministic, which the seeded-RNG tests
/// of the lookup resolver depend on.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimalCatalog {
    path: String,
    animals: BTreeMap<String, BTreeMap<String, String>>,
}

impl AnimalCatalog {
    /// Load and validate a catalog export from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a catalog export from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, DataLoadError> {
        let catalog: Self = serde_json::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Every animal must carry at least one image identifier. Identifiers
    /// are opaque numeric-string keys and need not be contiguous.
    fn validate(&self) -> Result<(), DataLoadError> {
        if self.animals.is_empty() {
            return Err(DataLoadError::NoAnimals);
        }
        for (name, ids) in &self.animals {
            if ids.is_empty() {
                return Err(DataLoadError::EmptyAnimal { name: name.clone() });
            }
        }
        Ok(())
    }

    /// URL path prefix shared by all image URLs.
    pub fn base_path(&self) -> &str {
        &self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.animals.contains_key(name)
    }

    /// All animal names, in key order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.animals.keys()
    }

    /// Image identifiers registered for one animal, in key order.
    pub fn ids(&self, name: &str) -> Option<impl Iterator<Item = &String>> {
        self.animals.get(name).map(|ids| ids.keys())
    }

    pub fn animal_count(&self) -> usize {
        self.animals.len()
    }

    /// Construct the image URL for a name/id pair. The id is not checked
    /// against the catalog here; callers decide how strict to be.
    pub fn image_url(&self, name: &str, id: &str) -> String {
        format!("{}/{name}/{name}-{id}.{IMAGE_EXT}", self.path)
    }
}
