//! On-disk persistence for fetched taxonomies.
//!
//! Each (language, category) list is stored as `<root>/<language>/<category>.json`, so a
//! restarted process can serve what it fetched before without touching the network.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::TaxonomyError;
use super::types::{CachedTaxonomy, Category, TaxonomyEntry, TaxonomyKey};

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTaxonomy {
    fetched_at: DateTime<Utc>,
    entries: Vec<TaxonomyEntry>,
}

#[derive(Debug, Clone)]
pub struct TaxonomyStore {
    root: PathBuf,
}

/// Language codes become directory names, so only plain code characters are accepted.
fn is_safe_language(language: &str) -> bool {
    !language.is_empty()
        && language.len() <= 16
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl TaxonomyStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file backing `key`, or `None` if the language is not a safe path segment.
    pub fn path_for(&self, key: &TaxonomyKey) -> Option<PathBuf> {
        if !is_safe_language(&key.language) {
            return None;
        }
        Some(
            self.root
                .join(&key.language)
                .join(format!("{}.json", key.category.as_str())),
        )
    }

    /// Writes `cached` for `key` (temp file + rename, so readers never see partial files).
    pub async fn save(&self, key: &TaxonomyKey, cached: &CachedTaxonomy) -> Result<(), TaxonomyError> {
        let path = self.path_for(key).ok_or_else(|| TaxonomyError::Store {
            path: key.to_string(),
            reason: "language is not a valid path segment".to_string(),
        })?;

        let persisted = PersistedTaxonomy {
            fetched_at: cached.fetched_at(),
            entries: cached.entries().to_vec(),
        };

        tokio::task::spawn_blocking(move || write_atomically(&path, &persisted))
            .await
            .map_err(|e| TaxonomyError::Store {
                path: key.to_string(),
                reason: format!("write task failed: {}", e),
            })?
    }

    /// Reads the persisted list for `key`. Missing files are `Ok(None)`.
    pub async fn load(&self, key: &TaxonomyKey) -> Result<Option<CachedTaxonomy>, TaxonomyError> {
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TaxonomyError::Store {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let persisted: PersistedTaxonomy =
            serde_json::from_slice(&bytes).map_err(|e| TaxonomyError::Store {
                path: path.display().to_string(),
                reason: format!("invalid taxonomy file: {}", e),
            })?;

        if persisted
            .entries
            .iter()
            .any(|entry| entry.category != key.category)
        {
            return Err(TaxonomyError::Store {
                path: path.display().to_string(),
                reason: format!("file contains entries outside {}", key.category),
            });
        }

        Ok(Some(CachedTaxonomy::new(
            persisted.entries,
            persisted.fetched_at,
        )))
    }

    /// Loads every persisted list under the given languages. Unreadable files are skipped.
    pub async fn load_all(&self, languages: &[String]) -> Vec<(TaxonomyKey, CachedTaxonomy)> {
        let mut loaded = Vec::new();

        for language in languages {
            for category in Category::ALL {
                let key = TaxonomyKey::new(language.clone(), category);
                match self.load(&key).await {
                    Ok(Some(cached)) => {
                        debug!(key = %key, entries = cached.len(), "Loaded persisted taxonomy");
                        loaded.push((key, cached));
                    }
                    Ok(None) => {}
                    Err(e) => warn!(key = %key, error = %e, "Skipping unreadable taxonomy file"),
                }
            }
        }

        loaded
    }
}

fn write_atomically(path: &Path, persisted: &PersistedTaxonomy) -> Result<(), TaxonomyError> {
    let store_error = |reason: String| TaxonomyError::Store {
        path: path.display().to_string(),
        reason,
    };

    let parent = path
        .parent()
        .ok_or_else(|| store_error("path has no parent directory".to_string()))?;
    std::fs::create_dir_all(parent)
        .map_err(|e| store_error(format!("failed to create directory: {}", e)))?;

    let json = serde_json::to_vec_pretty(persisted)
        .map_err(|e| store_error(format!("serialization failed: {}", e)))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| store_error(format!("failed to create temp file: {}", e)))?;
    temp.write_all(&json)
        .map_err(|e| store_error(format!("write failed: {}", e)))?;
    temp.flush()
        .map_err(|e| store_error(format!("flush failed: {}", e)))?;
    temp.persist(path)
        .map_err(|e| store_error(format!("rename failed: {}", e.error)))?;

    Ok(())
}
