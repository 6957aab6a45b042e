use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::TaxonomyError;

/// A ReliefWeb vocabulary the service classifies against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Theme,
    Country,
    DisasterType,
}

impl Category {
    /// Every category, in response order.
    pub const ALL: [Category; 3] = [Category::Theme, Category::Country, Category::DisasterType];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Theme => "theme",
            Category::Country => "country",
            Category::DisasterType => "disaster_type",
        }
    }

    /// Path of the category's list endpoint, relative to the API root.
    #[inline]
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Theme => "references/themes",
            Category::Country => "countries",
            Category::DisasterType => "references/disaster-types",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "theme" | "themes" => Ok(Category::Theme),
            "country" | "countries" => Ok(Category::Country),
            "disaster_type" | "disaster_types" => Ok(Category::DisasterType),
            _ => Err(TaxonomyError::UnknownCategory {
                value: s.to_string(),
            }),
        }
    }
}

/// One labelled entry of a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    /// Identifier, unique within (language, category).
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
}

impl TaxonomyEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            category,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Cache key: one taxonomy list per (language, category).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxonomyKey {
    pub language: String,
    pub category: Category,
}

impl TaxonomyKey {
    pub fn new(language: impl Into<String>, category: Category) -> Self {
        Self {
            language: language.into(),
            category,
        }
    }
}

impl std::fmt::Display for TaxonomyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.language, self.category)
    }
}

/// An entry list together with the time it was fetched from the source.
#[derive(Debug, Clone)]
pub struct CachedTaxonomy {
    entries: Arc<[TaxonomyEntry]>,
    fetched_at: DateTime<Utc>,
}

impl CachedTaxonomy {
    /// Builds a cached list, dropping entries whose id repeats an earlier one.
    pub fn new(entries: Vec<TaxonomyEntry>, fetched_at: DateTime<Utc>) -> Self {
        let mut seen = HashSet::with_capacity(entries.len());
        let total = entries.len();
        let entries: Vec<TaxonomyEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.id.clone()))
            .collect();

        if entries.len() != total {
            tracing::warn!(
                dropped = total - entries.len(),
                "Dropped taxonomy entries with duplicate ids"
            );
        }

        Self {
            entries: entries.into(),
            fetched_at,
        }
    }

    #[inline]
    pub fn entries(&self) -> &Arc<[TaxonomyEntry]> {
        &self.entries
    }

    #[inline]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a cache read.
#[derive(Debug, Clone)]
pub struct TaxonomyLookup {
    pub entries: Arc<[TaxonomyEntry]>,
    pub fetched_at: DateTime<Utc>,
    /// `true` when a refresh failed and the previous list was served instead.
    pub stale: bool,
}

impl TaxonomyLookup {
    pub(crate) fn from_cached(cached: &CachedTaxonomy, stale: bool) -> Self {
        Self {
            entries: Arc::clone(&cached.entries),
            fetched_at: cached.fetched_at,
            stale,
        }
    }
}
