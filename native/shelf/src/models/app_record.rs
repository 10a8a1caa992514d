use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Text used for `whats_new` when the source has no release notes.
pub const NO_UPDATES_SENTINEL: &str = "No recent updates provided.";

/// Publication state of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    #[default]
    Published,
    Draft,
}

/// A single user review attached to an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub avatar: String,
    /// 0 to 5
    pub rating: f32,
    pub text: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Canonical representation of one application in the catalog.
///
/// Produced either by normalizing a backend payload or by loading the
/// bundled fallback dataset. Every field always has a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    /// Package/store identifier
    pub id: String,
    /// Lookup key, always equal to `id`
    pub slug: String,
    pub name: String,
    pub developer: String,
    #[serde(default)]
    pub developer_website: String,
    #[serde(default)]
    pub privacy_policy: String,
    pub icon: String,
    #[serde(default)]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub short_description: String,
    /// May contain HTML markup
    #[serde(default)]
    pub full_description: String,
    #[serde(default = "default_whats_new")]
    pub whats_new: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub version: String,
    /// Size in MB. The scraping backend does not report it, so live records carry 0.
    #[serde(default)]
    pub file_size: f64,
    #[serde(default)]
    pub min_android_version: String,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub ratings_count: u64,
    #[serde(default)]
    pub reviews_count: u64,
    #[serde(default)]
    pub average_rating: f32,
    /// Rating counts for 1 through 5 stars
    #[serde(default)]
    pub histogram: [u64; 5],
    #[serde(default)]
    pub reviews: Vec<ReviewRecord>,
    #[serde(default)]
    pub content_rating: String,
    #[serde(default)]
    pub permissions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub data_safety: Vec<String>,
    #[serde(default)]
    pub status: AppStatus,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub updated_at: String,
}

fn default_whats_new() -> String {
    NO_UPDATES_SENTINEL.to_string()
}

impl AppRecord {
    /// Total number of ratings counted in the histogram, saturating at `u64::MAX`.
    pub fn histogram_total(&self) -> u64 {
        self.histogram.iter().fold(0u64, |acc, &n| acc.saturating_add(n))
    }
}
