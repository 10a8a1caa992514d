use std::{collections::HashSet, path::Path};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::models::{AppRecord, CategoryRecord};

const BUNDLED_DATASET: &str = include_str!("../../data/fallback.json");

/// Static app and category records served when the backend cannot answer.
///
/// Immutable once loaded. The catalog holds it behind an `Arc` and only
/// ever reads from it.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackDataset {
    apps: Vec<AppRecord>,
    #[serde(default)]
    categories: Vec<CategoryRecord>,
}

impl FallbackDataset {
    /// The dataset compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_DATASET).context("Failed to load bundled fallback dataset")
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: FallbackDataset =
            serde_json::from_str(json).context("Failed to parse fallback dataset")?;
        dataset.validate()?;
        Ok(dataset)
    }

    #[instrument(skip(path), fields(path = %path.as_ref().display()), err)]
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs_err::read_to_string(path)?;
        let dataset = Self::from_json_str(&content)?;
        debug!(
            apps = dataset.apps.len(),
            categories = dataset.categories.len(),
            "Loaded fallback dataset from file"
        );
        Ok(dataset)
    }

    pub fn new(apps: Vec<AppRecord>, categories: Vec<CategoryRecord>) -> Result<Self> {
        let dataset = Self { apps, categories };
        dataset.validate()?;
        Ok(dataset)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for app in &self.apps {
            ensure!(app.slug == app.id, "Fallback app '{}' has slug '{}'", app.id, app.slug);
            ensure!(seen.insert(app.slug.as_str()), "Duplicate fallback app '{}'", app.slug);
        }
        Ok(())
    }

    /// Looks up a record by its slug.
    pub fn find_app(&self, slug: &str) -> Option<&AppRecord> {
        self.apps.iter().find(|app| app.slug == slug)
    }

    pub fn apps(&self) -> &[AppRecord] {
        &self.apps
    }

    pub fn categories(&self) -> &[CategoryRecord] {
        &self.categories
    }
}
