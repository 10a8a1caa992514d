//! App browsing backend: live app details from a scraping service, with a
//! bundled dataset to fall back on.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    catalog::{Catalog, FallbackDataset},
    models::Settings,
};

pub mod catalog;
pub mod logging;
pub mod models;
pub mod settings;
pub mod utils;
pub mod view;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const ENV_APP_HOME: &str = "APKSHELF_HOME";

/// Directory holding settings and logs.
///
/// `APKSHELF_HOME` wins over the platform data directory.
pub fn app_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(ENV_APP_HOME).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let data_dir = dirs::data_dir().context("Failed to get data directory")?;
    Ok(data_dir.join("apkshelf"))
}

/// Loads the configured fallback dataset, or the bundled one when none is set.
pub fn load_fallback(settings: &Settings) -> Result<FallbackDataset> {
    match &settings.fallback_path {
        Some(path) => {
            info!(%path, "Using fallback dataset from file");
            FallbackDataset::load_from_path(path)
                .with_context(|| format!("Failed to load fallback dataset from {path}"))
        }
        None => FallbackDataset::bundled(),
    }
}

/// Wires a [`Catalog`] from settings.
pub fn build_catalog(settings: &Settings) -> Result<Arc<Catalog>> {
    let fallback = Arc::new(load_fallback(settings)?);
    Ok(Arc::new(Catalog::from_settings(settings, fallback)?))
}
