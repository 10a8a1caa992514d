use std::{
    error::Error,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, ensure};
use tracing::{debug, info, instrument, warn};

use crate::models::Settings;

pub const ENV_BACKEND_URL: &str = "APKSHELF_BACKEND_URL";
pub const ENV_TIMEOUT_SECS: &str = "APKSHELF_TIMEOUT_SECS";

/// Handles application settings
#[derive(Debug, Clone)]
pub struct SettingsHandler {
    settings_file_path: PathBuf,
}

impl SettingsHandler {
    pub fn new(app_dir: impl AsRef<Path>) -> Self {
        Self { settings_file_path: app_dir.as_ref().join("settings.json") }
    }

    pub fn settings_file_path(&self) -> &Path {
        &self.settings_file_path
    }

    /// Loads settings from disk, falling back to defaults if the file is unreadable.
    ///
    /// Environment overrides are applied on top either way.
    pub fn load_or_default(&self) -> Settings {
        let settings = match self.load_settings() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = e.as_ref() as &dyn Error, "Failed to load settings, using defaults.");
                Settings::default()
            }
        };
        apply_env_overrides(settings, |key| std::env::var(key).ok())
    }

    /// Load settings from file, creating it with defaults if it doesn't exist
    #[instrument(skip(self))]
    pub fn load_settings(&self) -> Result<Settings> {
        if !self.settings_file_path.exists() {
            info!(path = %self.settings_file_path.display(), "Settings file doesn't exist, using defaults");
            let settings = Settings::default();
            self.save_settings(&settings)?;
            return Ok(settings);
        }

        info!(path = %self.settings_file_path.display(), "Loading settings from file");
        let file_content = fs_err::read_to_string(&self.settings_file_path)
            .context("Failed to read settings file")?;

        let settings: Settings =
            serde_json::from_str(&file_content).context("Failed to parse settings file")?;
        validate(&settings)?;

        debug!("Loaded application settings successfully");
        Ok(settings)
    }

    /// Save settings to file
    #[instrument(skip(self, settings))]
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        validate(settings)?;
        info!(path = %self.settings_file_path.display(), "Saving settings to file");
        let settings_json =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        if let Some(parent) = self.settings_file_path.parent()
            && !parent.exists()
        {
            info!(path = %parent.display(), "Creating settings directory");
            fs_err::create_dir_all(parent).context("Failed to create settings directory")?;
        }

        fs_err::write(&self.settings_file_path, settings_json)
            .context("Failed to write settings file")?;

        info!("Saved application settings successfully");
        Ok(())
    }
}

fn validate(settings: &Settings) -> Result<()> {
    let url = settings.backend_base_url.trim();
    ensure!(
        url.starts_with("http://") || url.starts_with("https://"),
        "Backend URL must start with http:// or https:// (got '{url}')"
    );
    Ok(())
}

/// Applies `APKSHELF_*` overrides read through `lookup`.
///
/// Unparsable values are ignored with a warning.
pub fn apply_env_overrides(
    mut settings: Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Settings {
    if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
        debug!(%url, "Backend URL overridden from environment");
        settings.backend_base_url = url.trim().trim_end_matches('/').to_string();
    }

    if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
        match value.trim().parse::<u64>() {
            Ok(secs) => settings.request_timeout_secs = secs,
            Err(e) => {
                warn!(error = &e as &dyn Error, %value, "Ignoring invalid {ENV_TIMEOUT_SECS}")
            }
        }
    }
    settings
}
