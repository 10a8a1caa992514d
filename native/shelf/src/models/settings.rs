use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

fn default_backend_base_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_featured_ids() -> Vec<String> {
    vec!["com.hubolabs.hubo".to_string(), "nova-launcher-prime".to_string()]
}

fn default_latest_ids() -> Vec<String> {
    vec!["taskmaster-pro".to_string(), "galaxy-runner".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the scraping backend, without a trailing slash
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,
    /// Per-request timeout. 0 disables it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Ids shown in the "featured" section
    #[serde(default = "default_featured_ids")]
    pub featured_ids: Vec<String>,
    /// Ids shown in the "latest" section
    #[serde(default = "default_latest_ids")]
    pub latest_ids: Vec<String>,
    /// Alternate fallback dataset. The bundled one is used when unset.
    #[serde(default)]
    pub fallback_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_base_url: default_backend_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            featured_ids: default_featured_ids(),
            latest_ids: default_latest_ids(),
            fallback_path: None,
        }
    }
}
