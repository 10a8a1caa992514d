use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument};

use super::error::FetchError;
use crate::models::AppId;

/// Where live app payloads come from.
///
/// One call is one backend request. Implementations do not retry and do not
/// cache; the catalog decides what to do with a failure.
#[async_trait]
pub trait AppSource: Send + Sync {
    /// Human-readable location of the backend, used in log messages.
    fn location(&self) -> &str;

    async fn fetch_app_payload(&self, id: &AppId) -> Result<Value, FetchError>;
}

/// Scraping backend reached over HTTP at `{base_url}/get-app-data?id={id}`.
#[derive(Debug, Clone)]
pub struct HttpAppSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAppSource {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(crate::USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn app_data_url(&self) -> String {
        format!("{}/get-app-data", self.base_url)
    }
}

#[async_trait]
impl AppSource for HttpAppSource {
    fn location(&self) -> &str {
        &self.base_url
    }

    #[instrument(level = "debug", skip(self), fields(id = %id), err)]
    async fn fetch_app_payload(&self, id: &AppId) -> Result<Value, FetchError> {
        let url = self.app_data_url();
        debug!(%url, "Fetching app data from backend");

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let resp = self.client.get(&url).headers(headers).query(&[("id", id.as_str())]).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::BadResponse { status });
        }

        let body = resp.bytes().await?;
        let payload: Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;
        if !payload.is_object() {
            return Err(FetchError::Parse("expected a JSON object".to_string()));
        }
        Ok(payload)
    }
}
