use reqwest::StatusCode;

/// Why a single backend request did not yield a usable payload.
///
/// All variants are recoverable: the catalog answers from the fallback
/// dataset instead.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded with status {status}")]
    BadResponse { status: StatusCode },

    #[error("backend returned an unreadable payload: {0}")]
    Parse(String),
}

/// Errors surfaced to callers of the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid app id: '{0}'")]
    InvalidId(String),

    #[error("Failed to fetch app details for {0} and no fallback data was found")]
    NotFound(String),
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
