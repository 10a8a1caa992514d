use std::fmt;

use lazy_regex::{Lazy, Regex, lazy_regex};

use crate::catalog::CatalogError;

pub(crate) static APP_ID_REGEX: Lazy<Regex> = lazy_regex!(r"^[A-Za-z0-9][A-Za-z0-9._-]*$");

/// Validated catalog identifier (a store package name or a slug).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppId(String);

impl AppId {
    /// Validates and constructs an `AppId` from the provided string-like value.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, CatalogError> {
        let value_ref = value.as_ref();
        if !APP_ID_REGEX.is_match(value_ref) {
            return Err(CatalogError::InvalidId(value_ref.to_owned()));
        }
        Ok(Self(value_ref.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
