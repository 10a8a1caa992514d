//! Catalog data access: one backend request per app, with a static
//! dataset answering whenever the backend cannot.

mod adapter;
mod error;
mod fallback;
mod payload;
mod source;

pub use adapter::{Catalog, CuratedLists, HomeSections};
pub use error::{CatalogError, FetchError, Result};
pub use fallback::FallbackDataset;
pub use payload::normalize_app_payload;
pub use source::{AppSource, HttpAppSource};
