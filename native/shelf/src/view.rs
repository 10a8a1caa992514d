use std::{error::Error, sync::Arc};

use tracing::{error, instrument};

use crate::{
    catalog::{Catalog, HomeSections},
    models::AppRecord,
};

/// Shown instead of the underlying error when app details cannot be loaded.
pub const DETAIL_ERROR_MESSAGE: &str = "Could not load app details. Please try again.";

/// What the detail pane currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Browsing,
    Loading {
        id: String,
    },
    Showing(AppRecord),
    Failed {
        message: String,
    },
}

impl DetailState {
    pub fn app(&self) -> Option<&AppRecord> {
        match self {
            Self::Showing(app) => Some(app),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Selection and loading state for the app browser.
#[derive(Debug)]
pub struct Shelf {
    catalog: Arc<Catalog>,
    state: DetailState,
}

impl Shelf {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog, state: DetailState::Browsing }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    /// Loads the detail view for `id`.
    ///
    /// Any failure ends in [`DetailState::Failed`] with a generic message.
    #[instrument(skip(self))]
    pub async fn select_app(&mut self, id: &str) -> &DetailState {
        self.state = DetailState::Loading { id: id.to_string() };

        self.state = match self.catalog.fetch_app(id).await {
            Ok(app) => DetailState::Showing(app),
            Err(e) => {
                error!(error = &e as &dyn Error, "Failed to load app details");
                DetailState::Failed { message: DETAIL_ERROR_MESSAGE.to_string() }
            }
        };
        &self.state
    }

    /// Clears the selection and any error.
    pub fn go_back(&mut self) {
        self.state = DetailState::Browsing;
    }

    pub async fn load_home(&self) -> HomeSections {
        self.catalog.home().await
    }
}
