use std::{error::Error, sync::Arc, time::Duration};

use derive_more::Debug;
use futures::future::join_all;
use serde::Serialize;
use tracing::{Span, debug, field, info, instrument, warn};

use super::{
    error::{CatalogError, Result},
    fallback::FallbackDataset,
    payload::normalize_app_payload,
    source::{AppSource, HttpAppSource},
};
use crate::models::{AppId, AppRecord, CategoryRecord, Settings};

/// Curated id lists driving the home sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CuratedLists {
    pub featured: Vec<String>,
    pub latest: Vec<String>,
}

/// Everything the home view shows.
#[derive(Debug, Clone, Serialize)]
pub struct HomeSections {
    pub featured: Vec<AppRecord>,
    pub latest: Vec<AppRecord>,
    pub categories: Vec<CategoryRecord>,
}

/// Resolves app records from the live backend, falling back to static data.
#[derive(Debug)]
pub struct Catalog {
    #[debug(skip)]
    source: Arc<dyn AppSource>,
    fallback: Arc<FallbackDataset>,
    curated: CuratedLists,
}

impl Catalog {
    pub fn new(
        source: Arc<dyn AppSource>,
        fallback: Arc<FallbackDataset>,
        curated: CuratedLists,
    ) -> Self {
        Self { source, fallback, curated }
    }

    /// Builds a catalog backed by the HTTP scraping backend described in `settings`.
    pub fn from_settings(settings: &Settings, fallback: Arc<FallbackDataset>) -> anyhow::Result<Self> {
        let timeout = match settings.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let source = HttpAppSource::new(&settings.backend_base_url, timeout)?;
        let curated = CuratedLists {
            featured: settings.featured_ids.clone(),
            latest: settings.latest_ids.clone(),
        };
        Ok(Self::new(Arc::new(source), fallback, curated))
    }

    pub fn fallback(&self) -> &FallbackDataset {
        &self.fallback
    }

    /// Fetches one app, answering from the fallback dataset if the backend fails.
    ///
    /// Makes exactly one backend request. Fails with
    /// [`CatalogError::NotFound`] only when the backend failed and the
    /// fallback dataset has no record for `id`.
    #[instrument(skip(self), fields(source = field::Empty))]
    pub async fn fetch_app(&self, id: &str) -> Result<AppRecord> {
        let app_id = AppId::parse(id)?;

        let err = match self.source.fetch_app_payload(&app_id).await {
            Ok(payload) => {
                Span::current().record("source", "live");
                let mut app = normalize_app_payload(&payload);
                if app.id.is_empty() {
                    app.id = app_id.as_str().to_string();
                    app.slug = app.id.clone();
                }
                return Ok(app);
            }
            Err(e) => e,
        };

        warn!(
            error = &err as &dyn Error,
            %id,
            backend = self.source.location(),
            "Could not fetch live data, falling back to bundled data. Make sure the backend is running"
        );

        match self.fallback.find_app(app_id.as_str()) {
            Some(app) => {
                Span::current().record("source", "fallback");
                Ok(app.clone())
            }
            None => Err(CatalogError::NotFound(id.to_string())),
        }
    }

    /// Fetches all `ids` concurrently and returns the ones that resolved.
    ///
    /// Waits for every request to settle; one failure never cancels the
    /// others. Output order is not guaranteed to follow `ids`.
    #[instrument(skip(self, ids), fields(requested = ids.len(), resolved = field::Empty))]
    pub async fn fetch_apps<S: AsRef<str>>(&self, ids: &[S]) -> Vec<AppRecord> {
        let results = join_all(ids.iter().map(|id| self.fetch_app(id.as_ref()))).await;

        let apps: Vec<AppRecord> = results
            .into_iter()
            .filter_map(|result| match result {
                Ok(app) => Some(app),
                Err(e) => {
                    debug!(error = &e as &dyn Error, "Dropping unresolved app from batch");
                    None
                }
            })
            .collect();

        Span::current().record("resolved", apps.len());
        apps
    }

    /// The curated featured set, every record flagged as featured.
    pub async fn featured_apps(&self) -> Vec<AppRecord> {
        let mut apps = self.fetch_apps(&self.curated.featured[..]).await;
        for app in &mut apps {
            app.is_featured = true;
        }
        apps
    }

    /// The curated latest-updates set.
    pub async fn latest_apps(&self) -> Vec<AppRecord> {
        self.fetch_apps(&self.curated.latest[..]).await
    }

    /// Categories always come from the static dataset.
    pub fn categories(&self) -> Vec<CategoryRecord> {
        self.fallback.categories().to_vec()
    }

    /// Loads the featured and latest sections concurrently.
    #[instrument(skip(self))]
    pub async fn home(&self) -> HomeSections {
        let (featured, latest) = tokio::join!(self.featured_apps(), self.latest_apps());
        info!(featured = featured.len(), latest = latest.len(), "Loaded home sections");
        HomeSections { featured, latest, categories: self.categories() }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use test_log::test;
    use tokio::sync::Barrier;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;
    use crate::catalog::FetchError;

    fn fallback() -> Arc<FallbackDataset> {
        Arc::new(FallbackDataset::bundled().unwrap())
    }

    fn curated() -> CuratedLists {
        CuratedLists {
            featured: vec!["com.hubolabs.hubo".into(), "nova-launcher-prime".into()],
            latest: vec!["taskmaster-pro".into(), "galaxy-runner".into()],
        }
    }

    fn http_catalog(base_url: String) -> Catalog {
        let source = HttpAppSource::new(base_url, Some(Duration::from_secs(2))).unwrap();
        Catalog::new(Arc::new(source), fallback(), curated())
    }

    fn unreachable_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    /// Source that always fails and counts how often it was asked.
    #[derive(Default)]
    struct DownSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AppSource for DownSource {
        fn location(&self) -> &str {
            "down://"
        }

        async fn fetch_app_payload(&self, _id: &AppId) -> std::result::Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Parse("backend down".into()))
        }
    }

    /// Source that only answers once `size` requests are waiting at the same time.
    struct GatedSource {
        gate: Barrier,
    }

    #[async_trait]
    impl AppSource for GatedSource {
        fn location(&self) -> &str {
            "gated://"
        }

        async fn fetch_app_payload(&self, id: &AppId) -> std::result::Result<Value, FetchError> {
            self.gate.wait().await;
            Ok(json!({"appId": id.as_str(), "title": "Gated"}))
        }
    }

    /// Source answering every id with a minimal record that is never featured.
    struct EchoSource;

    #[async_trait]
    impl AppSource for EchoSource {
        fn location(&self) -> &str {
            "echo://"
        }

        async fn fetch_app_payload(&self, id: &AppId) -> std::result::Result<Value, FetchError> {
            Ok(json!({"appId": id.as_str(), "title": format!("Live {id}"), "isFeatured": false}))
        }
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn live_payload_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-app-data"))
            .and(query_param("id", "com.example.notes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "appId": "com.example.notes",
                "title": "Notes",
                "histogram": [1, 2, 3, 4, 5],
                "reviewsData": [{"user": "Jo", "rating": 4, "text": "Nice"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = http_catalog(server.uri()).fetch_app("com.example.notes").await.unwrap();
        assert_eq!(app.slug, "com.example.notes");
        assert_eq!(app.name, "Notes");
        assert_eq!(app.histogram, [1, 2, 3, 4, 5]);
        assert_eq!(app.reviews.len(), 1);
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn live_payload_without_app_id_keeps_requested_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-app-data"))
            .and(query_param("id", "com.example.untitled"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "T"})))
            .expect(1)
            .mount(&server)
            .await;

        let app = http_catalog(server.uri()).fetch_app("com.example.untitled").await.unwrap();
        assert_eq!(app.id, "com.example.untitled");
        assert_eq!(app.slug, "com.example.untitled");
        assert_eq!(app.name, "T");
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn unreachable_backend_falls_back_to_static_record() {
        let catalog = http_catalog(unreachable_url());

        let app = catalog.fetch_app("com.hubolabs.hubo").await.unwrap();
        assert_eq!(app.slug, "com.hubolabs.hubo");
        assert_eq!(&app, catalog.fallback().find_app("com.hubolabs.hubo").unwrap());
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn every_fallback_id_resolves_without_backend() {
        let catalog = http_catalog(unreachable_url());
        let ids: Vec<String> = catalog.fallback().apps().iter().map(|a| a.id.clone()).collect();

        for id in ids {
            let app = catalog.fetch_app(&id).await.unwrap();
            assert_eq!(app.slug, id);
        }
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn unknown_id_without_backend_is_not_found() {
        let catalog = http_catalog(unreachable_url());

        let err = catalog.fetch_app("unknown.id.123").await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(ref id) if id == "unknown.id.123"));
        assert!(err.to_string().contains("unknown.id.123"));
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn bad_status_and_bad_body_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("id", "taskmaster-pro"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("id", "galaxy-runner"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let catalog = http_catalog(server.uri());
        assert_eq!(catalog.fetch_app("taskmaster-pro").await.unwrap().name, "TaskMaster Pro");
        assert_eq!(catalog.fetch_app("galaxy-runner").await.unwrap().name, "Galaxy Runner");
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn not_found_from_backend_without_fallback_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = http_catalog(server.uri()).fetch_app("org.nobody.app").await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn invalid_id_makes_no_request() {
        let source = Arc::new(DownSource::default());
        let catalog = Catalog::new(source.clone(), fallback(), curated());

        let err = catalog.fetch_app("").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidId(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn one_request_per_fetch() {
        let source = Arc::new(DownSource::default());
        let catalog = Catalog::new(source.clone(), fallback(), curated());

        let _ = catalog.fetch_app("galaxy-runner").await;
        let _ = catalog.fetch_app("unknown.id.123").await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn repeated_fetches_are_equal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-app-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "appId": "com.example.chat",
                "title": "Chat",
                "reviewsData": [
                    {"user": "Al", "rating": 2, "text": "Laggy"},
                    {"user": "Bo", "rating": 5, "text": "Love it"}
                ]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let catalog = http_catalog(server.uri());
        let first = catalog.fetch_app("com.example.chat").await.unwrap();
        let second = catalog.fetch_app("com.example.chat").await.unwrap();
        assert_eq!(first, second);
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn batch_drops_unresolved_ids() {
        let source = Arc::new(DownSource::default());
        let catalog = Catalog::new(source.clone(), fallback(), curated());

        let ids = ["com.hubolabs.hubo", "unknown.id.123", "galaxy-runner", ""];
        let apps = catalog.fetch_apps(&ids).await;

        assert!(apps.len() <= ids.len());
        let mut slugs: Vec<_> = apps.iter().map(|a| a.slug.as_str()).collect();
        slugs.sort();
        assert_eq!(slugs, vec!["com.hubolabs.hubo", "galaxy-runner"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn batch_requests_run_concurrently() {
        let ids = ["app.one", "app.two", "app.three", "app.four"];
        let source = Arc::new(GatedSource { gate: Barrier::new(ids.len()) });
        let catalog = Catalog::new(source, fallback(), curated());

        let apps = tokio::time::timeout(Duration::from_secs(5), catalog.fetch_apps(&ids))
            .await
            .expect("batch requests did not overlap");
        assert_eq!(apps.len(), ids.len());
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn batch_of_failures_is_empty() {
        let catalog = Catalog::new(Arc::new(DownSource::default()), fallback(), curated());

        let apps = catalog.fetch_apps(&["nope.one", "nope.two", "nope.three"]).await;
        assert!(apps.is_empty());

        let none: [&str; 0] = [];
        assert!(catalog.fetch_apps(&none).await.is_empty());
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn featured_apps_are_always_flagged() {
        let catalog = Catalog::new(Arc::new(EchoSource), fallback(), curated());
        let featured = catalog.featured_apps().await;
        assert_eq!(featured.len(), 2);
        assert!(featured.iter().all(|a| a.is_featured));

        let catalog = Catalog::new(Arc::new(DownSource::default()), fallback(), curated());
        let featured = catalog.featured_apps().await;
        assert_eq!(featured.len(), 2);
        assert!(featured.iter().all(|a| a.is_featured));
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn latest_apps_keep_upstream_flag() {
        let catalog = Catalog::new(Arc::new(EchoSource), fallback(), curated());
        let latest = catalog.latest_apps().await;
        assert_eq!(latest.len(), 2);
        assert!(latest.iter().all(|a| !a.is_featured));
        assert!(latest.iter().all(|a| a.name.starts_with("Live ")));
    }

    #[test(tokio::test(flavor = "multi_thread"))]
    async fn home_bundles_sections_and_categories() {
        let catalog = Catalog::new(Arc::new(DownSource::default()), fallback(), curated());
        let home = catalog.home().await;
        assert_eq!(home.featured.len(), 2);
        assert_eq!(home.latest.len(), 2);
        assert_eq!(home.categories.len(), 6);
    }

    #[test]
    fn from_settings_uses_curated_ids() {
        let settings = Settings {
            featured_ids: vec!["galaxy-runner".into()],
            latest_ids: vec![],
            request_timeout_secs: 0,
            ..Settings::default()
        };
        let catalog = Catalog::from_settings(&settings, fallback()).unwrap();
        assert_eq!(catalog.curated.featured, vec!["galaxy-runner"]);
        assert!(catalog.curated.latest.is_empty());
        assert_eq!(catalog.source.location(), settings.backend_base_url);
    }
}
