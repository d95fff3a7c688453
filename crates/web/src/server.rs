//! Web server implementation

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use researchbank_common::{search, source_from_location, CatalogueItem, CatalogueStore};

use crate::config::WebConfig;
use crate::error::{ApiError, ErrorPage, WebError};
use crate::static_files::StaticFiles;
use crate::templates::{
    item_href, page, CatalogueTemplate, ErrorTemplate, HomeTemplate, ItemSummary, ItemTemplate,
    Layout, SITE_NAME,
};

/// Cookie holding the remembered catalogue search
pub const SEARCH_COOKIE: &str = "researchbank_search";

/// Items listed under "Recently added" on the landing page
const RECENT_ITEMS: usize = 5;

/// Web server state
#[derive(Clone)]
pub struct WebServer {
    state: Arc<WebServerState>,
}

struct WebServerState {
    store: CatalogueStore,
    /// Normalised URL prefix, empty when mounted at the root
    prefix: String,
}

impl WebServerState {
    fn path(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }

    fn cookie_path(&self) -> String {
        if self.prefix.is_empty() {
            "/".to_string()
        } else {
            self.prefix.clone()
        }
    }

    fn remembered_search(&self, jar: &CookieJar) -> Option<String> {
        jar.get(SEARCH_COOKIE).map(|c| {
            urlencoding::decode(c.value())
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| c.value().to_string())
        })
    }

    /// Store `search` as the remembered search; empty clears it
    fn remember_search(&self, jar: CookieJar, search: &str) -> CookieJar {
        if search.is_empty() {
            jar.remove(Cookie::build(SEARCH_COOKIE).path(self.cookie_path()))
        } else {
            jar.add(
                Cookie::build((SEARCH_COOKIE, urlencoding::encode(search).into_owned()))
                    .path(self.cookie_path())
                    .http_only(true)
                    .same_site(SameSite::Lax),
            )
        }
    }

    fn layout(&self, title: impl Into<String>, jar: &CookieJar) -> Layout {
        let search = self.remembered_search(jar).unwrap_or_default();
        Layout::new(title, &self.prefix, &search)
    }
}

pub async fn serve(cfg: WebConfig) -> anyhow::Result<()> {
    let addr = cfg.listen_addr()?;
    let server = WebServer::new(&cfg)?;
    server.serve(addr).await
}

impl WebServer {
    /// Create a web server from configuration
    pub fn new(cfg: &WebConfig) -> researchbank_common::Result<Self> {
        let source = source_from_location(&cfg.catalog)?;
        let store = CatalogueStore::new(source, cfg.cache_ttl());
        Ok(Self::with_store(store, &cfg.prefix()?))
    }

    /// Create a web server around an existing store; `prefix` must be normalised
    pub fn with_store(store: CatalogueStore, prefix: &str) -> Self {
        Self {
            state: Arc::new(WebServerState {
                store,
                prefix: prefix.to_string(),
            }),
        }
    }

    /// Create router
    pub fn router(&self) -> Router {
        let p = |path: &str| self.state.path(path);

        let mut router = Router::new()
            .route(&p("/"), get(home_handler))
            .route(&p("/catalogue"), get(catalogue_handler))
            .route(&p("/catalogue/:id"), get(item_handler))
            .route(&p("/catalogue/:id/select"), get(select_handler))
            .route(&p("/api/data/catalog.json"), get(catalog_json_handler))
            .route(&p("/api/catalogue"), get(api_list_handler))
            .route(&p("/api/catalogue/:id"), get(api_item_handler))
            .route(&p("/api/suggest"), get(suggest_handler))
            .route(&p("/static/*path"), get(static_handler))
            .route("/health", get(health_handler));

        if !self.state.prefix.is_empty() {
            router = router
                .route("/", get(root_redirect_handler))
                .route(&self.state.prefix, get(root_redirect_handler));
        }

        let state = self.state.clone();
        let error_pages = middleware::from_fn(move |req: Request, next: middleware::Next| {
            let state = state.clone();
            async move { error_page_middleware(state, req, next).await }
        });

        router
            .fallback(not_found_handler)
            .layer(error_pages)
            .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        info!(
            "Catalogue site starting on http://{}{}/ (catalogue: {})",
            addr,
            self.state.prefix,
            self.state.store.source().describe()
        );

        // Warm the cache; a failure here is reported per request instead
        if let Err(e) = self.state.store.refresh().await {
            warn!("Initial catalogue fetch failed: {}", e);
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Catalogue site stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down gracefully...");
}

// ============================================================================
// Page handlers
// ============================================================================

type AppState = State<Arc<WebServerState>>;

async fn root_redirect_handler(State(state): AppState) -> Redirect {
    Redirect::temporary(&state.path("/"))
}

async fn home_handler(State(state): AppState, jar: CookieJar) -> Result<Html<String>, WebError> {
    let catalogue = state.store.catalogue().await?;
    let recent = catalogue
        .recently_added(RECENT_ITEMS)
        .into_iter()
        .map(|item| ItemSummary::new(&state.prefix, item))
        .collect();

    page(HomeTemplate {
        layout: state.layout(SITE_NAME, &jar),
        total: catalogue.len(),
        datasets: catalogue.datasets(),
        models: catalogue.models(),
        recent,
    })
}

#[derive(Debug, Default, Deserialize)]
struct CatalogueQuery {
    search: Option<String>,
}

/// `?search=` replaces the remembered search; without it the cookie is used
async fn catalogue_handler(
    State(state): AppState,
    jar: CookieJar,
    Query(query): Query<CatalogueQuery>,
) -> Result<(CookieJar, Html<String>), WebError> {
    let (search, jar) = match query.search {
        Some(raw) => {
            let search = raw.trim().to_string();
            let jar = state.remember_search(jar, &search);
            (search, jar)
        }
        None => (state.remembered_search(&jar).unwrap_or_default(), jar),
    };

    let catalogue = state.store.catalogue().await?;
    let items: Vec<ItemSummary> = search::filter(&catalogue, &search)
        .into_iter()
        .map(|item| ItemSummary::new(&state.prefix, item))
        .collect();
    debug!("Catalogue search {:?}: {} result(s)", search, items.len());

    let html = page(CatalogueTemplate {
        layout: Layout::new(format!("Catalogue - {}", SITE_NAME), &state.prefix, &search),
        summary: search::result_summary(items.len()),
        items,
    })?;
    Ok((jar, html))
}

async fn find_item(state: &WebServerState, id: &str) -> Result<CatalogueItem, WebError> {
    state
        .store
        .fetch_catalogue_item(id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("No catalogue item with id {:?}", id)))
}

async fn item_handler(
    State(state): AppState,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let item = find_item(&state, &id).await?;
    let layout = state.layout(format!("{} - {}", item.name, SITE_NAME), &jar);
    page(ItemTemplate::new(layout, &item))
}

#[derive(Debug, Default, Deserialize)]
struct SelectQuery {
    value: Option<String>,
}

/// A suggestion was chosen: remember it and show the item
async fn select_handler(
    State(state): AppState,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<SelectQuery>,
) -> Result<(CookieJar, Redirect), WebError> {
    let item = find_item(&state, &id).await?;
    let value = query
        .value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| item.name.clone());

    let jar = state.remember_search(jar, &value);
    Ok((jar, Redirect::to(&item_href(&state.prefix, &item.id))))
}

async fn static_handler(Path(path): Path<String>) -> Response {
    StaticFiles::serve(&path)
}

async fn not_found_handler() -> WebError {
    WebError::NotFound("Page not found".to_string())
}

/// Wraps page errors in the site layout
async fn error_page_middleware(
    state: Arc<WebServerState>,
    req: Request,
    next: middleware::Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let response = next.run(req).await;
    let Some(ErrorPage { message }) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let status = response.status();
    let layout = state.layout(format!("Error - {}", SITE_NAME), &jar);
    match page(ErrorTemplate::new(layout, status, &message)) {
        Ok(html) => (status, html).into_response(),
        Err(e) => {
            error!("failed to render error page: {}", e);
            response
        }
    }
}

// ============================================================================
// JSON handlers
// ============================================================================

/// The static catalogue document, served as fetched
async fn catalog_json_handler(State(state): AppState) -> Result<Response, ApiError> {
    let catalogue = state.store.catalogue().await?;
    let body = catalogue.document().to_vec();
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

async fn api_list_handler(State(state): AppState) -> Result<Json<Vec<CatalogueItem>>, ApiError> {
    let catalogue = state.store.catalogue().await?;
    Ok(Json(catalogue.items().to_vec()))
}

async fn api_item_handler(
    State(state): AppState,
    Path(id): Path<String>,
) -> Result<Json<CatalogueItem>, ApiError> {
    let item = state
        .store
        .fetch_catalogue_item(&id)
        .await?
        .ok_or_else(|| researchbank_common::Error::item_not_found(id))?;
    Ok(Json(item))
}

#[derive(Debug, Default, Deserialize)]
struct SuggestQuery {
    #[serde(default)]
    q: String,
}

async fn suggest_handler(
    State(state): AppState,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<search::Suggestion>>, ApiError> {
    let catalogue = state.store.catalogue().await?;
    Ok(Json(search::suggest(&catalogue, &query.q)))
}

async fn health_handler(State(state): AppState) -> impl IntoResponse {
    match state.store.catalogue().await {
        Ok(catalogue) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "service": "researchbank-web",
                "items": catalogue.len(),
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "unavailable",
                "service": "researchbank-web",
                "error": e.to_string(),
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use researchbank_common::FileSource;
    use std::time::Duration;
    use tower::ServiceExt;

    const PREFIX: &str = "/my-ai4d-research-bank";
    const TEST_TTL: Duration = Duration::from_secs(60);

    fn fixture() -> std::path::PathBuf {
        std::path::PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/catalog.json"))
    }

    fn create_test_app() -> Router {
        let store = CatalogueStore::new(Arc::new(FileSource::new(fixture())), TEST_TTL);
        WebServer::with_store(store, PREFIX).router()
    }

    async fn get(app: Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn set_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn count_result_links(html: &str) -> usize {
        let start = html.find(r#"data-testid="result-list""#).unwrap();
        let end = start + html[start..].find("</div>").unwrap();
        html[start..end].matches("<a ").count()
    }

    #[tokio::test]
    async fn test_health() {
        let response = get(create_test_app(), "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["items"], 5);
    }

    #[tokio::test]
    async fn test_root_redirects_to_prefix() {
        let response = get(create_test_app(), "/", None).await;
        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/my-ai4d-research-bank/"
        );
    }

    #[tokio::test]
    async fn test_landing_page() {
        let response = get(create_test_app(), "/my-ai4d-research-bank/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("AI4D Research Bank"));
        assert!(html.contains(">Catalogue</a>"));
        assert!(html.contains(r#"placeholder="Search for a dataset or a model""#));
        assert!(html.contains("5 entries: 3 datasets, 2 models"));
    }

    #[tokio::test]
    async fn test_catalogue_lists_everything() {
        let response = get(create_test_app(), "/my-ai4d-research-bank/catalogue", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("5 results available"));
        assert!(html.contains("Poverty Mapping Rollout Dataset for Timor Leste (2016)"));
        assert_eq!(count_result_links(&html), 5);
    }

    #[tokio::test]
    async fn test_catalogue_search_filters_and_remembers() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/catalogue?search=philippines",
            None,
        )
        .await;
        let cookie = set_cookie(&response).unwrap();
        assert!(cookie.starts_with("researchbank_search=philippines"));
        assert!(cookie.contains("Path=/my-ai4d-research-bank"));

        let html = body_text(response).await;
        assert!(html.contains("1 result available"));
        assert_eq!(count_result_links(&html), 1);
        assert!(html.contains(r#"value="philippines""#));
    }

    #[tokio::test]
    async fn test_catalogue_uses_remembered_search() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/catalogue",
            Some("researchbank_search=Air%20Quality%20Model%20for%20Thailand"),
        )
        .await;
        let html = body_text(response).await;
        assert!(html.contains(r#"value="Air Quality Model for Thailand""#));
        assert!(html.contains("1 result available"));
    }

    #[tokio::test]
    async fn test_empty_search_clears_remembered_search() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/catalogue?search=",
            Some("researchbank_search=philippines"),
        )
        .await;
        let cookie = set_cookie(&response).unwrap();
        assert!(cookie.starts_with("researchbank_search="));
        assert!(cookie.contains("Max-Age=0"));

        let html = body_text(response).await;
        assert!(html.contains("5 results available"));
    }

    #[tokio::test]
    async fn test_item_page() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/catalogue/povmap-timor-leste-rollout-dataset",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Thinking Machines Data Science"));
        assert!(html.contains("Poverty Mapping Rollout Dataset for Timor Leste (2016)"));
        assert!(html.contains("Date created: 2023-01-16"));
        assert!(html.contains("R^2 (0.63)"));
        assert!(html.contains("Rollout grid (GeoJSON)"));
    }

    #[tokio::test]
    async fn test_item_page_without_metrics() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/catalogue/rwi-philippines-model",
            None,
        )
        .await;
        let html = body_text(response).await;
        assert!(html.contains("Country/Region:"));
        assert!(!html.contains("Evaluation Metric:"));
    }

    #[tokio::test]
    async fn test_unknown_item_is_error_page() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/catalogue/nope",
            Some("researchbank_search=philippines"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = body_text(response).await;
        assert!(html.contains("<h1>error</h1>"));
        assert!(html.contains(r#"href="/my-ai4d-research-bank/catalogue">Catalogue</a>"#));
        assert!(html.contains(r#"value="philippines""#));
    }

    #[tokio::test]
    async fn test_api_errors_stay_json() {
        let response = get(create_test_app(), "/my-ai4d-research-bank/api/catalogue/nope", None).await;
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_select_remembers_suggestion_and_redirects() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/catalogue/airquality-thailand-model/select?value=Air%20Quality%20Model%20for%20Thailand",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/my-ai4d-research-bank/catalogue/airquality-thailand-model"
        );
        let cookie = set_cookie(&response).unwrap();
        assert!(cookie.starts_with("researchbank_search=Air%20Quality%20Model%20for%20Thailand"));
    }

    #[tokio::test]
    async fn test_select_defaults_to_item_name() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/catalogue/rwi-philippines-model/select",
            None,
        )
        .await;
        let cookie = set_cookie(&response).unwrap();
        assert!(cookie.starts_with("researchbank_search=Relative%20Wealth%20Index%20for%20the%20Philippines"));
    }

    #[tokio::test]
    async fn test_suggest_requires_three_characters() {
        let response = get(create_test_app(), "/my-ai4d-research-bank/api/suggest?q=po", None).await;
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, serde_json::json!([]));

        let response = get(create_test_app(), "/my-ai4d-research-bank/api/suggest?q=pov", None).await;
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            json[0]["label"],
            "Poverty Mapping Rollout Dataset for Timor Leste (2016)"
        );
        assert_eq!(json[0]["id"], "povmap-timor-leste-rollout-dataset");
    }

    #[tokio::test]
    async fn test_static_catalogue_document() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/api/data/catalog.json",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(5));
        assert_eq!(json[0]["date-added"], "2023-01-16");
    }

    #[tokio::test]
    async fn test_static_catalogue_document_keeps_unmodelled_keys() {
        let json = r#"[{"id":"a","type":"notebook","name":"Alpha","organization":{"name":"Org","country":"PH"},"license":"CC-BY-4.0","tags":["poverty"],"score":1.50}]"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, json).unwrap();
        let store = CatalogueStore::new(Arc::new(FileSource::new(path)), TEST_TTL);
        let app = WebServer::with_store(store, PREFIX).router();

        let response = get(app, "/my-ai4d-research-bank/api/data/catalog.json", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, json);
    }

    #[tokio::test]
    async fn test_api_item() {
        let response = get(
            create_test_app(),
            "/my-ai4d-research-bank/api/catalogue/airquality-thailand-model",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["name"], "Air Quality Model for Thailand");

        let response = get(create_test_app(), "/my-ai4d-research-bank/api/catalogue/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(json["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_unavailable_catalogue_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogueStore::new(
            Arc::new(FileSource::new(dir.path().join("catalog.json"))),
            TEST_TTL,
        );
        let app = WebServer::with_store(store, PREFIX).router();

        let response = get(app.clone(), "/my-ai4d-research-bank/catalogue", None).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = get(app, "/health", None).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = get(create_test_app(), "/elsewhere", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = body_text(response).await;
        assert!(html.contains("Page not found"));
        assert!(html.contains(r#"data-testid="search-input""#));
    }

    #[tokio::test]
    async fn test_root_prefix() {
        let store = CatalogueStore::new(Arc::new(FileSource::new(fixture())), TEST_TTL);
        let app = WebServer::with_store(store, "").router();

        let response = get(app.clone(), "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = get(app, "/catalogue?search=thailand", None).await;
        assert!(set_cookie(&response).unwrap().contains("Path=/"));
    }
}
