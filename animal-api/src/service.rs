//! HTTP surface: shared state, router assembly and request handlers.
//!
//! Routing follows a nested validation hierarchy so each level reports
//! its own "Invalid ..." message: /api -> /api/{version} ->
//! /api/v1/{function} -> /api/v1/search/{endpoint} -> the animal search
//! itself.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::body::{Body, to_bytes};
use axum::extract::{Path, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::module::cache::{CachedResponse, ResponseCache, request_key};
use crate::module::catalog::AnimalCatalog;
use crate::module::i18n::TranslationTable;
use crate::module::lookup::{self, LookupQuery};

const API_VERSION: &str = "v1";
const API_FUNCTION: &str = "search";
const API_ENDPOINT: &str = "animal";

/// Cache window for the volatile API probe endpoints.
pub const SHORT_TTL: Duration = Duration::from_secs(1);
/// Cache window for the near-static informational endpoints.
pub const LONG_TTL: Duration = Duration::from_secs(60);

/// Largest response body the cache middleware will buffer.
const CACHE_BODY_LIMIT: usize = 1024 * 1024;

/// Shared per-process state. Catalog and translations are immutable
/// after startup; the response cache is the only mutable structure.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<AnimalCatalog>,
    pub translations: Arc<TranslationTable>,
    pub cache: Arc<ResponseCache>,
    pub docs_html: Arc<String>,
}

impl AppState {
    /// Load all startup data. Any failure here must abort the process.
    pub fn load(config: &AppConfig) -> anyhow::Result<Self> {
        let catalog = AnimalCatalog::load(&config.catalog_file)?;
        tracing::info!(
            "Loaded {} animals from {}",
            catalog.animal_count(),
            config.catalog_file
        );

        let translations = TranslationTable::load(&config.translations_file)?;
        tracing::info!(
            "Loaded translations for {} animals from {}",
            translations.animal_count(),
            config.translations_file
        );

        let docs_html = std::fs::read_to_string(&config.docs_file)
            .with_context(|| format!("Failed to read docs page '{}'", config.docs_file))?;

        Ok(Self {
            catalog: Arc::new(catalog),
            translations: Arc::new(translations),
            cache: Arc::new(ResponseCache::new()),
            docs_html: Arc::new(docs_html),
        })
    }
}

/// One cache window: which cache to consult and for how long entries
/// stored through it stay live.
#[derive(Clone)]
struct CacheWindow {
    cache: Arc<ResponseCache>,
    ttl: Duration,
}

/// Build the application router.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let short_window = CacheWindow {
        cache: state.cache.clone(),
        ttl: SHORT_TTL,
    };
    let long_window = CacheWindow {
        cache: state.cache.clone(),
        ttl: LONG_TTL,
    };

    let probe_routes = Router::new()
        .route("/api", get(api_index))
        .route("/api/{version}", get(api_version))
        .route("/api/v1/{function}", get(api_function))
        .route("/api/v1/search/{endpoint}", get(api_endpoint))
        .layer(middleware::from_fn_with_state(short_window, cached_response));

    let info_routes = Router::new()
        .route("/", get(index))
        .route("/docs", get(docs))
        .layer(middleware::from_fn_with_state(long_window, cached_response));

    // The animal search is deliberately uncached: its output is
    // randomized when name/id are omitted, and a cache would freeze the
    // randomness. /status is a liveness probe and must never be stale.
    let live_routes = Router::new()
        .route("/status", get(status))
        .route("/api/v1/search/animal", get(search_animal));

    let cors = if config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .merge(probe_routes)
        .merge(info_routes)
        .merge(live_routes)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Replay a stored response when the request identity is already cached,
/// otherwise run the handler and store what it produced. Only GETs are
/// cached; entries keep the full status/headers/body triple.
async fn cached_response(
    State(window): State<CacheWindow>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = request_key(request.method(), request.uri());
    if let Some(hit) = window.cache.get(&key).await {
        debug!("Response cache hit: {}", key);
        return hit.into_response();
    }

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, CACHE_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to buffer response for caching ({}): {}", key, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    window
        .cache
        .insert(
            key,
            CachedResponse::new(parts.status, parts.headers.clone(), bytes.clone()),
            window.ttl,
        )
        .await;

    Response::from_parts(parts, Body::from(bytes))
}

async fn index() -> Redirect {
    Redirect::temporary("/docs")
}

/// Liveness probe.
async fn status() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn docs(State(state): State<AppState>) -> Html<String> {
    Html(state.docs_html.as_str().to_owned())
}

async fn api_index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "API working successfully",
        "availableVersions": [API_VERSION],
    }))
}

async fn api_version(Path(version): Path<String>) -> Response {
    if version != API_VERSION {
        return not_found("Invalid API version");
    }
    Json(json!({ "message": format!("The {version} API working successfully") })).into_response()
}

async fn api_function(Path(function): Path<String>) -> Response {
    if function != API_FUNCTION {
        return not_found("Invalid API function");
    }
    Json(json!({ "message": "API function working successfully" })).into_response()
}

async fn api_endpoint(Path(endpoint): Path<String>) -> Response {
    if endpoint != API_ENDPOINT {
        return not_found("Invalid API endpoint");
    }
    Json(json!({ "message": "API endpoint working successfully" })).into_response()
}

/// The actual search: optional name/id/lang, random pick for whatever
/// is unset, 404 with a fixed message on unknown name or malformed id.
async fn search_animal(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Response {
    let mut rng = rand::thread_rng();
    match lookup::resolve(&query, &state.catalog, &state.translations, &mut rng) {
        Ok(result) => Json(result).into_response(),
        Err(e) => not_found(&e.to_string()),
    }
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, header};
    use serde_json::Value;
    use tower::ServiceExt;

    fn fixture_state() -> AppState {
        let catalog = AnimalCatalog::from_json(
            r#"{
                "path": "/static/images",
                "animals": {
                    "cat": {"0": "cat-0.jpg", "3": "cat-3.jpg"},
                    "dog": {"0": "dog-0.jpg"}
                }
            }"#,
        )
        .unwrap();
        let translations = TranslationTable::from_json(
            r#"{"cat": {"en": "Cat", "de": "Katze"}}"#,
        )
        .unwrap();

        AppState {
            catalog: Arc::new(catalog),
            translations: Arc::new(translations),
            cache: Arc::new(ResponseCache::new()),
            docs_html: Arc::new("<html><body>API docs</body></html>".to_string()),
        }
    }

    fn test_router(state: AppState) -> Router {
        build_router(state, &AppConfig::default())
    }

    async fn get_response(app: Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        (parts.status, parts.headers, bytes)
    }

    fn as_json(bytes: &Bytes) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_is_always_ok() {
        let state = fixture_state();
        let (status, _, body) = get_response(test_router(state.clone()), "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(as_json(&body), json!({ "status": "ok" }));
        // The liveness probe never touches the cache.
        assert_eq!(state.cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_root_redirects_to_docs() {
        let (status, headers, _) = get_response(test_router(fixture_state()), "/").await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/docs");
    }

    #[tokio::test]
    async fn test_docs_serves_html() {
        let (status, _, body) = get_response(test_router(fixture_state()), "/docs").await;
        assert_eq!(status, StatusCode::OK);
        assert!(std::str::from_utf8(&body).unwrap().contains("API docs"));
    }

    #[tokio::test]
    async fn test_api_lists_versions() {
        let (status, _, body) = get_response(test_router(fixture_state()), "/api").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            as_json(&body),
            json!({
                "message": "API working successfully",
                "availableVersions": ["v1"],
            })
        );
    }

    #[tokio::test]
    async fn test_valid_version_and_function_probes() {
        let app = test_router(fixture_state());

        let (status, _, body) = get_response(app.clone(), "/api/v1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            as_json(&body),
            json!({ "message": "The v1 API working successfully" })
        );

        let (status, _, body) = get_response(app, "/api/v1/search").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            as_json(&body),
            json!({ "message": "API function working successfully" })
        );
    }

    #[tokio::test]
    async fn test_invalid_levels_report_their_own_message() {
        let app = test_router(fixture_state());

        let (status, _, body) = get_response(app.clone(), "/api/v2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(as_json(&body), json!({ "message": "Invalid API version" }));

        let (status, _, body) = get_response(app.clone(), "/api/v1/browse").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(as_json(&body), json!({ "message": "Invalid API function" }));

        let (status, _, body) = get_response(app, "/api/v1/search/images").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(as_json(&body), json!({ "message": "Invalid API endpoint" }));
    }

    #[tokio::test]
    async fn test_search_animal_with_full_query() {
        let app = test_router(fixture_state());
        let (status, _, body) =
            get_response(app, "/api/v1/search/animal?name=cat&id=3&lang=de").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            as_json(&body),
            json!({
                "id": "3",
                "name": "cat",
                "translation": "Katze",
                "url": "/static/images/cat/cat-3.jpg",
            })
        );
    }

    #[tokio::test]
    async fn test_search_animal_random_pick_stays_in_catalog() {
        let app = test_router(fixture_state());
        let (status, _, body) = get_response(app, "/api/v1/search/animal").await;
        assert_eq!(status, StatusCode::OK);

        let result = as_json(&body);
        let name = result["name"].as_str().unwrap();
        assert!(name == "cat" || name == "dog");
        assert!(result["url"].as_str().unwrap().starts_with("/static/images/"));
    }

    #[tokio::test]
    async fn test_search_animal_unknown_name() {
        let app = test_router(fixture_state());
        let (status, _, body) =
            get_response(app, "/api/v1/search/animal?name=doesnotexist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            as_json(&body),
            json!({ "message": "Animal not found in the database" })
        );
    }

    #[tokio::test]
    async fn test_search_animal_rejects_non_numeric_id() {
        let app = test_router(fixture_state());
        let (status, _, body) = get_response(app, "/api/v1/search/animal?name=cat&id=abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            as_json(&body),
            json!({ "message": "ID not found in the database" })
        );
    }

    #[tokio::test]
    async fn test_api_responses_are_cached_within_window() {
        let state = fixture_state();
        let app = test_router(state.clone());

        let (first_status, _, first_body) = get_response(app.clone(), "/api").await;
        assert_eq!(state.cache.entry_count().await, 1);

        let (second_status, _, second_body) = get_response(app, "/api").await;
        assert_eq!(first_status, second_status);
        assert_eq!(first_body, second_body);
    }

    #[tokio::test]
    async fn test_search_animal_is_never_cached() {
        let state = fixture_state();
        let app = test_router(state.clone());

        get_response(app.clone(), "/api/v1/search/animal?name=cat").await;
        get_response(app, "/api/v1/search/animal?name=cat").await;
        assert_eq!(state.cache.entry_count().await, 0);
    }
}
