// src/dashboard/server.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::cache::DashboardCache;
use super::pages::{build_page, DashboardFilters, PageKind, PageQuery};
use super::render::OutputFormat;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::utils::common::encode_metrics;
use crate::utils::prometheus_metrics::register_metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PipelineConfig>,
    pub cache: Arc<DashboardCache>,
}

impl AppState {
    pub fn new(config: PipelineConfig, cache: DashboardCache) -> Self {
        AppState {
            config: Arc::new(config),
            cache: Arc::new(cache),
        }
    }
}

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn metrics_handler() -> (StatusCode, String) {
    match encode_metrics() {
        Ok(s) => (StatusCode::OK, s),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

pub async fn page_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(kind) = PageKind::from_slug(&slug) else {
        return (StatusCode::NOT_FOUND, format!("Unknown page '{}'", slug)).into_response();
    };
    let filters = match DashboardFilters::from_query(&query) {
        Ok(f) => f,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let format = match OutputFormat::parse(query.format.as_deref()) {
        Ok(f) => f,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let run = match state.cache.get_or_run(&state.config).await {
        Ok(run) => run,
        Err(e) => {
            error!("Pipeline run for page '{}' failed: {}", kind, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let view = build_page(kind, &run, &filters);
    let warnings = view.widgets.iter().filter(|w| w.is_warning()).count();
    if warnings > 0 {
        warn!("Page '{}' rendered with {} failed widget(s)", kind, warnings);
    }

    let renderer = format.renderer();
    match renderer.render(&view) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, renderer.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render page '{}': {}", kind, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub fn router(state: AppState) -> Router {
    register_metrics();
    Router::new()
        .route("/health", get(health_handler))
        .route("/pages/:page", get(page_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Binds `host:port` and serves until the process is stopped.
pub async fn serve(host: &str, port: u16, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard available at http://{}/pages/overview", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::token::WhitespaceTokenCounter;

    fn state() -> AppState {
        let mut config = PipelineConfig::default();
        config.input.path = "does/not/exist.csv".into();
        config.show_progress = false;
        AppState::new(
            config,
            DashboardCache::new(Arc::new(WhitespaceTokenCounter::new(512))),
        )
    }

    fn query() -> Query<PageQuery> {
        Query(PageQuery::default())
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health_handler().await, "OK");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        register_metrics();
        let (status, body) = metrics_handler().await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("sentiment_pipeline_runs_total"));
        assert!(body.contains("sentiment_duplicates_removed_total"));
        assert!(body.contains("sentiment_pipeline_duration_seconds"));
    }

    #[test]
    fn test_router_registers_metrics_before_any_run() {
        let _app = router(state());
        let body = encode_metrics().unwrap();
        assert!(body.contains("sentiment_records_loaded_total"));
        assert!(body.contains("sentiment_labels_dropped_total"));
    }

    #[tokio::test]
    async fn test_unknown_page_is_not_found() {
        let response =
            page_handler(State(state()), Path("settings".to_string()), query()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_filters_are_rejected_before_running() {
        let st = state();
        let bad = Query(PageQuery {
            samples: Some(99),
            ..Default::default()
        });
        let response = page_handler(State(st.clone()), Path("overview".to_string()), bad).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bad_format = Query(PageQuery {
            format: Some("xml".to_string()),
            ..Default::default()
        });
        let response =
            page_handler(State(st.clone()), Path("overview".to_string()), bad_format).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(st.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_pipeline_failure_is_a_server_error() {
        let response = page_handler(State(state()), Path("overview".to_string()), query()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
