//! Local map server.
//!
//! Serves the campus selector page and an HTTP API that renders impact maps
//! on demand, either inline for preview or as downloads.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use impact_zone::config::AppConfig;
use impact_zone::export::{export_optional_png, HeadlessBrowser, OptionalExport};
use impact_zone::geometry::GeometryBuilder;
use impact_zone::models::{RadiusBounds, ZoneSummary};
use impact_zone::render::{InteractiveRenderer, Renderer, StaticRenderer};
use impact_zone::source::{CampusStore, SourceLocation};
use impact_zone::ImpactMapPipeline;

mod page;
mod response;
use response::{artifact_response, error_response};

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "School construction impact map server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config
    #[arg(short, long)]
    listen: Option<String>,

    /// Campus CSV (URL or path), overrides the config
    #[arg(long)]
    source: Option<String>,
}

/// Application state shared across handlers
struct AppState {
    store: CampusStore,
    radius: RadiusBounds,
    builder: GeometryBuilder,
    interactive: InteractiveRenderer,
    static_map: StaticRenderer,
    browser: HeadlessBrowser,
}

type ApiError = (StatusCode, String);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    let location: SourceLocation = match &args.source {
        Some(s) => s.parse().with_context(|| format!("Invalid campus source: {}", s))?,
        None => config.source.location()?,
    };
    let listen = args.listen.unwrap_or_else(|| config.server.listen.clone());

    info!("Impact map server");

    // Load eagerly so a bad source fails at startup
    let store = CampusStore::new(location, config.source.columns.clone());
    store.table().await.context("Failed to load campus data")?;

    let state = Arc::new(AppState {
        store,
        radius: config.radius,
        builder: config.geometry.builder(),
        interactive: InteractiveRenderer::new(config.interactive.clone()),
        static_map: StaticRenderer::new(config.static_map.clone()),
        browser: HeadlessBrowser::new(config.export.browser.clone())
            .with_window(config.export.window_width, config.export.window_height)
            .with_delay(Duration::from_secs(config.export.capture_delay_secs)),
    });

    // Build router
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/campuses", get(campuses_handler))
        .route("/api/zone", get(zone_handler))
        .route("/api/map", get(map_handler))
        .route("/api/static", get(static_handler))
        .route("/api/map.png", get(capture_handler))
        .route("/api/reload", post(reload_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        campuses_loaded: state.store.is_loaded().await,
    })
}

/// Campus labels for the selector plus the slider bounds
async fn campuses_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CampusesResponse>, ApiError> {
    let table = state.store.table().await.map_err(error_response)?;
    Ok(Json(CampusesResponse {
        campuses: table.labels().into_iter().map(str::to_string).collect(),
        radius: state.radius,
    }))
}

/// Buffer geometry as JSON
async fn zone_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapParams>,
) -> Result<Json<ZoneSummary>, ApiError> {
    let table = state.store.table().await.map_err(error_response)?;
    let radius = state
        .radius
        .check_or_default(params.radius)
        .map_err(error_response)?;
    let pipeline = ImpactMapPipeline::new(&table, state.builder);
    let prepared = pipeline
        .prepare(&params.label, radius)
        .map_err(error_response)?;
    Ok(Json(prepared.zone.summary(&prepared.campus.label)))
}

/// Interactive HTML map
async fn map_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapParams>,
) -> Result<Response, ApiError> {
    render_with(&state, &state.interactive, params).await
}

/// Static PNG map
async fn static_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapParams>,
) -> Result<Response, ApiError> {
    render_with(&state, &state.static_map, params).await
}

async fn render_with(
    state: &AppState,
    renderer: &(dyn Renderer + Sync),
    params: MapParams,
) -> Result<Response, ApiError> {
    let table = state.store.table().await.map_err(error_response)?;
    let radius = state
        .radius
        .check_or_default(params.radius)
        .map_err(error_response)?;
    let pipeline = ImpactMapPipeline::new(&table, state.builder);
    let output = pipeline
        .run(renderer, &params.label, radius)
        .map_err(error_response)?;
    Ok(artifact_response(output.artifact, params.download))
}

/// Headless capture of the interactive map
async fn capture_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapParams>,
) -> Result<Response, ApiError> {
    let table = state.store.table().await.map_err(error_response)?;
    let radius = state
        .radius
        .check_or_default(params.radius)
        .map_err(error_response)?;
    let pipeline = ImpactMapPipeline::new(&table, state.builder);
    let prepared = pipeline
        .prepare(&params.label, radius)
        .map_err(error_response)?;

    let html = state
        .interactive
        .build_map(prepared.campus, &prepared.zone)
        .to_html();

    match export_optional_png(&state.browser, &prepared.campus.label, &html).await {
        OptionalExport::Exported(artifact) => Ok(artifact_response(artifact, true)),
        OptionalExport::Skipped(message) => Err((StatusCode::SERVICE_UNAVAILABLE, message)),
    }
}

/// Drop the cached table and load it again
async fn reload_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, ApiError> {
    state.store.clear().await;
    let table = state.store.table().await.map_err(error_response)?;
    info!("Reloaded {} campuses from {}", table.len(), state.store.location());
    Ok(Json(ReloadResponse {
        campuses: table.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct MapParams {
    label: String,
    radius: Option<f64>,
    /// Serve as an attachment instead of inline
    #[serde(default)]
    download: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    campuses_loaded: bool,
}

#[derive(Serialize)]
struct CampusesResponse {
    campuses: Vec<String>,
    radius: RadiusBounds,
}

#[derive(Serialize)]
struct ReloadResponse {
    campuses: usize,
}
