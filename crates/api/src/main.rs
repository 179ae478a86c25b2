use axum::{
    extract::{Path, Query, State},
    http::Method,
    routing::get,
    Json, Router,
};
use chartboard_core::config::{QueryLimits, Settings};
use chartboard_core::domain::region::Region;
use chartboard_core::domain::track::TrackMetadata;
use chartboard_core::service::{ChartDateBounds, ChartPerformance, DailyChartEntry};
use chartboard_core::storage::PgChartStore;
use chartboard_core::time::parse_calendar_date;
use chartboard_core::{ChartError, ChartService};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;

use error::ApiError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match chartboard_core::storage::migrate(&pool).await {
                Ok(()) => Some(pool),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    let limits = QueryLimits::from_env();
    tracing::info!(?limits, "query limits");

    let service =
        pool.map(|pool| ChartService::from_store(Arc::new(PgChartStore::new(pool)), limits));
    let state = AppState { service };

    let app = router(state);

    let port = settings.port.unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/regions", get(list_regions))
        .route("/regions/:region/dates", get(get_chart_date_bounds))
        .route("/charts/:region/daily/:date", get(get_daily_charts))
        .route("/charts/:region/performance", get(get_chart_performance))
        .route("/tracks/:track_id", get(get_track_metadata))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    service: Option<ChartService>,
}

impl AppState {
    fn service(&self) -> Result<&ChartService, ApiError> {
        self.service
            .as_ref()
            .ok_or_else(|| ApiError::unavailable("chart store is not connected"))
    }
}

async fn list_regions(State(state): State<AppState>) -> Result<Json<Vec<Region>>, ApiError> {
    let service = state.service()?;
    Ok(Json(service.list_regions().await?))
}

async fn get_chart_date_bounds(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<ChartDateBounds>, ApiError> {
    let service = state.service()?;
    Ok(Json(service.chart_date_bounds(&region).await?))
}

async fn get_daily_charts(
    State(state): State<AppState>,
    Path((region, date)): Path<(String, String)>,
) -> Result<Json<Vec<DailyChartEntry>>, ApiError> {
    let service = state.service()?;
    let date = parse_calendar_date(&date)?;
    Ok(Json(service.get_daily_charts(&region, date).await?))
}

// Missing fields are reported by the handler as `InvalidArgument`.
#[derive(Debug, Deserialize)]
struct PerformanceParams {
    /// Comma-separated track ids.
    track_ids: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

async fn get_chart_performance(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Query(params): Query<PerformanceParams>,
) -> Result<Json<ChartPerformance>, ApiError> {
    let start = parse_calendar_date(&require_param("start", params.start)?)?;
    let end = parse_calendar_date(&require_param("end", params.end)?)?;
    let track_ids = split_track_ids(&require_param("track_ids", params.track_ids)?);
    let service = state.service()?;

    Ok(Json(
        service
            .get_chart_performance_of_tracks(&region, &track_ids, start, end)
            .await?,
    ))
}

async fn get_track_metadata(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
) -> Result<Json<TrackMetadata>, ApiError> {
    let service = state.service()?;
    Ok(Json(service.get_track_metadata(&track_id).await?))
}

fn require_param(name: &str, value: Option<String>) -> Result<String, ChartError> {
    value.ok_or_else(|| ChartError::invalid_argument(format!("missing query parameter: {name}")))
}

// Empty input stays empty so the service rejects it as a missing argument.
fn split_track_ids(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|s| s.to_string()).collect()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
