use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clim_core::{
    ObservationStore, PrecipitationSeries, QueryError, Station, Statistics, TemperaturePoint,
};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry::KeyValue;
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde_json::json;

pub const API_PREFIX: &str = "/api/v1.0";

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    store: Arc<dyn ObservationStore>,
    most_active_station: Option<String>,
}

impl AppState {
    fn count(&self, endpoint: &'static str) {
        self.requests_total
            .add(1, &[KeyValue::new("endpoint", endpoint)]);
    }
}

/// Query failure mapped onto an HTTP status and JSON body
pub struct ApiError(QueryError);

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            QueryError::MalformedDate { .. } => (StatusCode::BAD_REQUEST, "malformed_date"),
            QueryError::EmptyResult => (StatusCode::NOT_FOUND, "empty_result"),
            QueryError::NoObservations => (StatusCode::NOT_FOUND, "no_observations"),
            QueryError::Store(e) => {
                tracing::error!(error = ?e, "store query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error")
            }
        };
        let body = json!({ "error": code, "message": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn build_app(
    store: Arc<dyn ObservationStore>,
    most_active_station: Option<String>,
) -> (Router, Arc<AppState>) {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .expect("prom exporter");
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("clim-api");

    let requests_total = meter
        .u64_counter("clim_requests_total")
        .with_description("Total API requests served")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        store,
        most_active_station,
    });

    let router = Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route(&format!("{API_PREFIX}/precipitation"), get(precipitation))
        .route(&format!("{API_PREFIX}/stations"), get(stations))
        .route(&format!("{API_PREFIX}/tobs"), get(tobs))
        .route(&format!("{API_PREFIX}/:start"), get(stats_from))
        .route(&format!("{API_PREFIX}/:start/"), get(stats_from))
        .route(&format!("{API_PREFIX}/:start/:end"), get(stats_between))
        .with_state(Arc::clone(&state));

    (router, state)
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

async fn index() -> Html<String> {
    Html(format!(
        "Available Routes:<br/>\
         <a href='{p}/precipitation'>{p}/precipitation</a><br/>\
         <a href='{p}/stations'>{p}/stations</a><br/>\
         <a href='{p}/tobs'>{p}/tobs</a><br/>\
         <a href='{p}/2016-01-01/'>{p}/&lt;start&gt;/</a><br/>\
         <a href='{p}/2016-01-01/2016-12-31'>{p}/&lt;start&gt;/&lt;end&gt;</a><br/>",
        p = API_PREFIX
    ))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PrecipitationSeries>, ApiError> {
    state.count("precipitation");
    let series = clim_core::precipitation(state.store.as_ref()).await?;
    Ok(Json(series))
}

async fn stations(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Station>>, ApiError> {
    state.count("stations");
    let roster = clim_core::stations(state.store.as_ref()).await?;
    Ok(Json(roster))
}

async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperaturePoint>>, ApiError> {
    state.count("tobs");
    let store = state.store.as_ref();
    let station =
        clim_core::resolve_most_active(store, state.most_active_station.as_deref()).await?;
    let series = clim_core::most_active_station_series(store, &station).await?;
    Ok(Json(series))
}

async fn stats_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<Statistics>, ApiError> {
    state.count("stats");
    let stats = clim_core::range_statistics(state.store.as_ref(), Some(&start), None).await?;
    Ok(Json(stats))
}

async fn stats_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<Statistics>, ApiError> {
    state.count("stats");
    let stats =
        clim_core::range_statistics(state.store.as_ref(), Some(&start), Some(&end)).await?;
    Ok(Json(stats))
}
