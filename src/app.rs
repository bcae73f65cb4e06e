#![cfg(feature = "web")]

use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{delete, get, post},
};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::backup;
use crate::chart::{ChartDefinition, ChartDraft, ChartKind, Sector, SectorInfo};
use crate::config::ServerConfig;
use crate::dashboard;
use crate::error::{InferenceError, LoadError, UpstreamError};
use crate::inference::{Preview, infer_series};
use crate::loader::{rows_from_bytes, rows_from_json};
use crate::providers::{CannedProvider, ChartProvider, health_records, provide_or_empty};
use crate::record::Row;
use crate::store::{ChartStore, FileBackend, StorageBackend, StoreEvent};
use crate::upstream::UpstreamClient;

const SECTOR_CACHE: &str = "s-maxage=120, stale-while-revalidate=600";
const DATA_GOV_CACHE: &str = "s-maxage=300, stale-while-revalidate=1800";
const HEALTH_CACHE: &str = "s-maxage=180, stale-while-revalidate=900";
const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// Store type shared by the handlers
pub type SharedStore = ChartStore<Box<dyn StorageBackend>>;

pub struct AppState {
    pub config: ServerConfig,
    pub store: SharedStore,
    pub provider: Arc<dyn ChartProvider>,
    pub upstream: UpstreamClient,
    events: broadcast::Sender<StoreEvent>,
}

impl AppState {
    /// Wires the store's change notifications into the SSE broadcaster
    pub fn new(
        config: ServerConfig,
        backend: Box<dyn StorageBackend>,
        provider: Arc<dyn ChartProvider>,
    ) -> Result<Arc<Self>, UpstreamError> {
        let upstream =
            UpstreamClient::new(config.upstream_timeout, config.data_gov_api_key.clone())?
                .with_private_hosts(config.allow_private_upstream);
        Ok(Self::with_upstream(config, backend, provider, upstream))
    }

    pub fn with_upstream(
        config: ServerConfig,
        backend: Box<dyn StorageBackend>,
        provider: Arc<dyn ChartProvider>,
        upstream: UpstreamClient,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        let store = ChartStore::new(backend);

        let forward = events.clone();
        store.subscribe(Arc::new(move |event: &StoreEvent| {
            // no receivers is fine
            let _ = forward.send(event.clone());
        }));

        Arc::new(AppState {
            config,
            store,
            provider,
            upstream,
            events,
        })
    }
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

#[derive(Deserialize)]
struct SectorQuery {
    sector: Option<String>,
}

#[derive(Deserialize)]
struct PreviewQuery {
    #[serde(rename = "type", alias = "kind")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct RemotePreviewRequest {
    url: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(rename = "type", alias = "kind", default)]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct PageQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend = FileBackend::open(&config.data_dir)?;
    let addr = config.addr.clone();
    let state = AppState::new(config, Box::new(backend), Arc::new(CannedProvider))?;

    let app = router(state);

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router over `state`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/sectors", get(list_sectors))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/charts/:sector", get(get_sector_charts))
        .route(
            "/api/custom-charts",
            get(list_custom_charts)
                .post(create_custom_chart)
                .delete(clear_custom_charts),
        )
        .route("/api/custom-charts/events", get(custom_chart_events))
        .route("/api/custom-charts/export", get(export_custom_charts))
        .route("/api/custom-charts/import", post(import_custom_charts))
        .route("/api/custom-charts/:id", delete(delete_custom_chart))
        .route("/api/preview", post(preview_upload))
        .route("/api/preview/remote", post(preview_remote))
        .route("/api/datagov/:resource_id", get(get_data_gov))
        .route("/api/india/health/:kind", get(get_health_records))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn sector_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Sector not found", "accepted": Sector::names() })),
    )
        .into_response()
}

fn multipart_error(e: &MultipartError) -> (StatusCode, String) {
    log::warn!("Rejected multipart upload: {}", e);
    (e.status(), format!("Invalid upload: {}", e.body_text()))
}

/// Reads the file field called `name`, consuming the whole form
///
/// Returns the file name and contents, or `None` if the field is absent.
async fn read_upload(
    multipart: &mut Multipart,
    name: &str,
) -> Result<Option<(String, Vec<u8>)>, MultipartError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(name) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            upload = Some((file_name, data.to_vec()));
        }
    }
    Ok(upload)
}

fn parse_kind(kind: Option<&str>) -> Result<ChartKind, Response> {
    kind.unwrap_or("bar")
        .parse()
        .map_err(|e: crate::error::ValidationError| {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        })
}

fn preview_response(rows: &[Row], kind: ChartKind, state: &AppState) -> Response {
    match infer_series(rows, kind, state.config.alignment) {
        Ok(preview) => Json::<Preview>(preview).into_response(),
        Err(InferenceError::NoData) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "No preview available")
        }
    }
}

async fn list_sectors() -> Json<Vec<SectorInfo>> {
    Json(Sector::ALL.into_iter().map(SectorInfo::from).collect())
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(dashboard::dashboard(state.provider.as_ref(), &state.store).await)
}

async fn get_sector_charts(
    Path(sector): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let sector: Sector = match sector.parse() {
        Ok(sector) => sector,
        Err(_) => return sector_not_found(),
    };

    let charts = provide_or_empty(state.provider.as_ref(), sector).await;
    ([(header::CACHE_CONTROL, SECTOR_CACHE)], Json(charts)).into_response()
}

async fn list_custom_charts(
    Query(params): Query<SectorQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match params.sector.as_deref() {
        None => Json(state.store.list()).into_response(),
        Some(name) => match name.parse::<Sector>() {
            Ok(sector) => Json(state.store.list_by_sector(sector)).into_response(),
            Err(_) => sector_not_found(),
        },
    }
}

async fn create_custom_chart(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ChartDraft>,
) -> Response {
    let chart = match ChartDefinition::from_draft(draft) {
        Ok(chart) => chart,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.store.add(chart.clone()) {
        Ok(()) => {
            log::info!("saved custom chart {} in {}", chart.id, chart.sector);
            (StatusCode::CREATED, Json(chart)).into_response()
        }
        Err(e) => {
            log::error!("Error saving custom chart: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save chart")
        }
    }
}

async fn delete_custom_chart(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.store.remove(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            log::error!("Error deleting custom chart {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete chart")
        }
    }
}

async fn clear_custom_charts(State(state): State<Arc<AppState>>) -> Response {
    match state.store.clear() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            log::error!("Error clearing custom charts: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to clear charts")
        }
    }
}

async fn custom_chart_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();

    let stream = futures_util::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let sse = Event::default().event("change").data(event.key);
                    return Some((Ok(sse), receiver));
                }
                // a slow client only needs to know something changed
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn export_custom_charts(State(state): State<Arc<AppState>>) -> Response {
    let charts = state.store.list();

    match backup::backup_to_bytes(&charts) {
        Ok(buffer) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/gzip")
            .header(
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"govgraph-charts.json.gz\"",
            )
            .body(Body::from(buffer))
            .unwrap_or_else(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn import_custom_charts(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let file_data = match read_upload(&mut multipart, "backup").await {
        Ok(upload) => upload.map(|(_, data)| data).unwrap_or_default(),
        Err(e) => {
            let (status, message) = multipart_error(&e);
            return (
                status,
                Json(StatusResponse {
                    status: "error".to_string(),
                    message: Some(message),
                }),
            )
                .into_response();
        }
    };

    if file_data.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusResponse {
                status: "error".to_string(),
                message: Some("No file data received".to_string()),
            }),
        )
            .into_response();
    }

    let charts = match backup::backup_from_bytes(&file_data) {
        Ok(charts) => charts,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(StatusResponse {
                    status: "error".to_string(),
                    message: Some(format!("Failed to load backup: {}", e)),
                }),
            )
                .into_response();
        }
    };

    let count = charts.len();
    match state.store.replace_all(charts) {
        Ok(()) => Json(StatusResponse {
            status: "ok".to_string(),
            message: Some(format!("Imported {} charts", count)),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn preview_upload(
    Query(params): Query<PreviewQuery>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let kind = match parse_kind(params.kind.as_deref()) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let (name, data) = match read_upload(&mut multipart, "file").await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, "No file data received"),
        Err(e) => {
            let (status, message) = multipart_error(&e);
            return error_response(status, message);
        }
    };

    let rows = match rows_from_bytes(&name, &data) {
        Ok(rows) => rows,
        Err(e @ (LoadError::UnsupportedExtension(_) | LoadError::MissingExtension)) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Unsupported file type: {}. Please upload CSV or Excel files only.", e),
            );
        }
        Err(e) => {
            log::warn!("Error processing upload {}: {}", name, e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    preview_response(&rows, kind, &state)
}

async fn preview_remote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RemotePreviewRequest>,
) -> Response {
    let kind = match parse_kind(request.kind.as_deref()) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    if request.url.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "API URL required");
    }

    let payload = match state
        .upstream
        .fetch_json(request.url.trim(), request.api_key.as_deref())
        .await
    {
        Ok(payload) => payload,
        Err(e) if e.is_rejected_request() => {
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
        Err(e) => {
            log::warn!("API preview fetch from {} failed: {}", request.url, e);
            return error_response(StatusCode::BAD_GATEWAY, "Failed to fetch data from API");
        }
    };

    preview_response(&rows_from_json(&payload), kind, &state)
}

async fn get_data_gov(
    Path(resource_id): Path<String>,
    Query(page): Query<PageQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let limit = page.limit.unwrap_or(100);
    let offset = page.offset.unwrap_or(0);

    let records = match state
        .upstream
        .data_gov_records(&resource_id, limit, offset)
        .await
    {
        Ok(records) => records,
        Err(e) => {
            log::warn!("Data.gov.in API error for {}: {}", resource_id, e);
            Vec::new()
        }
    };

    ([(header::CACHE_CONTROL, DATA_GOV_CACHE)], Json(records)).into_response()
}

async fn get_health_records(Path(kind): Path<String>) -> Response {
    let records = health_records(&kind);
    ([(header::CACHE_CONTROL, HEALTH_CACHE)], Json(json!({ "records": records }))).into_response()
}
