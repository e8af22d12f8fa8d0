// HTTP request handlers
use crate::application::discovery_service::ScanClaim;
use crate::application::errors::{DashboardError, DashboardResult};
use crate::application::map_renderer::{MapTransform, encode_png, render_frame};
use crate::domain::dashboard::{DashboardState, DashboardTab};
use crate::domain::mission::{KNOWN_COMMANDS, NewWaypoint};
use crate::domain::telemetry::{MapData, Point};
use crate::domain::vehicle::Vehicle;
use crate::infrastructure::http_response::{ApiResponse, png_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;

const MAX_MAP_SIDE: u32 = 2048;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct AddVehicleRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Deserialize)]
pub struct ScanQuery {
    /// Block until the scan finishes and return what it found
    #[serde(default)]
    pub wait: bool,
}

#[derive(Deserialize)]
pub struct TabRequest {
    pub tab: DashboardTab,
}

#[derive(Deserialize)]
pub struct ControlRequest {
    #[serde(default)]
    pub command: String,
}

/// Waypoint body. Without coordinates the staged map click is used.
#[derive(Deserialize)]
pub struct WaypointRequest {
    #[serde(default)]
    pub name: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<i32>,
}

#[derive(Deserialize)]
pub struct MapQuery {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Deserialize)]
pub struct MapClick {
    pub x: f64,
    pub y: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub active_vehicle: Option<Vehicle>,
    pub polling: bool,
    #[serde(flatten)]
    pub state: DashboardState,
}

fn map_size(state: &AppState, width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    (
        width.unwrap_or(state.map.width).clamp(1, MAX_MAP_SIDE),
        height.unwrap_or(state.map.height).clamp(1, MAX_MAP_SIDE),
    )
}

async fn current_map(state: &AppState) -> Option<MapData> {
    let view = state.poller.state();
    let view = view.read().await;
    view.vehicle_data.as_ref().map(|data| data.map_data.clone())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> DashboardResult<impl IntoResponse> {
    let session = state.sessions.login(&request.email, &request.password).await?;
    state.dashboard.resume().await;
    Ok(ApiResponse::ok(session))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> DashboardResult<impl IntoResponse> {
    state.dashboard.logout().await?;
    Ok(ApiResponse::ok_message("Logged out"))
}

pub async fn current_session(
    State(state): State<Arc<AppState>>,
) -> DashboardResult<impl IntoResponse> {
    let session = state.sessions.require().await?;
    Ok(ApiResponse::ok(session))
}

pub async fn list_vehicles(State(state): State<Arc<AppState>>) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    Ok(ApiResponse::ok(state.registry.list().await))
}

pub async fn add_vehicle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddVehicleRequest>,
) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    let vehicle = state.registry.add(&request.name, &request.url).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(vehicle)))
}

pub async fn remove_vehicle(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    state.dashboard.remove(&id).await?;
    Ok(ApiResponse::ok_message("Vehicle removed"))
}

pub async fn connect_vehicle(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    let vehicle = state.dashboard.connect(&id).await?;
    Ok(ApiResponse::ok(vehicle))
}

pub async fn disconnect_vehicle(
    State(state): State<Arc<AppState>>,
) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    state.dashboard.disconnect().await?;
    Ok(ApiResponse::ok_message("Disconnected"))
}

async fn sweep_and_register(state: &AppState, claim: ScanClaim) -> DashboardResult<Vec<Vehicle>> {
    let known = state.registry.known_urls().await;
    let found = state.discovery.sweep(claim, &known).await;
    state.registry.add_discovered(found).await
}

/// Start a discovery sweep, in the background unless `?wait=true`
pub async fn start_scan(
    Query(query): Query<ScanQuery>,
    State(state): State<Arc<AppState>>,
) -> DashboardResult<Response> {
    state.sessions.require().await?;
    let claim = state.discovery.claim_all()?;

    if query.wait {
        let added = sweep_and_register(&state, claim).await?;
        return Ok(ApiResponse::ok(added).into_response());
    }

    let started = state.discovery.progress();
    let background = state.clone();
    tokio::spawn(async move {
        match sweep_and_register(&background, claim).await {
            Ok(added) => tracing::info!("Registered {} discovered vehicles", added.len()),
            Err(e) => tracing::warn!("Discovery scan failed: {}", e),
        }
    });
    Ok((StatusCode::ACCEPTED, ApiResponse::ok(started)).into_response())
}

pub async fn scan_progress(State(state): State<Arc<AppState>>) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    Ok(ApiResponse::ok(state.discovery.progress()))
}

/// Server-sent progress events until the running scan ends
pub async fn scan_events(
    State(state): State<Arc<AppState>>,
) -> DashboardResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    state.sessions.require().await?;
    let mut rx = state.discovery.subscribe();

    let stream = async_stream::stream! {
        loop {
            let progress = *rx.borrow_and_update();
            match Event::default().event("progress").json_data(progress) {
                Ok(event) => {
                    yield Ok::<Event, Infallible>(event);
                }
                Err(e) => {
                    tracing::debug!("Dropping progress event: {}", e);
                    break;
                }
            }
            if !progress.running || rx.changed().await.is_err() {
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    Ok(ApiResponse::ok(DashboardView {
        active_vehicle: state.registry.active().await,
        polling: state.poller.is_running().await,
        state: state.poller.snapshot().await,
    }))
}

pub async fn select_tab(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TabRequest>,
) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    state.poller.select_tab(request.tab).await;
    Ok(ApiResponse::ok(request.tab))
}

/// Forward a command. The rover's own verdict is passed through.
pub async fn send_command(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ControlRequest>,
) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    let outcome = state.commands.send(&request.command).await?;
    Ok(Json(ApiResponse::<()> {
        success: outcome.success,
        data: None,
        message: Some(outcome.message),
    }))
}

pub async fn list_commands(State(state): State<Arc<AppState>>) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    Ok(ApiResponse::ok(KNOWN_COMMANDS))
}

pub async fn create_waypoint(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WaypointRequest>,
) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;

    let position = match (request.x, request.y) {
        (Some(x), Some(y)) => Point(x, y),
        _ => state
            .poller
            .state()
            .read()
            .await
            .staged_waypoint
            .ok_or_else(|| DashboardError::Validation("Pick a position on the map first".to_string()))?,
    };

    let waypoint = NewWaypoint {
        name: request.name,
        x: position.x(),
        y: position.y(),
        kind: request.kind.unwrap_or_else(|| "mining".to_string()),
        priority: request.priority.unwrap_or(1),
    };
    let message = state.commands.create_waypoint(waypoint).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok_message(message)))
}

pub async fn delete_waypoint(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    let message = state.commands.delete_waypoint(id).await?;
    Ok(ApiResponse::ok_message(message))
}

/// Current map frame as PNG; black until telemetry arrives
pub async fn map_png(Query(query): Query<MapQuery>, State(state): State<Arc<AppState>>) -> Response {
    if let Err(e) = state.sessions.require().await {
        return e.into_response();
    }

    let (width, height) = map_size(&state, query.width, query.height);
    let map = current_map(&state).await.unwrap_or_default();
    let frame = render_frame(&map, state.map.region_size, width, height);

    match encode_png(&frame) {
        Ok(png) => match png_response(png) {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => {
            tracing::error!("PNG encoding error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Translate a click on the rendered frame into a staged waypoint position
pub async fn map_click(
    State(state): State<Arc<AppState>>,
    Json(click): Json<MapClick>,
) -> DashboardResult<impl IntoResponse> {
    state.sessions.require().await?;
    let map = current_map(&state)
        .await
        .ok_or_else(|| DashboardError::Validation("No map data received yet".to_string()))?;

    let (width, height) = map_size(&state, click.width, click.height);
    let position = MapTransform::for_region(&map, state.map.region_size, width, height)
        .to_map(click.x, click.y);
    state.commands.stage_waypoint(position).await;
    Ok(ApiResponse::ok(position))
}

pub async fn ingest_vehicle_data(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let stored = state.vehicle_data.append(payload).await;
    tracing::debug!("Stored vehicle data entry ({} in history)", stored);
    ApiResponse::ok_message("Data received")
}

pub async fn vehicle_data_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ApiResponse::ok(state.vehicle_data.snapshot().await)
}
