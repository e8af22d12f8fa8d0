// Route table for the dashboard API
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
        .route("/vehicles", get(list_vehicles).post(add_vehicle))
        .route("/vehicles/disconnect", post(disconnect_vehicle))
        .route("/vehicles/:id", delete(remove_vehicle))
        .route("/vehicles/:id/connect", post(connect_vehicle))
        .route("/discovery/scan", post(start_scan))
        .route("/discovery/progress", get(scan_progress))
        .route("/discovery/events", get(scan_events))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/tab", put(select_tab))
        .route("/control", post(send_command))
        .route("/control/commands", get(list_commands))
        .route("/waypoints", post(create_waypoint))
        .route("/waypoints/:id", delete(delete_waypoint))
        .route("/map.png", get(map_png))
        .route("/map/click", post(map_click))
        .route(
            "/api/vehicle-data",
            get(vehicle_data_snapshot).post(ingest_vehicle_data),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
