// Command service - Forwards control commands and waypoint edits to the active rover
use crate::application::errors::{DashboardError, DashboardResult};
use crate::application::rover_client::RoverClient;
use crate::application::vehicle_registry::VehicleRegistry;
use crate::domain::dashboard::DashboardState;
use crate::domain::mission::{CommandOutcome, NewWaypoint};
use crate::domain::telemetry::Point;
use crate::domain::vehicle::Vehicle;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct CommandService {
    client: Arc<dyn RoverClient>,
    registry: VehicleRegistry,
    state: Arc<RwLock<DashboardState>>,
}

impl CommandService {
    pub fn new(
        client: Arc<dyn RoverClient>,
        registry: VehicleRegistry,
        state: Arc<RwLock<DashboardState>>,
    ) -> Self {
        Self {
            client,
            registry,
            state,
        }
    }

    async fn active_vehicle(&self) -> DashboardResult<Vehicle> {
        self.registry
            .active()
            .await
            .ok_or(DashboardError::NoActiveVehicle)
    }

    /// Forward `command` as-is; the rover decides whether it is legal
    pub async fn send(&self, command: &str) -> DashboardResult<CommandOutcome> {
        let command = command.trim();
        if command.is_empty() {
            return Err(DashboardError::Validation("Command is required".to_string()));
        }
        let vehicle = self.active_vehicle().await?;

        let outcome = self
            .client
            .send_command(&vehicle.url, command)
            .await
            .map_err(|e| {
                tracing::warn!("Command '{}' to {} failed: {}", command, vehicle.name, e);
                DashboardError::Remote(format!("Failed to send command: {}", e))
            })?;

        if outcome.success {
            tracing::info!("Command '{}' accepted by {}: {}", command, vehicle.name, outcome.message);
        } else {
            tracing::warn!("Command '{}' refused by {}: {}", command, vehicle.name, outcome.message);
        }
        Ok(outcome)
    }

    pub async fn create_waypoint(&self, waypoint: NewWaypoint) -> DashboardResult<String> {
        if waypoint.name.trim().is_empty() {
            return Err(DashboardError::Validation("Waypoint name is required".to_string()));
        }
        let vehicle = self.active_vehicle().await?;

        let message = self
            .client
            .create_waypoint(&vehicle.url, &waypoint)
            .await
            .map_err(|e| DashboardError::Remote(format!("Failed to add waypoint: {}", e)))?;

        tracing::info!("Waypoint '{}' added at ({}, {})", waypoint.name, waypoint.x, waypoint.y);
        self.state.write().await.staged_waypoint = None;
        self.refresh_waypoints(&vehicle).await;
        Ok(message)
    }

    pub async fn delete_waypoint(&self, id: i64) -> DashboardResult<String> {
        let vehicle = self.active_vehicle().await?;

        let message = self
            .client
            .delete_waypoint(&vehicle.url, id)
            .await
            .map_err(|e| DashboardError::Remote(format!("Failed to delete waypoint: {}", e)))?;

        tracing::info!("Waypoint {} deleted", id);
        self.refresh_waypoints(&vehicle).await;
        Ok(message)
    }

    /// Hold a map position for the next waypoint until it is confirmed
    pub async fn stage_waypoint(&self, position: Point) {
        self.state.write().await.staged_waypoint = Some(position);
    }

    async fn refresh_waypoints(&self, vehicle: &Vehicle) {
        match self.client.waypoints(&vehicle.url).await {
            Ok(waypoints) => {
                let mut state = self.state.write().await;
                // The view may have moved on to another vehicle meanwhile
                if state.vehicle_id.as_deref() == Some(vehicle.id.as_str()) {
                    state.waypoints = waypoints;
                }
            }
            Err(e) => tracing::debug!("Waypoint refresh failed: {}", e),
        }
    }
}
