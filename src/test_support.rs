// Shared test doubles
use crate::application::errors::{DashboardResult, RoverError};
use crate::application::key_value_store::KeyValueStore;
use crate::application::rover_client::RoverClient;
use crate::domain::mission::{CommandOutcome, MiningSession, NewWaypoint, Waypoint};
use crate::domain::telemetry::{SystemInfo, VehicleData};
use async_trait::async_trait;
use axum::Router;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, serde_json::Value>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> DashboardResult<Option<serde_json::Value>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> DashboardResult<()> {
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> DashboardResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Scripted rover fleet keyed by base URL
#[derive(Debug, Default)]
pub struct FakeRover {
    pub state: Mutex<FakeRoverState>,
}

#[derive(Debug, Default)]
pub struct FakeRoverState {
    /// Base URLs that answer the liveness probe
    pub reachable: HashSet<String>,
    /// Base URLs whose vehicle-status answers `success: false`
    pub failing_status: HashSet<String>,
    pub vehicle_data: VehicleData,
    pub waypoints: Vec<Waypoint>,
    pub logs: Vec<String>,
    pub commands: Vec<(String, String)>,
    pub probes: Vec<String>,
    pub status_calls: usize,
    /// Time each vehicle-status request takes to answer
    pub status_delay: Duration,
    pub log_calls: usize,
}

impl FakeRover {
    pub fn with_reachable(urls: &[&str]) -> Self {
        let rover = Self::default();
        rover
            .state
            .lock()
            .unwrap()
            .reachable
            .extend(urls.iter().map(|u| u.to_string()));
        rover
    }

    pub fn set_reachable(&self, url: &str, reachable: bool) {
        let mut state = self.state.lock().unwrap();
        if reachable {
            state.reachable.insert(url.to_string());
        } else {
            state.reachable.remove(url);
        }
    }

    fn check(&self, base_url: &str) -> Result<(), RoverError> {
        if self.state.lock().unwrap().reachable.contains(base_url) {
            Ok(())
        } else {
            Err(RoverError::Network("connection refused".to_string()))
        }
    }
}

#[async_trait]
impl RoverClient for FakeRover {
    async fn system_status(
        &self,
        base_url: &str,
        _timeout: Duration,
    ) -> Result<serde_json::Value, RoverError> {
        self.state.lock().unwrap().probes.push(base_url.to_string());
        self.check(base_url)?;
        Ok(serde_json::json!({"server_running": true}))
    }

    async fn vehicle_status(&self, base_url: &str) -> Result<VehicleData, RoverError> {
        self.check(base_url)?;
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.status_calls += 1;
            state.status_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock().unwrap();
        if state.failing_status.contains(base_url) {
            return Err(RoverError::Rejected("Vehicle controller not initialized".to_string()));
        }
        Ok(state.vehicle_data.clone())
    }

    async fn system_info(&self, base_url: &str) -> Result<SystemInfo, RoverError> {
        self.check(base_url)?;
        Ok(SystemInfo {
            hostname: "rover".to_string(),
            ..SystemInfo::default()
        })
    }

    async fn logs(&self, base_url: &str, lines: u32) -> Result<Vec<String>, RoverError> {
        self.check(base_url)?;
        let mut state = self.state.lock().unwrap();
        state.log_calls += 1;
        Ok(state.logs.iter().take(lines as usize).cloned().collect())
    }

    async fn waypoints(&self, base_url: &str) -> Result<Vec<Waypoint>, RoverError> {
        self.check(base_url)?;
        Ok(self.state.lock().unwrap().waypoints.clone())
    }

    async fn create_waypoint(
        &self,
        base_url: &str,
        waypoint: &NewWaypoint,
    ) -> Result<String, RoverError> {
        self.check(base_url)?;
        let mut state = self.state.lock().unwrap();
        let id = state.waypoints.len() as i64 + 1;
        state.waypoints.push(Waypoint {
            id,
            name: waypoint.name.clone(),
            x: waypoint.x,
            y: waypoint.y,
            kind: waypoint.kind.clone(),
            status: "pending".to_string(),
            priority: waypoint.priority,
            created_at: None,
            completed_at: None,
        });
        Ok("Waypoint added successfully".to_string())
    }

    async fn delete_waypoint(&self, base_url: &str, id: i64) -> Result<String, RoverError> {
        self.check(base_url)?;
        let mut state = self.state.lock().unwrap();
        let before = state.waypoints.len();
        state.waypoints.retain(|w| w.id != id);
        if state.waypoints.len() == before {
            return Err(RoverError::Rejected("Waypoint not found".to_string()));
        }
        Ok("Waypoint deleted successfully".to_string())
    }

    async fn mining_sessions(&self, base_url: &str) -> Result<Vec<MiningSession>, RoverError> {
        self.check(base_url)?;
        Ok(Vec::new())
    }

    async fn send_command(
        &self,
        base_url: &str,
        command: &str,
    ) -> Result<CommandOutcome, RoverError> {
        self.check(base_url)?;
        self.state
            .lock()
            .unwrap()
            .commands
            .push((base_url.to_string(), command.to_string()));
        let known = crate::domain::mission::KNOWN_COMMANDS.contains(&command);
        Ok(CommandOutcome {
            success: known,
            message: if known {
                format!("{} ok", command)
            } else {
                "Unknown command".to_string()
            },
        })
    }
}

/// Serve a router on an ephemeral localhost port and return its base URL
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
