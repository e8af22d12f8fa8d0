// Dashboard view state, fed by the telemetry poller
use super::mission::{MiningSession, Waypoint};
use super::telemetry::{Point, SystemInfo, VehicleData};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    Overview,
    Map,
    Logs,
    Waypoints,
    Mining,
}

/// Outcome of one conditional request in a poll cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    /// Not requested this cycle (tab not selected)
    Skipped,
    /// Requested, but the safe fetch returned no data
    Missing,
    Fetched(T),
}

impl<T> From<Option<T>> for Fetch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Fetch::Fetched(v),
            None => Fetch::Missing,
        }
    }
}

/// Everything one telemetry poll cycle brought back
#[derive(Debug, Clone)]
pub struct PollCycle {
    pub generation: u64,
    pub vehicle_data: Option<VehicleData>,
    pub system_info: Option<SystemInfo>,
    pub logs: Fetch<Vec<String>>,
    pub waypoints: Fetch<Vec<Waypoint>>,
    pub mining_sessions: Fetch<Vec<MiningSession>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub vehicle_id: Option<String>,
    pub connected: bool,
    /// Set while the active vehicle stops answering status requests
    pub reconnecting: bool,
    pub vehicle_data: Option<VehicleData>,
    pub system_info: Option<SystemInfo>,
    pub logs: Vec<String>,
    pub waypoints: Vec<Waypoint>,
    pub mining_sessions: Vec<MiningSession>,
    pub selected_tab: DashboardTab,
    pub staged_waypoint: Option<Point>,
    pub last_update: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    #[serde(skip)]
    generation: u64,
}

impl DashboardState {
    /// Reset the view for a newly selected vehicle and open a new generation.
    /// Results tagged with an older generation are ignored from here on.
    pub fn begin(&mut self, vehicle_id: &str) -> u64 {
        let selected_tab = self.selected_tab;
        let generation = self.generation + 1;
        *self = Self {
            vehicle_id: Some(vehicle_id.to_string()),
            selected_tab,
            generation,
            ..Self::default()
        };
        generation
    }

    /// Disconnected view with no vehicle. Also invalidates in-flight cycles.
    pub fn clear(&mut self) {
        let selected_tab = self.selected_tab;
        let generation = self.generation + 1;
        *self = Self {
            selected_tab,
            generation,
            ..Self::default()
        };
    }

    /// Apply a poll cycle. Returns `false` when the cycle is stale.
    pub fn apply(&mut self, cycle: PollCycle, now: DateTime<Utc>) -> bool {
        if cycle.generation != self.generation {
            return false;
        }

        // Vehicle status is connection-critical: no stale data is kept
        match cycle.vehicle_data {
            Some(data) => {
                self.vehicle_data = Some(data);
                self.connected = true;
                self.reconnecting = false;
                self.consecutive_failures = 0;
                self.last_update = Some(now);
            }
            None => {
                self.vehicle_data = None;
                self.connected = false;
                self.reconnecting = true;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
        }

        self.system_info = cycle.system_info;

        // Read-mostly lists keep their last good value
        let mut missing = Vec::new();
        match cycle.logs {
            Fetch::Fetched(logs) => self.logs = logs,
            Fetch::Missing => missing.push("logs"),
            Fetch::Skipped => {}
        }
        match cycle.waypoints {
            Fetch::Fetched(waypoints) => self.waypoints = waypoints,
            Fetch::Missing => missing.push("waypoints"),
            Fetch::Skipped => {}
        }
        match cycle.mining_sessions {
            Fetch::Fetched(sessions) => self.mining_sessions = sessions,
            Fetch::Missing => missing.push("mining sessions"),
            Fetch::Skipped => {}
        }

        self.last_error = if missing.is_empty() {
            None
        } else {
            Some(format!("Could not refresh {}", missing.join(", ")))
        };

        true
    }
}
