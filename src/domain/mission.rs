// Waypoint and mining session records owned by the rover backend
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: i64,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Body for `POST /api/waypoints`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWaypoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type", default = "default_waypoint_kind")]
    pub kind: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_waypoint_kind() -> String {
    "mining".to_string()
}

fn default_priority() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningSession {
    pub id: i64,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub waypoints_completed: u32,
    #[serde(default)]
    pub total_distance: f64,
    #[serde(default)]
    pub minerals_collected: u32,
    #[serde(default)]
    pub status: String,
}

/// Remote verdict on a forwarded command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub message: String,
}

/// Commands the rover backend understands. Anything else is still forwarded.
pub const KNOWN_COMMANDS: [&str; 6] = [
    "start",
    "stop",
    "emergency_stop",
    "start_mining",
    "stop_mining",
    "return_to_dock",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_waypoint_defaults() {
        let waypoint: NewWaypoint =
            serde_json::from_value(json!({"name": "Ore A", "x": 10, "y": -4.5})).unwrap();

        assert_eq!(waypoint.kind, "mining");
        assert_eq!(waypoint.priority, 1);
        assert_eq!(serde_json::to_value(&waypoint).unwrap()["type"], "mining");
    }
}
