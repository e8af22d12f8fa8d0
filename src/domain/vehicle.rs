// Vehicle domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Connecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Manual,
    Discovered,
}

/// A named rover endpoint kept in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: ConnectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: VehicleKind,
}

impl Vehicle {
    pub fn new(name: String, url: String, kind: VehicleKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            url,
            status: ConnectionStatus::Disconnected,
            last_seen: None,
            kind,
        }
    }
}

/// Normalize a user-entered address into a base URL.
///
/// Bare `host:port` gets an `http://` prefix and trailing slashes are dropped.
/// Returns `None` when nothing is left to address.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("http://") {
        ("http://", rest)
    } else if let Some(rest) = trimmed.strip_prefix("https://") {
        ("https://", rest)
    } else {
        ("http://", trimmed)
    };

    let host = rest.trim_end_matches('/');
    if host.is_empty() {
        return None;
    }

    Some(format!("{}{}", scheme, host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("192.168.1.50:5000").as_deref(),
            Some("http://192.168.1.50:5000")
        );
        assert_eq!(
            normalize_url("  https://rover.local/ ").as_deref(),
            Some("https://rover.local")
        );
        assert_eq!(
            normalize_url("http://10.0.0.2:8080").as_deref(),
            Some("http://10.0.0.2:8080")
        );
        assert_eq!(normalize_url(""), None);
        assert_eq!(normalize_url("   "), None);
        assert_eq!(normalize_url("http://"), None);
    }

    #[test]
    fn test_vehicle_serializes_like_the_stored_record() {
        let vehicle = Vehicle::new(
            "Rover 1".to_string(),
            "http://10.0.0.2:5000".to_string(),
            VehicleKind::Manual,
        );
        let json = serde_json::to_value(&vehicle).unwrap();

        assert_eq!(json["status"], "disconnected");
        assert_eq!(json["type"], "manual");
        assert!(json.get("lastSeen").is_none());
    }
}
