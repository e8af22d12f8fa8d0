// reqwest implementation of the rover HTTP contract
use crate::application::errors::RoverError;
use crate::application::rover_client::RoverClient;
use crate::domain::mission::{CommandOutcome, MiningSession, NewWaypoint, Waypoint};
use crate::domain::telemetry::{LogLines, SystemInfo, VehicleData};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpRoverClient {
    client: reqwest::Client,
    request_timeout: Duration,
}

/// `{success, data?, message?, error?}` wrapper used by every rover route
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn failure_reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "success: false".to_string())
    }
}

/// Confirmation payload of `POST /api/waypoints`
#[derive(Debug, Deserialize)]
struct WaypointCreated {
    #[serde(default)]
    message: Option<String>,
}

impl HttpRoverClient {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            request_timeout,
        })
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, RoverError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .timeout(timeout)
            .send()
            .await?;

        Self::unwrap_data(response).await
    }

    async fn unwrap_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RoverError> {
        let envelope = Self::read_envelope::<T>(response).await?;
        envelope
            .data
            .ok_or_else(|| RoverError::Decode("response carried no data".to_string()))
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Envelope<T>, RoverError> {
        let status = response.status();
        if !status.is_success() {
            return Err(RoverError::Status(status.as_u16()));
        }

        let envelope = response.json::<Envelope<T>>().await?;
        if !envelope.success {
            return Err(RoverError::Rejected(envelope.failure_reason()));
        }

        Ok(envelope)
    }
}

#[async_trait]
impl RoverClient for HttpRoverClient {
    async fn system_status(
        &self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<serde_json::Value, RoverError> {
        let url = format!("{}/api/system-status", base_url);
        self.get_data(&url, timeout).await
    }

    async fn vehicle_status(&self, base_url: &str) -> Result<VehicleData, RoverError> {
        let url = format!("{}/api/vehicle-status", base_url);
        self.get_data(&url, self.request_timeout).await
    }

    async fn system_info(&self, base_url: &str) -> Result<SystemInfo, RoverError> {
        let url = format!("{}/api/system-info", base_url);
        self.get_data(&url, self.request_timeout).await
    }

    async fn logs(&self, base_url: &str, lines: u32) -> Result<Vec<String>, RoverError> {
        let url = format!("{}/api/logs", base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("lines", lines)])
            .timeout(self.request_timeout)
            .send()
            .await?;

        let logs: LogLines = Self::unwrap_data(response).await?;
        Ok(logs.logs)
    }

    async fn waypoints(&self, base_url: &str) -> Result<Vec<Waypoint>, RoverError> {
        let url = format!("{}/api/waypoints", base_url);
        self.get_data(&url, self.request_timeout).await
    }

    async fn create_waypoint(
        &self,
        base_url: &str,
        waypoint: &NewWaypoint,
    ) -> Result<String, RoverError> {
        let url = format!("{}/api/waypoints", base_url);
        let response = self
            .client
            .post(&url)
            .json(waypoint)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let envelope = Self::read_envelope::<WaypointCreated>(response).await?;
        Ok(envelope
            .data
            .and_then(|d| d.message)
            .or(envelope.message)
            .unwrap_or_else(|| "Waypoint added".to_string()))
    }

    async fn delete_waypoint(&self, base_url: &str, id: i64) -> Result<String, RoverError> {
        let url = format!("{}/api/waypoints/{}", base_url, id);
        let response = self
            .client
            .delete(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let envelope = Self::read_envelope::<serde_json::Value>(response).await?;
        Ok(envelope
            .message
            .unwrap_or_else(|| "Waypoint deleted".to_string()))
    }

    async fn mining_sessions(&self, base_url: &str) -> Result<Vec<MiningSession>, RoverError> {
        let url = format!("{}/api/mining-sessions", base_url);
        self.get_data(&url, self.request_timeout).await
    }

    async fn send_command(
        &self,
        base_url: &str,
        command: &str,
    ) -> Result<CommandOutcome, RoverError> {
        let url = format!("{}/api/vehicle-control", base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "command": command }))
            .timeout(self.request_timeout)
            .send()
            .await?;

        // The rover answers refusals with a JSON body even on error statuses
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<Envelope<serde_json::Value>>(&body) {
            Ok(envelope) if envelope.success => Ok(CommandOutcome {
                success: true,
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("Command '{}' accepted", command)),
            }),
            Ok(envelope) => Ok(CommandOutcome {
                success: false,
                message: envelope.failure_reason(),
            }),
            Err(_) if !status.is_success() => Err(RoverError::Status(status.as_u16())),
            Err(e) => Err(RoverError::Decode(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    fn mock_rover() -> Router {
        Router::new()
            .route(
                "/api/system-status",
                get(|| async { Json(json!({"success": true, "data": {"server_running": true}})) }),
            )
            .route(
                "/api/vehicle-status",
                get(|| async {
                    Json(json!({"success": false, "error": "Vehicle controller not initialized"}))
                }),
            )
            .route(
                "/api/system-info",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .route(
                "/api/logs",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    let lines: usize = q.get("lines").and_then(|l| l.parse().ok()).unwrap_or(0);
                    let logs: Vec<String> = (0..lines).map(|i| format!("line {}", i)).collect();
                    Json(json!({"success": true, "data": {"logs": logs}}))
                }),
            )
            .route(
                "/api/waypoints",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "success": true,
                        "data": {"id": 3, "message": format!("Added {}", body["name"].as_str().unwrap_or(""))}
                    }))
                }),
            )
            .route(
                "/api/waypoints/:id",
                delete(|Path(id): Path<i64>| async move {
                    if id == 1 {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"success": false, "error": "Cannot delete docking station"})),
                        )
                    } else {
                        (
                            StatusCode::OK,
                            Json(json!({"success": true, "message": "Waypoint deleted successfully"})),
                        )
                    }
                }),
            )
            .route(
                "/api/vehicle-control",
                post(|Json(body): Json<Value>| async move {
                    match body["command"].as_str() {
                        Some("start") => (
                            StatusCode::OK,
                            Json(json!({"success": true, "message": "Vehicle started"})),
                        ),
                        _ => (
                            StatusCode::OK,
                            Json(json!({"success": false, "error": "Unknown command"})),
                        ),
                    }
                }),
            )
    }

    fn client() -> HttpRoverClient {
        HttpRoverClient::new(Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_envelope_handling() {
        let base = serve(mock_rover()).await;
        let client = client();

        let status = client
            .system_status(&base, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(status["server_running"], true);

        assert!(matches!(
            client.vehicle_status(&base).await,
            Err(RoverError::Rejected(reason)) if reason == "Vehicle controller not initialized"
        ));
        assert!(matches!(
            client.system_info(&base).await,
            Err(RoverError::Status(500))
        ));
        // Route missing on the rover
        assert!(matches!(
            client.mining_sessions(&base).await,
            Err(RoverError::Status(404))
        ));
    }

    #[tokio::test]
    async fn test_logs_pass_line_count() {
        let base = serve(mock_rover()).await;

        let logs = client().logs(&base, 3).await.unwrap();
        assert_eq!(logs, vec!["line 0", "line 1", "line 2"]);
    }

    #[tokio::test]
    async fn test_waypoint_routes() {
        let base = serve(mock_rover()).await;
        let client = client();
        let waypoint = NewWaypoint {
            name: "Ore A".to_string(),
            x: 10.0,
            y: 12.0,
            kind: "mining".to_string(),
            priority: 2,
        };

        assert_eq!(client.create_waypoint(&base, &waypoint).await.unwrap(), "Added Ore A");
        assert_eq!(
            client.delete_waypoint(&base, 7).await.unwrap(),
            "Waypoint deleted successfully"
        );
        assert!(matches!(
            client.delete_waypoint(&base, 1).await,
            Err(RoverError::Status(400))
        ));
    }

    #[tokio::test]
    async fn test_commands_report_remote_verdict() {
        let base = serve(mock_rover()).await;
        let client = client();

        let accepted = client.send_command(&base, "start").await.unwrap();
        assert!(accepted.success);
        assert_eq!(accepted.message, "Vehicle started");

        let refused = client.send_command(&base, "dance").await.unwrap();
        assert!(!refused.success);
        assert_eq!(refused.message, "Unknown command");
    }

    #[tokio::test]
    async fn test_unreachable_rover_is_an_error() {
        // Nothing listens on port 9 of localhost
        let result = client()
            .system_status("http://127.0.0.1:9", Duration::from_millis(500))
            .await;
        assert!(matches!(
            result,
            Err(RoverError::Network(_)) | Err(RoverError::Timeout)
        ));
    }
}
