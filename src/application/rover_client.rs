// Client trait for the remote rover HTTP contract
use crate::application::errors::RoverError;
use crate::domain::mission::{CommandOutcome, MiningSession, NewWaypoint, Waypoint};
use crate::domain::telemetry::{SystemInfo, VehicleData};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Every call takes the rover's base URL so one client serves the whole registry.
#[async_trait]
pub trait RoverClient: Send + Sync {
    /// Liveness probe against `/api/system-status` with an explicit timeout
    async fn system_status(
        &self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<serde_json::Value, RoverError>;

    async fn vehicle_status(&self, base_url: &str) -> Result<VehicleData, RoverError>;

    async fn system_info(&self, base_url: &str) -> Result<SystemInfo, RoverError>;

    /// Most recent `lines` log lines
    async fn logs(&self, base_url: &str, lines: u32) -> Result<Vec<String>, RoverError>;

    async fn waypoints(&self, base_url: &str) -> Result<Vec<Waypoint>, RoverError>;

    /// Returns the remote confirmation message
    async fn create_waypoint(
        &self,
        base_url: &str,
        waypoint: &NewWaypoint,
    ) -> Result<String, RoverError>;

    async fn delete_waypoint(&self, base_url: &str, id: i64) -> Result<String, RoverError>;

    async fn mining_sessions(&self, base_url: &str) -> Result<Vec<MiningSession>, RoverError>;

    /// Forward a control command. A remote refusal is an `Ok` outcome with
    /// `success == false`; only transport failures are errors.
    async fn send_command(
        &self,
        base_url: &str,
        command: &str,
    ) -> Result<CommandOutcome, RoverError>;
}

/// Safe fetch: any failure (network, timeout, bad status, `success: false`)
/// becomes "no data".
pub async fn safe_fetch<T, F>(what: &str, request: F) -> Option<T>
where
    F: Future<Output = Result<T, RoverError>>,
{
    match request.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("{} unavailable: {}", what, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_safe_fetch_collapses_errors() {
        let ok = safe_fetch("value", async { Ok::<_, RoverError>(7) }).await;
        assert_eq!(ok, Some(7));

        let timeout = safe_fetch("value", async { Err::<i32, _>(RoverError::Timeout) }).await;
        assert_eq!(timeout, None);

        let rejected = safe_fetch("value", async {
            Err::<i32, _>(RoverError::Rejected("controller offline".to_string()))
        })
        .await;
        assert_eq!(rejected, None);
    }
}
