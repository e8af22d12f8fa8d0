// Telemetry poller - Periodic fetch batch against the active vehicle
use crate::application::errors::RoverError;
use crate::application::rover_client::{RoverClient, safe_fetch};
use crate::domain::dashboard::{DashboardState, DashboardTab, Fetch, PollCycle};
use crate::domain::vehicle::Vehicle;
use crate::infrastructure::config::PollSettings;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Delay before the next cycle after `failures` consecutive status failures
pub fn backoff_delay(interval: Duration, max: Duration, failures: u32) -> Duration {
    if failures == 0 {
        return interval;
    }
    let factor = 1u32 << failures.min(16);
    interval.saturating_mul(factor).min(max)
}

async fn fetch_if<T, F>(selected: bool, what: &str, request: F) -> Fetch<T>
where
    F: Future<Output = Result<T, RoverError>>,
{
    if selected {
        safe_fetch(what, request).await.into()
    } else {
        Fetch::Skipped
    }
}

#[derive(Clone)]
pub struct TelemetryPoller {
    client: Arc<dyn RoverClient>,
    settings: PollSettings,
    state: Arc<RwLock<DashboardState>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TelemetryPoller {
    pub fn new(client: Arc<dyn RoverClient>, settings: PollSettings) -> Self {
        Self {
            client,
            settings,
            state: Arc::new(RwLock::new(DashboardState::default())),
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Shared view state, also written by the command service
    pub fn state(&self) -> Arc<RwLock<DashboardState>> {
        self.state.clone()
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn select_tab(&self, tab: DashboardTab) {
        self.state.write().await.selected_tab = tab;
    }

    /// Start polling `vehicle`, replacing any running loop
    pub async fn start(&self, vehicle: &Vehicle) {
        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let generation = self.state.write().await.begin(&vehicle.id);
        tracing::info!(
            "Polling {} every {:?} (generation {})",
            vehicle.url,
            self.settings.interval(),
            generation
        );

        let poller = self.clone();
        let url = vehicle.url.clone();
        *task = Some(tokio::spawn(async move {
            poller.run(url, generation).await;
        }));
    }

    /// Stop polling and show the disconnected view
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
            tracing::info!("Telemetry polling stopped");
        }
        self.state.write().await.clear();
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn run(self, url: String, generation: u64) {
        // Cycles start on a fixed period while healthy; slow cycles push the next tick back
        let mut ticker = tokio::time::interval(self.settings.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut failures = 0u32;
        loop {
            ticker.tick().await;
            let status_ok = self.poll_once(&url, generation).await;
            failures = if status_ok { 0 } else { failures.saturating_add(1) };
            if failures == 0 {
                continue;
            }

            let delay = backoff_delay(self.settings.interval(), self.settings.max_backoff(), failures);
            tracing::debug!("Vehicle status missing {} times, retrying in {:?}", failures, delay);
            tokio::time::sleep(delay).await;
            ticker.reset_immediately();
        }
    }

    /// One poll cycle. Returns whether the vehicle status came back.
    pub async fn poll_once(&self, url: &str, generation: u64) -> bool {
        let tab = self.state.read().await.selected_tab;
        let client = self.client.as_ref();

        // Independent requests: one failing never cancels the others
        let (vehicle_data, system_info, logs, waypoints, mining_sessions) = tokio::join!(
            safe_fetch("vehicle status", client.vehicle_status(url)),
            safe_fetch("system info", client.system_info(url)),
            fetch_if(
                tab == DashboardTab::Logs,
                "logs",
                client.logs(url, self.settings.log_lines)
            ),
            fetch_if(
                tab == DashboardTab::Waypoints,
                "waypoints",
                client.waypoints(url)
            ),
            fetch_if(
                tab == DashboardTab::Mining,
                "mining sessions",
                client.mining_sessions(url)
            )
        );

        let status_ok = vehicle_data.is_some();
        let cycle = PollCycle {
            generation,
            vehicle_data,
            system_info,
            logs,
            waypoints,
            mining_sessions,
        };

        let applied = self.state.write().await.apply(cycle, Utc::now());
        if !applied {
            tracing::debug!("Dropped stale poll results for {} (generation {})", url, generation);
        } else if !status_ok {
            tracing::debug!("Lost vehicle status from {}", url);
        }
        status_ok
    }
}
