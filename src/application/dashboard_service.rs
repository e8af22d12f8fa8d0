// Dashboard service - Keeps the registry's active vehicle and the poller in step
use crate::application::errors::DashboardResult;
use crate::application::session_service::SessionService;
use crate::application::telemetry_poller::TelemetryPoller;
use crate::application::vehicle_registry::VehicleRegistry;
use crate::domain::vehicle::Vehicle;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DashboardService {
    registry: VehicleRegistry,
    poller: TelemetryPoller,
    sessions: SessionService,
    // Held across a registry change and the matching poller restart
    transition: Arc<Mutex<()>>,
}

impl DashboardService {
    pub fn new(registry: VehicleRegistry, poller: TelemetryPoller, sessions: SessionService) -> Self {
        Self {
            registry,
            poller,
            sessions,
            transition: Arc::new(Mutex::new(())),
        }
    }

    /// Connect and, on success, point the poller at the new vehicle
    pub async fn connect(&self, id: &str) -> DashboardResult<Vehicle> {
        let _transition = self.transition.lock().await;
        let vehicle = self.registry.connect(id).await?;
        self.poller.start(&vehicle).await;
        Ok(vehicle)
    }

    pub async fn disconnect(&self) -> DashboardResult<Option<Vehicle>> {
        let _transition = self.transition.lock().await;
        let vehicle = self.registry.disconnect().await?;
        self.poller.stop().await;
        Ok(vehicle)
    }

    pub async fn remove(&self, id: &str) -> DashboardResult<()> {
        let _transition = self.transition.lock().await;
        if self.registry.remove(id).await? {
            self.poller.stop().await;
        }
        Ok(())
    }

    pub async fn logout(&self) -> DashboardResult<()> {
        let _transition = self.transition.lock().await;
        self.sessions.logout().await?;
        self.registry.disconnect().await?;
        self.poller.stop().await;
        Ok(())
    }

    /// Pick up polling for a vehicle left active by a previous run
    pub async fn resume(&self) {
        if self.sessions.current().await.is_none() {
            return;
        }
        let _transition = self.transition.lock().await;
        if let Some(vehicle) = self.registry.active().await {
            tracing::info!("Resuming telemetry for {}", vehicle.name);
            self.poller.start(&vehicle).await;
        }
    }
}
