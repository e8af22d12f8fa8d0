// Application state for HTTP handlers
use crate::application::command_service::CommandService;
use crate::application::dashboard_service::DashboardService;
use crate::application::discovery_service::DiscoveryService;
use crate::application::key_value_store::KeyValueStore;
use crate::application::rover_client::RoverClient;
use crate::application::session_service::SessionService;
use crate::application::telemetry_poller::TelemetryPoller;
use crate::application::vehicle_data_store::VehicleDataStore;
use crate::application::vehicle_registry::VehicleRegistry;
use crate::infrastructure::config::{DashboardConfig, MapSettings};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    pub registry: VehicleRegistry,
    pub dashboard: DashboardService,
    pub poller: TelemetryPoller,
    pub discovery: DiscoveryService,
    pub commands: CommandService,
    pub vehicle_data: Arc<VehicleDataStore>,
    pub map: MapSettings,
}

impl AppState {
    /// Wire every service over one store and one rover client
    pub fn build(
        config: &DashboardConfig,
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn RoverClient>,
    ) -> Self {
        let sessions = SessionService::load(store.clone(), config.auth.credential_table());
        let registry = VehicleRegistry::load(store, client.clone(), config.connect.timeout());
        let poller = TelemetryPoller::new(client.clone(), config.poll.clone());
        let discovery = DiscoveryService::new(client.clone(), config.discovery.clone());
        let commands = CommandService::new(client, registry.clone(), poller.state());
        let dashboard = DashboardService::new(registry.clone(), poller.clone(), sessions.clone());

        Self {
            sessions,
            registry,
            dashboard,
            poller,
            discovery,
            commands,
            vehicle_data: Arc::new(VehicleDataStore::new()),
            map: config.map.clone(),
        }
    }
}
