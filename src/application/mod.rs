// Application layer - Use cases and the seams they depend on
pub mod command_service;
pub mod dashboard_service;
pub mod discovery_service;
pub mod errors;
pub mod key_value_store;
pub mod map_renderer;
pub mod rover_client;
pub mod session_service;
pub mod telemetry_poller;
pub mod vehicle_data_store;
pub mod vehicle_registry;
