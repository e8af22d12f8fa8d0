// Domain layer - Rover dashboard models
pub mod dashboard;
pub mod mission;
pub mod session;
pub mod telemetry;
pub mod vehicle;
