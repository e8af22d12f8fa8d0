// Error types shared by the dashboard use cases
use thiserror::Error;

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Login required")]
    Unauthenticated,

    #[error("Vehicle {0} not found")]
    VehicleNotFound(String),

    #[error("No vehicle connected")]
    NoActiveVehicle,

    #[error("Could not reach {name} at {url}: {source}")]
    ConnectionFailed {
        name: String,
        url: String,
        #[source]
        source: RoverError,
    },

    #[error("{0}")]
    Remote(String),

    #[error("A discovery scan is already running")]
    ScanInProgress,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures talking to a rover backend
#[derive(Error, Debug)]
pub enum RoverError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("remote reported failure: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RoverError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RoverError::Timeout
        } else if e.is_decode() {
            RoverError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            RoverError::Status(status.as_u16())
        } else {
            RoverError::Network(e.to_string())
        }
    }
}
