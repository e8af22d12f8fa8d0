// Durable key/value storage used for the session and vehicle registry
use crate::application::errors::DashboardResult;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const SESSION_KEY: &str = "session_user";
pub const VEHICLES_KEY: &str = "vehicles";
pub const ACTIVE_VEHICLE_KEY: &str = "active_vehicle";

/// JSON values under fixed key names. Implementations must tolerate a
/// missing key (`Ok(None)`) and removing a key that does not exist.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> DashboardResult<Option<serde_json::Value>>;

    fn set(&self, key: &str, value: serde_json::Value) -> DashboardResult<()>;

    fn remove(&self, key: &str) -> DashboardResult<()>;
}

pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> DashboardResult<Option<T>> {
    match store.get(key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> DashboardResult<()> {
    store.set(key, serde_json::to_value(value)?)
}
