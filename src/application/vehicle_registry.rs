// Vehicle registry - User-maintained list of rover endpoints
use crate::application::errors::{DashboardError, DashboardResult};
use crate::application::key_value_store::{self, ACTIVE_VEHICLE_KEY, KeyValueStore, VEHICLES_KEY};
use crate::application::rover_client::RoverClient;
use crate::domain::vehicle::{ConnectionStatus, Vehicle, VehicleKind, normalize_url};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct RegistryState {
    vehicles: Vec<Vehicle>,
    active_id: Option<String>,
}

impl RegistryState {
    fn find_mut(&mut self, id: &str) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    fn active(&self) -> Option<&Vehicle> {
        let id = self.active_id.as_ref()?;
        self.vehicles.iter().find(|v| &v.id == id)
    }
}

#[derive(Clone)]
pub struct VehicleRegistry {
    state: Arc<Mutex<RegistryState>>,
    store: Arc<dyn KeyValueStore>,
    client: Arc<dyn RoverClient>,
    connect_timeout: Duration,
}

impl VehicleRegistry {
    /// Read the persisted list and active pointer once
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn RoverClient>,
        connect_timeout: Duration,
    ) -> Self {
        let vehicles = key_value_store::load::<Vec<Vehicle>>(store.as_ref(), VEHICLES_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable vehicle list: {}", e);
                None
            })
            .unwrap_or_default();

        let active_id = key_value_store::load::<Vehicle>(store.as_ref(), ACTIVE_VEHICLE_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable active vehicle: {}", e);
                None
            })
            .map(|v| v.id)
            .filter(|id| vehicles.iter().any(|v| &v.id == id));

        tracing::info!("Loaded {} vehicles from storage", vehicles.len());

        Self {
            state: Arc::new(Mutex::new(RegistryState {
                vehicles,
                active_id,
            })),
            store,
            client,
            connect_timeout,
        }
    }

    pub async fn list(&self) -> Vec<Vehicle> {
        self.state.lock().await.vehicles.clone()
    }

    pub async fn active(&self) -> Option<Vehicle> {
        self.state.lock().await.active().cloned()
    }

    pub async fn known_urls(&self) -> HashSet<String> {
        self.state
            .lock()
            .await
            .vehicles
            .iter()
            .map(|v| v.url.clone())
            .collect()
    }

    pub async fn add(&self, name: &str, url: &str) -> DashboardResult<Vehicle> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::Validation("Vehicle name is required".to_string()));
        }
        let url = normalize_url(url)
            .ok_or_else(|| DashboardError::Validation("Vehicle URL is required".to_string()))?;

        let vehicle = Vehicle::new(name.to_string(), url, VehicleKind::Manual);

        let mut state = self.state.lock().await;
        state.vehicles.push(vehicle.clone());
        self.persist(&state)?;

        tracing::info!("Added vehicle {} at {}", vehicle.name, vehicle.url);
        Ok(vehicle)
    }

    /// Insert discovered vehicles whose URL is not registered yet. Returns the ones added.
    pub async fn add_discovered(&self, found: Vec<Vehicle>) -> DashboardResult<Vec<Vehicle>> {
        let mut state = self.state.lock().await;
        let mut known: HashSet<String> = state.vehicles.iter().map(|v| v.url.clone()).collect();

        let added: Vec<Vehicle> = found
            .into_iter()
            .filter(|v| known.insert(v.url.clone()))
            .collect();

        if !added.is_empty() {
            state.vehicles.extend(added.iter().cloned());
            self.persist(&state)?;
        }

        Ok(added)
    }

    /// Delete a vehicle. Returns `true` when it was the active one.
    pub async fn remove(&self, id: &str) -> DashboardResult<bool> {
        let mut state = self.state.lock().await;
        let index = state
            .vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| DashboardError::VehicleNotFound(id.to_string()))?;

        let removed = state.vehicles.remove(index);
        let was_active = state.active_id.as_deref() == Some(id);
        if was_active {
            state.active_id = None;
        }
        self.persist(&state)?;

        tracing::info!("Removed vehicle {}", removed.name);
        Ok(was_active)
    }

    /// Probe the vehicle and make it the single connected, active entry.
    ///
    /// On failure only this vehicle is marked disconnected; the active
    /// pointer and every other entry stay as they were.
    pub async fn connect(&self, id: &str) -> DashboardResult<Vehicle> {
        let target = {
            let mut state = self.state.lock().await;
            let vehicle = state
                .find_mut(id)
                .ok_or_else(|| DashboardError::VehicleNotFound(id.to_string()))?;
            vehicle.status = ConnectionStatus::Connecting;
            vehicle.clone()
        };

        let probe = self
            .client
            .system_status(&target.url, self.connect_timeout)
            .await;

        let mut state = self.state.lock().await;
        match probe {
            Ok(_) => {
                if state.find_mut(id).is_none() {
                    return Err(DashboardError::VehicleNotFound(id.to_string()));
                }

                let now = Utc::now();
                for vehicle in state.vehicles.iter_mut() {
                    if vehicle.id == id {
                        vehicle.status = ConnectionStatus::Connected;
                        vehicle.last_seen = Some(now);
                    } else {
                        vehicle.status = ConnectionStatus::Disconnected;
                    }
                }
                state.active_id = Some(id.to_string());
                self.persist(&state)?;

                tracing::info!("Connected to {} at {}", target.name, target.url);
                state
                    .active()
                    .cloned()
                    .ok_or_else(|| DashboardError::VehicleNotFound(id.to_string()))
            }
            Err(e) => {
                // The vehicle may have been removed while the probe was in flight
                if let Some(vehicle) = state.find_mut(id) {
                    vehicle.status = ConnectionStatus::Disconnected;
                }
                self.persist(&state)?;

                tracing::warn!("Failed to connect to {} at {}: {}", target.name, target.url, e);
                Err(DashboardError::ConnectionFailed {
                    name: target.name,
                    url: target.url,
                    source: e,
                })
            }
        }
    }

    /// Mark the active vehicle disconnected and clear the pointer
    pub async fn disconnect(&self) -> DashboardResult<Option<Vehicle>> {
        let mut state = self.state.lock().await;
        let Some(id) = state.active_id.take() else {
            return Ok(None);
        };

        let vehicle = state.find_mut(&id).map(|v| {
            v.status = ConnectionStatus::Disconnected;
            v.clone()
        });
        self.persist(&state)?;

        if let Some(v) = &vehicle {
            tracing::info!("Disconnected from {}", v.name);
        }
        Ok(vehicle)
    }

    fn persist(&self, state: &RegistryState) -> DashboardResult<()> {
        key_value_store::save(self.store.as_ref(), VEHICLES_KEY, &state.vehicles)?;
        match state.active() {
            Some(active) => key_value_store::save(self.store.as_ref(), ACTIVE_VEHICLE_KEY, active),
            None => self.store.remove(ACTIVE_VEHICLE_KEY),
        }
    }
}
