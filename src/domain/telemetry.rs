// Telemetry domain models, as published by the rover backend
use serde::{Deserialize, Serialize};

/// A point in the rover's map coordinate space, serialized as `[x, y]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }
}

/// Full vehicle status snapshot from `/api/vehicle-status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleData {
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub heading: f64,
    #[serde(default)]
    pub sensor_data: SensorData,
    #[serde(default)]
    pub action_data: ActionData,
    #[serde(default)]
    pub map_data: MapData,
    #[serde(default)]
    pub system_status: SystemStatus,
    #[serde(default)]
    pub connectivity: Option<Connectivity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// Ultrasonic distances in cm, ordered front, left, right, rear
    #[serde(default)]
    pub ultrasonic: Vec<f64>,
    #[serde(default)]
    pub camera_available: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionData {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub action_confidence: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub obstacle_detected: bool,
    #[serde(default)]
    pub obstacle_confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub robot_position: Point,
    #[serde(default)]
    pub robot_heading: f64,
    #[serde(default)]
    pub path_history: Vec<Point>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub map_region: Vec<Vec<MapCell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Point,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// One cell of the map region grid: a colour triple or a grey intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapCell {
    Rgb([u8; 3]),
    Intensity(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub emergency_stop: bool,
    #[serde(default)]
    pub mining_active: bool,
    #[serde(default)]
    pub camera_available: bool,
    #[serde(default)]
    pub waypoints_completed: u32,
    #[serde(default)]
    pub minerals_collected: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connectivity {
    #[serde(default)]
    pub bluetooth_clients: u32,
    #[serde(default)]
    pub websocket_clients: u32,
    #[serde(default)]
    pub wifi_clients: u32,
    #[serde(default)]
    pub wifi_discoverable: bool,
    #[serde(default)]
    pub server_ip: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
}

/// Host metrics snapshot from `/api/system-info`.
///
/// Rovers publish either nested `cpu`/`memory`/`disk` sections or the flat
/// `cpu_percent`/`memory_percent`/`disk_percent`/`temperature` form; both
/// land in the nested shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SystemInfoWire")]
pub struct SystemInfo {
    pub platform: String,
    pub hostname: String,
    pub cpu: CpuInfo,
    pub memory: UsageInfo,
    pub disk: UsageInfo,
    pub uptime: f64,
    pub vehicle_running: bool,
    pub bluetooth_clients: u32,
    pub timestamp: f64,
}

#[derive(Deserialize)]
struct SystemInfoWire {
    #[serde(default)]
    platform: String,
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    cpu: Option<CpuInfo>,
    #[serde(default)]
    memory: Option<UsageInfo>,
    #[serde(default)]
    disk: Option<UsageInfo>,
    #[serde(default)]
    cpu_percent: Option<f64>,
    #[serde(default)]
    memory_percent: Option<f64>,
    #[serde(default)]
    disk_percent: Option<f64>,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    uptime: f64,
    #[serde(default)]
    vehicle_running: bool,
    #[serde(default)]
    bluetooth_clients: u32,
    #[serde(default)]
    timestamp: f64,
}

impl From<SystemInfoWire> for SystemInfo {
    fn from(wire: SystemInfoWire) -> Self {
        let mut cpu = wire.cpu.unwrap_or_default();
        let mut memory = wire.memory.unwrap_or_default();
        let mut disk = wire.disk.unwrap_or_default();
        if let Some(percent) = wire.cpu_percent {
            cpu.percent = percent;
        }
        if let Some(percent) = wire.memory_percent {
            memory.percent = percent;
        }
        if let Some(percent) = wire.disk_percent {
            disk.percent = percent;
        }
        cpu.temperature = cpu.temperature.or(wire.temperature);

        Self {
            platform: wire.platform,
            hostname: wire.hostname,
            cpu,
            memory,
            disk,
            uptime: wire.uptime,
            vehicle_running: wire.vehicle_running,
            bluetooth_clients: wire.bluetooth_clients,
            timestamp: wire.timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub available: Option<u64>,
    #[serde(default)]
    pub free: Option<u64>,
    #[serde(default)]
    pub percent: f64,
}

/// Body of `/api/logs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogLines {
    #[serde(default)]
    pub logs: Vec<String>,
}
