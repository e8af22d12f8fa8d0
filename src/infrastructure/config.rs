use crate::domain::session::{Credential, CredentialTable};
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub poll: PollSettings,
    #[serde(default)]
    pub connect: ConnectSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub map: MapSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageSettings {
    pub dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollSettings {
    pub interval_ms: u64,
    pub request_timeout_ms: u64,
    pub max_backoff_ms: u64,
    pub log_lines: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            request_timeout_ms: 4000,
            max_backoff_ms: 15000,
            log_lines: 50,
        }
    }
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms.max(self.interval_ms))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConnectSettings {
    pub timeout_ms: u64,
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl ConnectSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Any address on the network to sweep; its /24 is scanned
    pub base_ip: Option<Ipv4Addr>,
    pub ports: Vec<u16>,
    pub timeout_ms: u64,
    pub concurrency: usize,
    /// Hosts probed when no base address is configured
    pub fallback_hosts: Vec<Ipv4Addr>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            base_ip: None,
            ports: vec![5000, 8080, 3000, 8000],
            timeout_ms: 2000,
            concurrency: 32,
            fallback_hosts: vec![
                Ipv4Addr::new(192, 168, 1, 100),
                Ipv4Addr::new(192, 168, 1, 101),
                Ipv4Addr::new(192, 168, 0, 100),
                Ipv4Addr::new(192, 168, 0, 101),
                Ipv4Addr::new(10, 0, 0, 100),
                Ipv4Addr::new(10, 0, 0, 101),
            ],
        }
    }
}

impl DiscoverySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapSettings {
    pub width: u32,
    pub height: u32,
    /// Nominal side length, in map units, of the region the rover exports
    pub region_size: u32,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            region_size: 400,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AuthSettings {
    pub users: Vec<Credential>,
}

impl AuthSettings {
    /// Configured users, or the built-in demo accounts when none are set
    pub fn credential_table(&self) -> CredentialTable {
        if self.users.is_empty() {
            CredentialTable::default()
        } else {
            CredentialTable::new(self.users.clone())
        }
    }
}

/// `ROVER_DASHBOARD__*` overrides; list settings take comma-separated values
fn environment() -> config::Environment {
    config::Environment::with_prefix("ROVER_DASHBOARD")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("discovery.ports")
        .with_list_parse_key("discovery.fallback_hosts")
}

fn build(path: &str, env: config::Environment) -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(env)
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Load `<path>.toml` (optional) overlaid with `ROVER_DASHBOARD__*` env vars
pub fn load_dashboard_config(path: &str) -> anyhow::Result<DashboardConfig> {
    build(path, environment())
}
