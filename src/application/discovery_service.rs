// Discovery service - Sweeps an address/port space for reachable rovers
use crate::application::errors::{DashboardError, DashboardResult};
use crate::application::rover_client::RoverClient;
use crate::domain::vehicle::{Vehicle, VehicleKind};
use crate::infrastructure::config::DiscoverySettings;
use futures::StreamExt;
use serde::Serialize;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    pub running: bool,
    pub attempted: usize,
    pub total: usize,
    pub percent: u8,
    pub found: usize,
}

impl ScanProgress {
    fn percent_of(attempted: usize, total: usize) -> u8 {
        if total == 0 {
            100
        } else {
            ((attempted * 100) / total) as u8
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl Candidate {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.ip, self.port)
    }
}

#[derive(Clone)]
pub struct DiscoveryService {
    client: Arc<dyn RoverClient>,
    settings: DiscoverySettings,
    progress: Arc<watch::Sender<ScanProgress>>,
    scanning: Arc<AtomicBool>,
}

/// Exclusive right to run one sweep over `candidates`.
///
/// Dropping it, swept or not, clears the scanning flag and marks the
/// published progress as finished.
pub struct ScanClaim {
    candidates: Vec<Candidate>,
    scanning: Arc<AtomicBool>,
    progress: Arc<watch::Sender<ScanProgress>>,
}

impl ScanClaim {
    pub fn total(&self) -> usize {
        self.candidates.len()
    }
}

impl Drop for ScanClaim {
    fn drop(&mut self) {
        self.progress.send_if_modified(|p| std::mem::replace(&mut p.running, false));
        self.scanning.store(false, Ordering::SeqCst);
    }
}

impl DiscoveryService {
    pub fn new(client: Arc<dyn RoverClient>, settings: DiscoverySettings) -> Self {
        let (progress, _) = watch::channel(ScanProgress::default());
        Self {
            client,
            settings,
            progress: Arc::new(progress),
            scanning: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn progress(&self) -> ScanProgress {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanProgress> {
        self.progress.subscribe()
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Hosts to sweep: the /24 around `base_ip`, or the fallback list
    pub fn candidate_hosts(&self) -> Vec<Ipv4Addr> {
        match self.settings.base_ip {
            Some(base) => {
                let [a, b, c, _] = base.octets();
                (1..=254).map(|d| Ipv4Addr::new(a, b, c, d)).collect()
            }
            None => self.settings.fallback_hosts.clone(),
        }
    }

    /// Every (host, port) pair, IP first then port
    pub fn candidates(&self) -> Vec<Candidate> {
        self.candidate_hosts()
            .into_iter()
            .flat_map(|ip| {
                self.settings
                    .ports
                    .iter()
                    .map(move |&port| Candidate { ip, port })
            })
            .collect()
    }

    /// Sweep the configured space, skipping URLs in `known`
    pub async fn scan(&self, known: &HashSet<String>) -> DashboardResult<Vec<Vehicle>> {
        let claim = self.claim(self.candidates())?;
        Ok(self.sweep(claim, known).await)
    }

    /// Take the single scan slot and publish `running` with the candidate
    /// count before any request is sent.
    pub fn claim(&self, candidates: Vec<Candidate>) -> DashboardResult<ScanClaim> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DashboardError::ScanInProgress);
        }

        let total = candidates.len();
        self.progress.send_replace(ScanProgress {
            running: true,
            total,
            percent: ScanProgress::percent_of(0, total),
            ..ScanProgress::default()
        });

        Ok(ScanClaim {
            candidates,
            scanning: self.scanning.clone(),
            progress: self.progress.clone(),
        })
    }

    /// Claim the configured candidate space
    pub fn claim_all(&self) -> DashboardResult<ScanClaim> {
        self.claim(self.candidates())
    }

    /// Probe each claimed candidate's `/api/system-status`. Any failure means "absent".
    pub async fn sweep(&self, mut claim: ScanClaim, known: &HashSet<String>) -> Vec<Vehicle> {
        let total = claim.total();
        let candidates = std::mem::take(&mut claim.candidates);
        tracing::info!("Starting discovery scan over {} candidates", total);

        let timeout = self.settings.timeout();
        let concurrency = self.settings.concurrency.max(1);
        let client = self.client.clone();

        // `buffered` keeps results in enumeration order
        let mut probes = futures::stream::iter(candidates)
            .map(|candidate| {
                let client = client.clone();
                async move {
                    let url = candidate.url();
                    let reachable = client.system_status(&url, timeout).await.is_ok();
                    (candidate, reachable)
                }
            })
            .buffered(concurrency);

        let mut found = Vec::new();
        let mut attempted = 0;
        while let Some((candidate, reachable)) = probes.next().await {
            attempted += 1;
            let url = candidate.url();
            if reachable && !known.contains(&url) {
                tracing::info!("Discovered rover at {}", url);
                found.push(Vehicle::new(
                    format!("Rover {}:{}", candidate.ip, candidate.port),
                    url,
                    VehicleKind::Discovered,
                ));
            }

            self.progress.send_modify(|p| {
                p.attempted = attempted;
                p.percent = ScanProgress::percent_of(attempted, total);
                p.found = found.len();
            });
        }

        drop(claim);
        tracing::info!(
            "Discovery scan finished: {} new of {} probed",
            found.len(),
            attempted
        );
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeRover;

    fn settings(base_ip: Option<Ipv4Addr>, ports: Vec<u16>) -> DiscoverySettings {
        DiscoverySettings {
            base_ip,
            ports,
            fallback_hosts: vec![Ipv4Addr::new(192, 168, 1, 100), Ipv4Addr::new(10, 0, 0, 100)],
            ..DiscoverySettings::default()
        }
    }

    #[test]
    fn test_candidates_enumerate_ip_then_port() {
        let service = DiscoveryService::new(
            Arc::new(FakeRover::default()),
            settings(Some(Ipv4Addr::new(172, 16, 4, 77)), vec![5000, 8080]),
        );

        let candidates = service.candidates();
        assert_eq!(candidates.len(), 254 * 2);
        assert_eq!(candidates[0].url(), "http://172.16.4.1:5000");
        assert_eq!(candidates[1].url(), "http://172.16.4.1:8080");
        assert_eq!(candidates[2].url(), "http://172.16.4.2:5000");
        assert_eq!(candidates.last().unwrap().url(), "http://172.16.4.254:8080");
    }

    #[test]
    fn test_fallback_hosts_without_base() {
        let service = DiscoveryService::new(
            Arc::new(FakeRover::default()),
            settings(None, vec![5000]),
        );

        let urls: Vec<String> = service.candidates().iter().map(|c| c.url()).collect();
        assert_eq!(urls, vec!["http://192.168.1.100:5000", "http://10.0.0.100:5000"]);
    }

    #[tokio::test]
    async fn test_scan_finds_reachable_and_skips_known() {
        let rover = Arc::new(FakeRover::with_reachable(&[
            "http://10.9.8.3:5000",
            "http://10.9.8.7:8080",
            "http://10.9.8.9:5000",
        ]));
        let service = DiscoveryService::new(
            rover.clone(),
            settings(Some(Ipv4Addr::new(10, 9, 8, 1)), vec![5000, 8080]),
        );
        let known: HashSet<String> = ["http://10.9.8.9:5000".to_string()].into_iter().collect();

        let found = service.scan(&known).await.unwrap();

        let urls: Vec<&str> = found.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(urls, vec!["http://10.9.8.3:5000", "http://10.9.8.7:8080"]);
        assert_eq!(found[0].name, "Rover 10.9.8.3:5000");
        assert!(found.iter().all(|v| v.kind == VehicleKind::Discovered));

        let progress = service.progress();
        assert!(!progress.running);
        assert_eq!(progress.attempted, 508);
        assert_eq!(progress.total, 508);
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.found, 2);
        assert_eq!(rover.state.lock().unwrap().probes.len(), 508);
        assert!(!service.is_scanning());
    }

    #[tokio::test]
    async fn test_concurrent_scan_is_rejected() {
        let service = DiscoveryService::new(
            Arc::new(FakeRover::default()),
            settings(None, vec![5000]),
        );
        let claim = service.claim_all().unwrap();

        assert!(matches!(service.claim_all(), Err(DashboardError::ScanInProgress)));
        assert!(matches!(
            service.scan(&HashSet::new()).await,
            Err(DashboardError::ScanInProgress)
        ));

        drop(claim);
        assert!(!service.is_scanning());
        assert!(service.claim_all().is_ok());
    }

    #[test]
    fn test_claim_publishes_running_before_any_request() {
        let rover = Arc::new(FakeRover::default());
        let service = DiscoveryService::new(rover.clone(), settings(None, vec![5000, 8080]));

        let claim = service.claim_all().unwrap();

        assert_eq!(claim.total(), 4);
        let progress = service.progress();
        assert!(progress.running);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.attempted, 0);
        assert!(rover.state.lock().unwrap().probes.is_empty());

        // An abandoned claim still reports the scan as over
        drop(claim);
        assert!(!service.progress().running);
        assert!(!service.is_scanning());
    }
}
