use crate::constants::{
    DEFAULT_CREDENTIAL_STATUSES, DEFAULT_PORTS, DEFAULT_ROUTE_STATUSES,
};
use crate::errors::CamscoutError;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "camscout")]
#[command(version)]
#[command(about = "camscout - RTSP camera scanner and route/credential auditor", long_about = None)]
#[command(after_help = "Only scan devices you are authorized to audit.")]
pub struct Cli {
    /// Hosts, IPs, CIDR blocks or files listing them
    #[arg(short, long, value_name = "TARGET", required = true, num_args = 1.., value_delimiter = ',')]
    pub targets: Vec<String>,

    /// Ports or port ranges to probe
    #[arg(short, long, value_name = "PORTS", num_args = 1.., value_delimiter = ',', default_values_t = DEFAULT_PORTS.iter().map(u16::to_string).collect::<Vec<_>>())]
    pub ports: Vec<String>,

    /// Credential dictionary (JSON)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub custom_credentials: Option<PathBuf>,

    /// Route dictionary (one route per line)
    #[arg(short = 'r', long, value_name = "FILE")]
    pub custom_routes: Option<PathBuf>,

    /// Timeout of every network operation, in milliseconds
    #[arg(short = 'T', long, default_value = "2000")]
    pub timeout: u64,

    /// Delay between two attack attempts, in milliseconds
    #[arg(short = 'I', long, default_value = "0")]
    pub attack_interval: u64,

    /// Maximum number of concurrent port probes
    #[arg(short = 'j', long, default_value = "256")]
    pub jobs: usize,

    /// Write the results as JSON to this file
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(short, long)]
    pub debug: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration settings for scanning and attack operations.
///
/// Built once (from defaults or the command line), checked with
/// [`ScanConfig::validate`] when the engine is created, then shared
/// read-only behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Hosts, IP addresses or CIDR blocks to scan
    pub targets: Vec<String>,

    /// Candidate ports, as given by the user ("554", "8000-8010")
    pub ports: Vec<String>,

    /// Log every attempt
    pub debug: bool,

    /// Log phase progress
    pub verbose: bool,

    /// Custom credential dictionary (JSON with `usernames` and `passwords`)
    pub credentials_path: Option<PathBuf>,

    /// Custom route dictionary (one route per line)
    pub routes_path: Option<PathBuf>,

    /// Delay in milliseconds between two attack attempts
    pub attack_interval_ms: u64,

    /// Timeout in milliseconds for every connect, read and write
    pub timeout_ms: u64,

    /// Maximum number of concurrent port probes
    pub max_concurrent_scans: usize,

    /// DESCRIBE statuses meaning "this route exists"
    pub route_accept_statuses: Vec<u16>,

    /// DESCRIBE statuses meaning "these credentials were accepted"
    pub credential_accept_statuses: Vec<u16>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            ports: DEFAULT_PORTS.iter().map(|p| p.to_string()).collect(),
            debug: false,
            verbose: false,
            credentials_path: None,
            routes_path: None,
            attack_interval_ms: 0,
            timeout_ms: 2000,
            max_concurrent_scans: 256,
            route_accept_statuses: DEFAULT_ROUTE_STATUSES.to_vec(),
            credential_accept_statuses: DEFAULT_CREDENTIAL_STATUSES.to_vec(),
        }
    }
}

impl ScanConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            targets: cli.targets.clone(),
            ports: cli.ports.clone(),
            debug: cli.debug,
            verbose: cli.verbose,
            credentials_path: cli.custom_credentials.clone(),
            routes_path: cli.custom_routes.clone(),
            attack_interval_ms: cli.attack_interval,
            timeout_ms: cli.timeout,
            max_concurrent_scans: cli.jobs,
            ..Self::default()
        }
    }

    /// Check the configuration once before any scan starts
    pub fn validate(&self) -> Result<(), CamscoutError> {
        if self.timeout_ms == 0 {
            return Err(CamscoutError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrent_scans == 0 {
            return Err(CamscoutError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.route_accept_statuses.is_empty() || self.credential_accept_statuses.is_empty() {
            return Err(CamscoutError::InvalidConfig(
                "status classification tables cannot be empty".to_string(),
            ));
        }
        for path in [&self.credentials_path, &self.routes_path].into_iter().flatten() {
            if !path.is_file() {
                return Err(CamscoutError::InvalidConfig(format!(
                    "dictionary {} does not exist",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn attack_interval(&self) -> Duration {
        Duration::from_millis(self.attack_interval_ms)
    }

    pub fn is_route_accepted(&self, status: u16) -> bool {
        self.route_accept_statuses.contains(&status)
    }

    pub fn are_credentials_accepted(&self, status: u16) -> bool {
        self.credential_accept_statuses.contains(&status)
    }
}
