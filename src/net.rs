use crate::config::ScanConfig;
use crate::constants::{PROBE_BUFFER_SIZE, RTSP_BANNER_PREFIX, RTSP_PROBE_REQUEST};
use crate::model::{PortStatus, Stream};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Single port RTSP fingerprinting
pub mod probe {
    use super::*;

    /// Whether a response starts like an RTSP response line
    pub fn is_rtsp_banner(response: &[u8]) -> bool {
        response.starts_with(RTSP_BANNER_PREFIX)
    }

    /// Connect to `host:port`, send an OPTIONS probe and classify the answer.
    ///
    /// Never fails: an unreachable port is reported closed, and an open port
    /// that errors or stays silent is reported open but not RTSP. The socket
    /// is dropped on every path.
    pub async fn probe_port(host: &str, port: u16, probe_timeout: Duration) -> PortStatus {
        let address = host.trim_start_matches('[').trim_end_matches(']');
        let mut stream = match timeout(probe_timeout, TcpStream::connect((address, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                debug!("{}:{} closed: {}", host, port, e);
                return PortStatus::closed(host, port);
            }
            Err(_) => {
                debug!("{}:{} closed: connect timed out", host, port);
                return PortStatus::closed(host, port);
            }
        };

        let mut status = PortStatus {
            is_open: true,
            ..PortStatus::closed(host, port)
        };

        match timeout(probe_timeout, stream.write_all(RTSP_PROBE_REQUEST)).await {
            Ok(Ok(())) => {}
            _ => {
                debug!("{}:{} open, probe could not be sent", host, port);
                return status;
            }
        }

        let mut buf = [0u8; PROBE_BUFFER_SIZE];
        let count = match timeout(probe_timeout, stream.read(&mut buf)).await {
            Ok(Ok(count)) => count,
            _ => {
                debug!("{}:{} open, no answer to probe", host, port);
                return status;
            }
        };

        let response = &buf[..count];
        status.banner = String::from_utf8_lossy(response).into_owned();
        status.is_rtsp = is_rtsp_banner(response);
        if !status.is_rtsp {
            debug!("{}:{} open, not RTSP: {:?}", host, port, status.banner);
        }
        status
    }
}

/// Host x port sweeps
pub mod sweep {
    use super::*;

    /// Parse port strings, accepting single ports and inclusive `a-b` ranges.
    /// Invalid entries are skipped with a warning.
    pub fn parse_ports(ports: &[String]) -> Vec<u16> {
        let mut parsed = Vec::new();
        for entry in ports {
            let entry = entry.trim();
            if let Some((start, end)) = entry.split_once('-') {
                match (start.trim().parse::<u16>(), end.trim().parse::<u16>()) {
                    (Ok(start), Ok(end)) if start <= end => parsed.extend(start..=end),
                    _ => warn!("Skipping invalid port range {:?}", entry),
                }
            } else {
                match entry.parse::<u16>() {
                    Ok(port) => parsed.push(port),
                    Err(_) => warn!("Skipping invalid port {:?}", entry),
                }
            }
        }
        parsed.sort_unstable();
        parsed.dedup();
        parsed
    }

    /// Probe every distinct (host, port) pair and keep the RTSP ones as
    /// streams.
    ///
    /// Probes run concurrently, bounded by `max_concurrent_scans`, and are
    /// all awaited before returning. Order of the result is arbitrary.
    pub async fn scan_hosts(targets: &[String], ports: &[String], config: &ScanConfig) -> Vec<Stream> {
        let ports = parse_ports(ports);
        let probe_timeout = config.timeout();

        let mut seen = HashSet::new();
        let hosts: Vec<&String> = targets.iter().filter(|host| seen.insert(*host)).collect();

        let pairs: Vec<(String, u16)> = hosts
            .iter()
            .flat_map(|host| ports.iter().map(move |&port| (host.to_string(), port)))
            .collect();
        info!(
            "Probing {} host(s) on {} port(s)",
            hosts.len(),
            ports.len()
        );

        let streams: Vec<Stream> = stream::iter(pairs)
            .map(|(host, port)| async move { probe::probe_port(&host, port, probe_timeout).await })
            .buffer_unordered(config.max_concurrent_scans)
            .filter_map(|status| async move {
                status
                    .is_rtsp
                    .then(|| Stream::new(status.host, status.port, status.banner))
            })
            .collect()
            .await;

        info!("Found {} RTSP stream(s)", streams.len());
        streams
    }
}

/// Target list expansion
pub mod targets {
    use super::*;
    use ipnet::IpNet;
    use std::path::Path;

    /// Expand user targets into individual hosts.
    ///
    /// CIDR blocks become their host addresses, an existing file is read as
    /// one target per line, anything else (IP or hostname) is kept as is.
    /// Each host appears once, at its first position.
    pub fn expand_targets(targets: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        expand(targets)
            .into_iter()
            .filter(|host| seen.insert(host.clone()))
            .collect()
    }

    fn expand(targets: &[String]) -> Vec<String> {
        let mut hosts = Vec::new();
        for target in targets {
            let target = target.trim();
            if target.is_empty() {
                continue;
            }

            if let Ok(net) = target.parse::<IpNet>() {
                hosts.extend(net.hosts().map(|ip| ip.to_string()));
                continue;
            }

            let path = Path::new(target);
            if path.is_file() {
                match std::fs::read_to_string(path) {
                    Ok(content) => {
                        let lines: Vec<String> = content
                            .lines()
                            .map(str::trim)
                            .filter(|l| !l.is_empty() && !l.starts_with('#'))
                            .map(str::to_string)
                            .collect();
                        hosts.extend(expand(&lines));
                    }
                    Err(e) => warn!("Cannot read target file {}: {}", path.display(), e),
                }
                continue;
            }

            hosts.push(target.to_string());
        }
        hosts
    }
}
