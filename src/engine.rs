use crate::attack::{
    auth::AuthMethodDetector, credentials::CredentialAttack, pace, route::RouteAttack,
    validate::StreamValidator, StreamAttack,
};
use crate::config::ScanConfig;
use crate::db::dictionary::Dictionaries;
use crate::errors::CamscoutError;
use crate::model::{Stream, StreamKey};
use crate::net::{sweep::scan_hosts, targets::expand_targets};
use crate::rtsp::{RtspConnector, TcpConnector};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Scanner and attack orchestrator
pub struct Camscout {
    config: Arc<ScanConfig>,
    route_attack: Arc<RouteAttack>,
    auth_detector: AuthMethodDetector,
    credential_attack: Arc<CredentialAttack>,
    validator: StreamValidator,
}

impl Camscout {
    /// Validate `config`, load its dictionaries and talk RTSP over TCP
    pub fn new(config: ScanConfig) -> Result<Self, CamscoutError> {
        config.validate()?;
        let dictionaries = Dictionaries::load(&config)?;
        let connector = Arc::new(TcpConnector::new(config.timeout()));
        Ok(Self::build(config, dictionaries, connector))
    }

    /// Build the orchestrator around any RTSP connector
    pub fn with_connector(
        config: ScanConfig,
        dictionaries: Dictionaries,
        connector: Arc<dyn RtspConnector>,
    ) -> Result<Self, CamscoutError> {
        config.validate()?;
        Ok(Self::build(config, dictionaries, connector))
    }

    fn build(
        config: ScanConfig,
        dictionaries: Dictionaries,
        connector: Arc<dyn RtspConnector>,
    ) -> Self {
        let config = Arc::new(config);
        let dictionaries = Arc::new(dictionaries);

        Self {
            route_attack: Arc::new(RouteAttack::new(
                config.clone(),
                dictionaries.clone(),
                connector.clone(),
            )),
            auth_detector: AuthMethodDetector::new(connector.clone()),
            credential_attack: Arc::new(CredentialAttack::new(
                config.clone(),
                dictionaries,
                connector.clone(),
            )),
            validator: StreamValidator::new(connector),
            config,
        }
    }

    /// Probe the configured targets and ports for RTSP servers
    pub async fn scan(&self) -> Vec<Stream> {
        let hosts = expand_targets(&self.config.targets);
        scan_hosts(&hosts, &self.config.ports, &self.config).await
    }

    /// Scan, then attack whatever was found
    pub async fn run(&self) -> Result<Vec<Stream>, CamscoutError> {
        let started = Instant::now();
        let streams = self.scan().await;
        let streams = self.attack(streams).await?;
        info!("Done in {:.2}s", started.elapsed().as_secs_f64());
        Ok(streams)
    }

    /// Find routes and credentials of `streams` and check they can be played.
    ///
    /// Servers that answer 401 before 404 only reveal their route once the
    /// credentials are known, so a second route pass followed by a second
    /// validation runs when anything is left unresolved. A stream listed
    /// more than once is attacked once.
    pub async fn attack(&self, streams: Vec<Stream>) -> Result<Vec<Stream>, CamscoutError> {
        if streams.is_empty() {
            return Err(CamscoutError::NoStreams);
        }
        let streams = dedup_streams(streams);

        info!("Attacking routes of {} stream(s)", streams.len());
        let streams = self.attack_routes(streams).await;

        info!("Detecting authentication methods of {} stream(s)", streams.len());
        let streams = self.detect_auth_methods(streams).await;

        info!("Attacking credentials of {} stream(s)", streams.len());
        let streams = self.attack_credentials(streams).await;

        info!("Validating {} stream(s)", streams.len());
        let mut streams = self.validate_streams(streams).await;

        if streams.iter().any(|s| !s.is_resolved()) {
            info!("Second round of attacks");
            streams = self.attack_routes(streams).await;
            streams = self.validate_streams(streams).await;
        }

        Ok(streams)
    }

    /// Route phase, one task per stream
    pub async fn attack_routes(&self, streams: Vec<Stream>) -> Vec<Stream> {
        fan_out(self.route_attack.clone(), streams).await
    }

    /// Auth detection phase, one stream at a time
    pub async fn detect_auth_methods(&self, streams: Vec<Stream>) -> Vec<Stream> {
        self.run_sequential(&self.auth_detector, streams).await
    }

    /// Credential phase, one task per stream
    pub async fn attack_credentials(&self, streams: Vec<Stream>) -> Vec<Stream> {
        fan_out(self.credential_attack.clone(), streams).await
    }

    /// Validation phase, one stream at a time
    pub async fn validate_streams(&self, streams: Vec<Stream>) -> Vec<Stream> {
        self.run_sequential(&self.validator, streams).await
    }

    async fn run_sequential(&self, attack: &dyn StreamAttack, mut streams: Vec<Stream>) -> Vec<Stream> {
        for stream in streams.iter_mut() {
            if let Err(e) = attack.attack(stream).await {
                warn!("{} phase failed for {}: {}", attack.name(), stream.key(), e);
            }
            pace(&self.config).await;
        }
        streams
    }
}

/// Keep the first stream of every `(address, port)`
fn dedup_streams(streams: Vec<Stream>) -> Vec<Stream> {
    let mut seen = HashSet::with_capacity(streams.len());
    let mut unique = Vec::with_capacity(streams.len());
    for stream in streams {
        if seen.insert(stream.key()) {
            unique.push(stream);
        } else {
            debug!("Ignoring duplicate stream {}", stream.key());
        }
    }
    unique
}

/// Run `attack` on every stream concurrently and merge the results back by
/// stream identity. Every task is awaited; each stream is replaced at most
/// once and keeps its position.
async fn fan_out<A>(attack: Arc<A>, streams: Vec<Stream>) -> Vec<Stream>
where
    A: StreamAttack + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Stream>(streams.len().max(1));

    for stream in streams.iter().cloned() {
        let attack = attack.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let mut stream = stream;
            if let Err(e) = attack.attack(&mut stream).await {
                warn!("{} phase failed for {}: {}", attack.name(), stream.key(), e);
            }
            let _ = tx.send(stream).await;
        });
    }

    // Close the sender channel
    drop(tx);

    let mut results: HashMap<StreamKey, Stream> = HashMap::with_capacity(streams.len());
    while let Some(stream) = rx.recv().await {
        results.entry(stream.key()).or_insert(stream);
    }

    streams
        .into_iter()
        .map(|stream| results.remove(&stream.key()).unwrap_or(stream))
        .collect()
}
