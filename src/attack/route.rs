use super::{pace, StreamAttack};
use crate::config::ScanConfig;
use crate::constants::DUMMY_ROUTE;
use crate::db::dictionary::Dictionaries;
use crate::errors::CamscoutError;
use crate::model::{Credential, Stream};
use crate::rtsp::{RtspConnector, RtspSession};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Finds the routes a stream is served on
pub struct RouteAttack {
    config: Arc<ScanConfig>,
    dictionaries: Arc<Dictionaries>,
    connector: Arc<dyn RtspConnector>,
}

impl RouteAttack {
    pub fn new(
        config: Arc<ScanConfig>,
        dictionaries: Arc<Dictionaries>,
        connector: Arc<dyn RtspConnector>,
    ) -> Self {
        Self {
            config,
            dictionaries,
            connector,
        }
    }

    /// DESCRIBE `route` and tell whether the answer means it exists
    async fn probe(
        &self,
        session: &mut dyn RtspSession,
        stream: &Stream,
        route: &str,
        credential: Option<&Credential>,
    ) -> bool {
        let url = stream.url_for(route);
        match session.describe(&url, credential).await {
            Ok(response) => {
                let accepted = self.config.is_route_accepted(response.status);
                debug!("DESCRIBE {} -> {} (accepted: {})", url, response.status, accepted);
                accepted
            }
            Err(e) => {
                debug!("DESCRIBE {} failed: {}", url, e);
                false
            }
        }
    }

    /// Routes accepted by the server during this pass.
    ///
    /// `["/"]` when the server accepts a route no camera would ever serve,
    /// meaning it does not check routes at all.
    async fn discover(&self, session: &mut dyn RtspSession, stream: &Stream) -> Vec<String> {
        let credential = stream.credential();

        if self.probe(session, stream, DUMMY_ROUTE, credential.as_ref()).await {
            debug!("{} accepts the dummy route", stream.key());
            return vec!["/".to_string()];
        }

        let mut found = Vec::new();
        for route in self.dictionaries.routes.iter() {
            if self.probe(session, stream, route, credential.as_ref()).await {
                found.push(route.clone());
            }
            pace(&self.config).await;
        }
        found
    }
}

#[async_trait]
impl StreamAttack for RouteAttack {
    async fn attack(&self, stream: &mut Stream) -> Result<(), CamscoutError> {
        let mut session = self.connector.connect(&stream.address, stream.port).await?;
        let found = self.discover(session.as_mut(), stream).await;
        session.close().await;

        if found.is_empty() {
            info!("No route found for {}", stream.key());
        } else {
            info!("Route(s) found for {}: {}", stream.key(), found.join(", "));
            stream.routes = found;
            stream.route_found = true;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "route"
    }
}
