use super::StreamAttack;
use crate::errors::CamscoutError;
use crate::model::Stream;
use crate::rtsp::{RtspConnector, RtspSession};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Confirms a stream can really be played
pub struct StreamValidator {
    connector: Arc<dyn RtspConnector>,
}

impl StreamValidator {
    pub fn new(connector: Arc<dyn RtspConnector>) -> Self {
        Self { connector }
    }

    /// Full DESCRIBE, SETUP, PLAY handshake with the found route and
    /// credentials. Streams missing either are not contacted.
    pub async fn validate(&self, stream: &Stream) -> bool {
        if !(stream.route_found && stream.credentials_found) {
            debug!("Skipping validation of {}: route or credentials missing", stream.key());
            return false;
        }

        let mut session = match self.connector.connect(&stream.address, stream.port).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Cannot open a session to {}: {}", stream.key(), e);
                return false;
            }
        };

        let result = handshake(session.as_mut(), stream).await;
        session.close().await;

        match result {
            Ok(available) => available,
            Err(e) => {
                warn!("Validation of {} failed: {}", stream.url(), e);
                false
            }
        }
    }
}

async fn handshake(session: &mut dyn RtspSession, stream: &Stream) -> Result<bool, CamscoutError> {
    let url = stream.url();
    let credential = stream.credential();

    let response = session.describe(&url, credential.as_ref()).await?;
    if response.status != 200 {
        debug!("DESCRIBE {} -> {}", url, response.status);
        return Ok(false);
    }

    let Some(description) = response.description else {
        debug!("No session description for {}", url);
        return Ok(false);
    };
    let Some(media) = description.select_media() else {
        debug!("No supported media in {}:\n{}", url, description.raw);
        return Ok(false);
    };
    debug!(
        "Selected {} media {} (payload type {:?}) of {}",
        media.kind,
        media.format.name(),
        media.payload_type,
        url
    );

    let control_url = description.control_url(media);
    let status = session.setup(&control_url).await?;
    if status != 200 {
        debug!("SETUP {} ({}) -> {}", control_url, media.format.name(), status);
        return Ok(false);
    }

    let status = session.play(&description.base_url).await?;
    debug!("PLAY {} -> {}", description.base_url, status);
    Ok(status == 200)
}

#[async_trait]
impl StreamAttack for StreamValidator {
    async fn attack(&self, stream: &mut Stream) -> Result<(), CamscoutError> {
        stream.available = self.validate(stream).await;
        if stream.available {
            info!("Stream {} is available", stream.url());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "validate"
    }
}
