use super::StreamAttack;
use crate::errors::CamscoutError;
use crate::model::{AuthMethod, Stream};
use crate::rtsp::{parse_auth_header, AuthScheme, RtspConnector};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Tells which authentication a stream asks for
pub struct AuthMethodDetector {
    connector: Arc<dyn RtspConnector>,
}

impl AuthMethodDetector {
    pub fn new(connector: Arc<dyn RtspConnector>) -> Self {
        Self { connector }
    }

    /// DESCRIBE the stream without credentials on a fresh session and read
    /// the challenge, if any. Transport failures give `Unknown`.
    pub async fn detect(&self, stream: &Stream) -> AuthMethod {
        let mut session = match self.connector.connect(&stream.address, stream.port).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Auth detection failed for {}: {}", stream.key(), e);
                return AuthMethod::Unknown;
            }
        };

        let url = stream.url();
        let result = session.describe(&url, None).await;
        session.close().await;

        match result {
            Ok(response) => match response.www_authenticate.as_deref().map(parse_auth_header) {
                Some(info) => match info.scheme {
                    Some(AuthScheme::Digest) => AuthMethod::Digest,
                    Some(AuthScheme::Basic) => AuthMethod::Basic,
                    None => AuthMethod::None,
                },
                None => AuthMethod::None,
            },
            Err(e) => {
                warn!("Auth detection failed for {}: {}", url, e);
                AuthMethod::Unknown
            }
        }
    }
}

#[async_trait]
impl StreamAttack for AuthMethodDetector {
    async fn attack(&self, stream: &mut Stream) -> Result<(), CamscoutError> {
        stream.authentication_type = self.detect(stream).await;
        info!(
            "Stream {} uses {} authentication",
            stream.url(),
            stream.authentication_type
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "auth"
    }
}
