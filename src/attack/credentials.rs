use super::{pace, StreamAttack};
use crate::config::ScanConfig;
use crate::db::dictionary::Dictionaries;
use crate::errors::CamscoutError;
use crate::model::{Credential, Stream};
use crate::rtsp::sdp::SessionDescription;
use crate::rtsp::{RtspConnector, RtspSession};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Brute forces the credentials of a stream
pub struct CredentialAttack {
    config: Arc<ScanConfig>,
    dictionaries: Arc<Dictionaries>,
    connector: Arc<dyn RtspConnector>,
}

/// Accepted pair and the session description it unlocked
struct Match {
    credential: Credential,
    media: Option<SessionDescription>,
}

impl CredentialAttack {
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

    /// Try usernames in order, and every password for each of them. The
    /// first accepted pair wins.
    async fn search(&self, session: &mut dyn RtspSession, stream: &Stream) -> Option<Match> {
        let url = stream.url();
        let credentials = &self.dictionaries.credentials;

        for username in &credentials.usernames {
            for password in &credentials.passwords {
                let credential = Credential::new(username.as_str(), password.as_str());
                match session.describe(&url, Some(&credential)).await {
                    Ok(response) if self.config.are_credentials_accepted(response.status) => {
                        debug!("DESCRIBE {} as {:?} -> {}", url, username, response.status);
                        return Some(Match {
                            credential,
                            media: response.description,
                        });
                    }
                    Ok(response) => {
                        debug!("DESCRIBE {} as {:?} -> {}", url, username, response.status)
                    }
                    Err(e) => debug!("DESCRIBE {} as {:?} failed: {}", url, username, e),
                }
                pace(&self.config).await;
            }
        }
        None
    }
}

#[async_trait]
impl StreamAttack for CredentialAttack {
    async fn attack(&self, stream: &mut Stream) -> Result<(), CamscoutError> {
        let mut session = self.connector.connect(&stream.address, stream.port).await?;
        let found = self.search(session.as_mut(), stream).await;
        session.close().await;

        match found {
            Some(Match { credential, media }) => {
                info!("Credentials found for {}: {}", stream.key(), credential.username);
                stream.username = credential.username;
                stream.password = credential.password;
                stream.media = media;
                stream.credentials_found = true;
            }
            None => info!("No credentials found for {}", stream.key()),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "credentials"
    }
}
