use crate::config::ScanConfig;
use crate::errors::CamscoutError;
use crate::model::Stream;
use async_trait::async_trait;

pub mod auth;
pub mod credentials;
pub mod route;
pub mod validate;

/// One step of the attack pipeline applied to a single stream.
///
/// An implementation owns every RTSP session it opens and closes it before
/// returning. On error the stream is left as it was.
#[async_trait]
pub trait StreamAttack: Send + Sync {
    /// Run the attack, recording whatever was found on the stream
    async fn attack(&self, stream: &mut Stream) -> Result<(), CamscoutError>;

    fn name(&self) -> &'static str;
}

/// Wait the configured delay between two attempts
pub(crate) async fn pace(config: &ScanConfig) {
    let interval = config.attack_interval();
    if !interval.is_zero() {
        tokio::time::sleep(interval).await;
    }
}
