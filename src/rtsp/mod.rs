use crate::errors::CamscoutError;
use crate::model::Credential;
use async_trait::async_trait;
use self::sdp::SessionDescription;

pub mod auth;
pub mod client;
pub mod sdp;

pub use auth::{parse_auth_header, AuthInfo, AuthScheme};
pub use client::TcpConnector;

/// Outcome of a DESCRIBE request
#[derive(Debug, Clone)]
pub struct DescribeResponse {
    pub status: u16,
    /// First `WWW-Authenticate` header of the final response
    pub www_authenticate: Option<String>,
    /// Parsed body of a 200 response
    pub description: Option<SessionDescription>,
}

/// Opens RTSP sessions.
///
/// Every attack task asks for its own session and owns it until it closes
/// it, so no session state is ever shared between tasks.
#[async_trait]
pub trait RtspConnector: Send + Sync {
    async fn connect(&self, address: &str, port: u16) -> Result<Box<dyn RtspSession>, CamscoutError>;
}

/// One RTSP control connection
#[async_trait]
pub trait RtspSession: Send {
    /// DESCRIBE `url`, answering an authentication challenge with
    /// `credential` when one is given
    async fn describe(
        &mut self,
        url: &str,
        credential: Option<&Credential>,
    ) -> Result<DescribeResponse, CamscoutError>;

    /// SETUP the media at `control_url`, returning the response status
    async fn setup(&mut self, control_url: &str) -> Result<u16, CamscoutError>;

    /// PLAY the session set up earlier, returning the response status
    async fn play(&mut self, url: &str) -> Result<u16, CamscoutError>;

    /// Tear the session down and drop the connection
    async fn close(&mut self);
}
