use super::auth::{authorization_header, parse_auth_header, AuthInfo};
use super::sdp::SessionDescription;
use super::{DescribeResponse, RtspConnector, RtspSession};
use crate::constants::{MAX_RESPONSE_SIZE, USER_AGENT};
use crate::errors::CamscoutError;
use crate::model::Credential;
use async_trait::async_trait;
use rtsp_types::headers::{self, HeaderName};
use rtsp_types::{Message, Method, ParseError, Request, Response, Version};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

const INTERLEAVED_TRANSPORT: &str = "RTP/AVP/TCP;unicast;interleaved=0-1";

/// Opens plain TCP RTSP sessions
#[derive(Debug, Clone)]
pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl RtspConnector for TcpConnector {
    async fn connect(&self, address: &str, port: u16) -> Result<Box<dyn RtspSession>, CamscoutError> {
        let session = TcpSession::connect(address, port, self.timeout).await?;
        Ok(Box::new(session))
    }
}

/// RTSP/1.0 session over a single TCP connection.
///
/// The connection is reopened once if the server drops it between two
/// requests, which many cameras do after an error response.
pub struct TcpSession {
    address: String,
    port: u16,
    timeout: Duration,
    stream: Option<TcpStream>,
    cseq: u32,
    session_id: Option<String>,
    challenge: Option<AuthInfo>,
    credential: Option<Credential>,
    nonce_count: u32,
}

impl TcpSession {
    pub async fn connect(address: &str, port: u16, timeout: Duration) -> Result<Self, CamscoutError> {
        let stream = open(address, port, timeout).await?;
        Ok(Self {
            address: address.to_string(),
            port,
            timeout,
            stream: Some(stream),
            cseq: 1,
            session_id: None,
            challenge: None,
            credential: None,
            nonce_count: 0,
        })
    }

    fn timeout_error(&self) -> CamscoutError {
        CamscoutError::Timeout(self.timeout.as_millis() as u64)
    }

    /// `Authorization` value for the next request, once a challenge and
    /// credentials are both known
    fn authorization(&mut self, method: &Method, uri: &str) -> Option<String> {
        let challenge = self.challenge.as_ref()?;
        let credential = self.credential.as_ref()?;
        self.nonce_count += 1;
        authorization_header(challenge, credential, method_name(method), uri, self.nonce_count)
    }

    fn build_request(
        &mut self,
        method: &Method,
        url: &str,
        extra: &[(HeaderName, String)],
    ) -> Result<Vec<u8>, CamscoutError> {
        let uri = Url::parse(url)?;
        let mut builder = Request::builder(method.clone(), Version::V1_0)
            .request_uri(uri)
            .header(headers::CSEQ, self.cseq.to_string())
            .header(headers::USER_AGENT, USER_AGENT);
        for (name, value) in extra {
            builder = builder.header(name.clone(), value.as_str());
        }
        if let Some(authorization) = self.authorization(method, url) {
            builder = builder.header(headers::AUTHORIZATION, authorization);
        }
        self.cseq += 1;

        let request = builder.empty().map_body(|_| Vec::<u8>::new());
        let mut bytes = Vec::new();
        request
            .write(&mut bytes)
            .map_err(|e| CamscoutError::Rtsp(format!("cannot encode {} request: {:?}", method_name(method), e)))?;
        Ok(bytes)
    }

    /// Send one request and wait for its response, reconnecting once if the
    /// connection was closed under us
    async fn request(
        &mut self,
        method: &Method,
        url: &str,
        extra: &[(HeaderName, String)],
    ) -> Result<Response<Vec<u8>>, CamscoutError> {
        let mut last_error = None;
        for attempt in 0..2 {
            let bytes = self.build_request(method, url, extra)?;
            match self.exchange(&bytes).await {
                Ok(response) => return Ok(response),
                Err(CamscoutError::Io(e)) if attempt == 0 => {
                    debug!("Connection to {}:{} lost ({}), reconnecting", self.address, self.port, e);
                    self.stream = None;
                    last_error = Some(CamscoutError::Io(e));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| CamscoutError::Rtsp("connection lost".to_string())))
    }

    /// Like [`TcpSession::request`], answering a 401 challenge once when
    /// credentials are set
    async fn request_authenticated(
        &mut self,
        method: &Method,
        url: &str,
        extra: &[(HeaderName, String)],
    ) -> Result<Response<Vec<u8>>, CamscoutError> {
        let response = self.request(method, url, extra).await?;
        if u16::from(response.status()) != 401 || self.credential.is_none() {
            return Ok(response);
        }

        let Some(header) = response.header(&headers::WWW_AUTHENTICATE) else {
            return Ok(response);
        };
        let challenge = parse_auth_header(header.as_str());
        if challenge.scheme.is_none() {
            return Ok(response);
        }

        self.challenge = Some(challenge);
        self.nonce_count = 0;
        self.request(method, url, extra).await
    }

    async fn exchange(&mut self, bytes: &[u8]) -> Result<Response<Vec<u8>>, CamscoutError> {
        let limit = self.timeout;
        if self.stream.is_none() {
            self.stream = Some(open(&self.address, self.port, limit).await?);
        }
        let timeout_error = self.timeout_error();
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CamscoutError::Rtsp("no connection".to_string()))?;

        timeout(limit, stream.write_all(bytes))
            .await
            .map_err(|_| timeout_error)??;

        read_response(stream, limit).await
    }
}

#[async_trait]
impl RtspSession for TcpSession {
    async fn describe(
        &mut self,
        url: &str,
        credential: Option<&Credential>,
    ) -> Result<DescribeResponse, CamscoutError> {
        self.credential = credential.cloned();
        let extra = [(headers::ACCEPT, "application/sdp".to_string())];
        let response = self.request_authenticated(&Method::Describe, url, &extra).await?;

        let status = u16::from(response.status());
        let www_authenticate = response
            .header(&headers::WWW_AUTHENTICATE)
            .map(|h| h.as_str().to_string());

        let description = if status == 200 && !response.body().is_empty() {
            let base_url = response
                .header(&headers::CONTENT_BASE)
                .map(|h| h.as_str().to_string())
                .unwrap_or_else(|| url.to_string());
            let body = String::from_utf8_lossy(response.body());
            match SessionDescription::parse(&base_url, &body) {
                Ok(description) => Some(description),
                Err(e) => {
                    debug!("Unparseable session description from {}: {}", url, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(DescribeResponse {
            status,
            www_authenticate,
            description,
        })
    }

    async fn setup(&mut self, control_url: &str) -> Result<u16, CamscoutError> {
        let mut extra = vec![(headers::TRANSPORT, INTERLEAVED_TRANSPORT.to_string())];
        if let Some(session_id) = &self.session_id {
            extra.push((headers::SESSION, session_id.clone()));
        }

        let response = self.request_authenticated(&Method::Setup, control_url, &extra).await?;
        let status = u16::from(response.status());
        if status == 200 {
            self.session_id = response
                .header(&headers::SESSION)
                .and_then(|h| h.as_str().split(';').next())
                .map(|id| id.trim().to_string());
        }
        Ok(status)
    }

    async fn play(&mut self, url: &str) -> Result<u16, CamscoutError> {
        let mut extra = vec![(headers::RANGE, "npt=0.000-".to_string())];
        if let Some(session_id) = &self.session_id {
            extra.push((headers::SESSION, session_id.clone()));
        }

        let response = self.request_authenticated(&Method::Play, url, &extra).await?;
        Ok(u16::from(response.status()))
    }

    async fn close(&mut self) {
        if let Some(session_id) = self.session_id.take() {
            let url = format!("rtsp://{}:{}/", self.address, self.port);
            let extra = [(headers::SESSION, session_id)];
            // The server may already be streaming interleaved RTP, so the
            // TEARDOWN response is not waited for.
            if let (Ok(bytes), Some(stream)) = (
                self.build_request(&Method::Teardown, &url, &extra),
                self.stream.as_mut(),
            ) {
                let _ = timeout(self.timeout, stream.write_all(&bytes)).await;
            }
        }
        if let Some(mut stream) = self.stream.take() {
            let _ = timeout(self.timeout, stream.shutdown()).await;
        }
    }
}

async fn open(address: &str, port: u16, limit: Duration) -> Result<TcpStream, CamscoutError> {
    let address = address.trim_start_matches('[').trim_end_matches(']');
    timeout(limit, TcpStream::connect((address, port)))
        .await
        .map_err(|_| CamscoutError::Timeout(limit.as_millis() as u64))?
        .map_err(CamscoutError::from)
}

/// Read until a complete response has been buffered, skipping interleaved
/// data frames that may precede it
async fn read_response(stream: &mut TcpStream, limit: Duration) -> Result<Response<Vec<u8>>, CamscoutError> {
    let mut buffer: Vec<u8> = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];

    loop {
        let n = timeout(limit, stream.read(&mut chunk))
            .await
            .map_err(|_| CamscoutError::Timeout(limit.as_millis() as u64))??;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )
            .into());
        }
        buffer.extend_from_slice(&chunk[..n]);

        loop {
            match Message::<Vec<u8>>::parse(&buffer[..]) {
                Ok((Message::Response(response), _)) => return Ok(response),
                Ok((_, consumed)) => {
                    buffer.drain(..consumed);
                    if buffer.is_empty() {
                        break;
                    }
                }
                Err(ParseError::Incomplete(_)) => break,
                Err(_) => return Err(CamscoutError::Rtsp("malformed response".to_string())),
            }
        }

        if buffer.len() > MAX_RESPONSE_SIZE {
            return Err(CamscoutError::Rtsp("response too large".to_string()));
        }
    }
}

fn method_name(method: &Method) -> &'static str {
    match method {
        Method::Options => "OPTIONS",
        Method::Describe => "DESCRIBE",
        Method::Setup => "SETUP",
        Method::Play => "PLAY",
        Method::Teardown => "TEARDOWN",
        _ => "UNKNOWN",
    }
}
