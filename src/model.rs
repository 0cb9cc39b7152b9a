use crate::rtsp::sdp::SessionDescription;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A discovered RTSP endpoint and everything learned about it so far
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stream {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub username: String,
    pub password: String,
    pub routes: Vec<String>,
    pub address: String,
    pub port: u16,
    pub route_found: bool,
    pub credentials_found: bool,
    pub available: bool,
    pub authentication_type: AuthMethod,
    #[serde(skip)]
    pub media: Option<SessionDescription>,
    pub banner: String,
}

impl Stream {
    pub fn new(address: impl Into<String>, port: u16, banner: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port,
            banner: banner.into(),
            ..Default::default()
        }
    }

    /// Identity used to merge phase results back into the batch
    pub fn key(&self) -> StreamKey {
        StreamKey {
            address: self.address.clone(),
            port: self.port,
        }
    }

    /// First discovered route, without leading slashes. Empty when no route
    /// was found or when the server ignores routes.
    pub fn route(&self) -> &str {
        self.routes
            .first()
            .map(|r| r.trim_start_matches('/'))
            .unwrap_or("")
    }

    /// Host part of a URL, with IPv6 literals bracketed
    pub fn host(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]", self.address)
        } else {
            self.address.clone()
        }
    }

    /// URL of `route` on this stream, without credentials
    pub fn url_for(&self, route: &str) -> String {
        format!(
            "rtsp://{}:{}/{}",
            self.host(),
            self.port,
            route.trim_start_matches('/')
        )
    }

    /// URL of the effective route, without credentials
    pub fn url(&self) -> String {
        self.url_for(self.route())
    }

    /// Full RTSP URL, with credentials when they were found
    pub fn rtsp_url(&self) -> String {
        if self.credentials_found && !(self.username.is_empty() && self.password.is_empty()) {
            format!(
                "rtsp://{}:{}@{}:{}/{}",
                self.username,
                self.password,
                self.host(),
                self.port,
                self.route()
            )
        } else {
            self.url()
        }
    }

    pub fn admin_panel_url(&self) -> String {
        format!("http://{}/", self.host())
    }

    /// Credentials to send with requests, once they are known
    pub fn credential(&self) -> Option<Credential> {
        self.credentials_found.then(|| Credential {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    /// Route, credentials and availability are all confirmed
    pub fn is_resolved(&self) -> bool {
        self.route_found && self.credentials_found && self.available
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    pub address: String,
    pub port: u16,
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Authentication required by a stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    None,
    Basic,
    Digest,
    /// Not detected yet, or detection failed
    #[default]
    Unknown,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMethod::None => "none",
            AuthMethod::Basic => "basic",
            AuthMethod::Digest => "digest",
            AuthMethod::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A username and password pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Result of probing a single port
#[derive(Debug, Clone)]
pub struct PortStatus {
    pub host: String,
    pub port: u16,
    pub is_open: bool,
    pub is_rtsp: bool,
    pub banner: String,
}

impl PortStatus {
    pub fn closed(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            is_open: false,
            is_rtsp: false,
            banner: String::new(),
        }
    }
}
