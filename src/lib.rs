//! camscout - RTSP camera discovery and access auditing
//!
//! This library provides:
//! - Concurrent port probing with RTSP fingerprinting
//! - Route discovery against a dictionary, with a dummy route check
//! - Authentication method detection and credential brute forcing
//! - Stream validation through a full DESCRIBE/SETUP/PLAY handshake

pub mod attack;
pub mod config;
pub mod constants;
pub mod db;
pub mod engine;
pub mod errors;
pub mod model;
pub mod net;
pub mod output;
pub mod rtsp;
pub mod table;

// Re-export commonly used types for convenience
pub use attack::StreamAttack;
pub use config::{Cli, ScanConfig};
pub use db::dictionary::{Credentials, Dictionaries, Routes};
pub use engine::Camscout;
pub use errors::CamscoutError;
pub use model::{AuthMethod, Credential, PortStatus, Stream};
pub use rtsp::{RtspConnector, RtspSession, TcpConnector};
