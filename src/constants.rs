/// Ports RTSP servers usually listen on
pub const DEFAULT_PORTS: &[u16] = &[554, 5554, 8554];

/// Route that no camera should ever serve. A positive answer to it means the
/// server does not check routes at all.
pub const DUMMY_ROUTE: &str = "/0x8b6c42";

/// Probe sent to every open port during the scan
pub const RTSP_PROBE_REQUEST: &[u8] = b"OPTIONS * RTSP/1.0\r\nCSeq: 1\r\nContent-Length: 0\r\n\r\n";

/// Prefix every RTSP response starts with
pub const RTSP_BANNER_PREFIX: &[u8] = b"RTSP";

/// Bytes read from a probed port
pub const PROBE_BUFFER_SIZE: usize = 256;

/// Upper bound on a buffered RTSP response
pub const MAX_RESPONSE_SIZE: usize = 64 * 1024;

pub const USER_AGENT: &str = "camscout";

/// Route statuses: found, needs credentials, forbidden
pub const DEFAULT_ROUTE_STATUSES: &[u16] = &[200, 401, 403];

/// Credential statuses: accepted, or accepted but the route is wrong
pub const DEFAULT_CREDENTIAL_STATUSES: &[u16] = &[200, 404];

/// Directory searched next to the executable for dictionaries
pub const DICTIONARY_DIR: &str = "dictionaries";
pub const CREDENTIALS_FILE: &str = "credentials.json";
pub const ROUTES_FILE: &str = "routes";

/// Built-in dictionaries, used when no dictionary ships next to the binary
pub const BUILTIN_CREDENTIALS: &str = include_str!("../dictionaries/credentials.json");
pub const BUILTIN_ROUTES: &str = include_str!("../dictionaries/routes");
