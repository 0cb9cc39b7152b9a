use crate::model::Credential;
use base64::engine::general_purpose::STANDARD as Base64;
use base64::Engine as _;
use md5::{Digest, Md5};
use std::time::{SystemTime, UNIX_EPOCH};

/// Authentication scheme announced in a `WWW-Authenticate` challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Digest,
}

/// Parsed `WWW-Authenticate` challenge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthInfo {
    /// `None` when the scheme is not one we know
    pub scheme: Option<AuthScheme>,
    pub realm: String,
    pub nonce: String,
    pub opaque: String,
    pub stale: String,
    pub algorithm: String,
    pub qop: String,
    /// Raw header value, kept for diagnostics
    pub header: String,
}

/// Parse a `WWW-Authenticate` header value.
///
/// Never fails: unknown schemes keep only the raw header, and missing
/// parameters are left empty.
pub fn parse_auth_header(header: &str) -> AuthInfo {
    let mut info = AuthInfo {
        header: header.to_string(),
        ..Default::default()
    };

    let trimmed = header.trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("digest") {
        info.scheme = Some(AuthScheme::Digest);
        for pair in split_params(&trimmed["digest".len()..]) {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = unquote(value);
            match key.trim().to_ascii_lowercase().as_str() {
                "realm" => info.realm = value,
                "nonce" => info.nonce = value,
                "opaque" => info.opaque = value,
                "stale" => info.stale = value,
                "algorithm" => info.algorithm = value,
                "qop" => info.qop = value,
                _ => {}
            }
        }
    } else if lower.starts_with("basic") {
        info.scheme = Some(AuthScheme::Basic);
        let rest = trimmed["basic".len()..].trim();
        let rest = if rest.to_ascii_lowercase().starts_with("realm=") {
            &rest["realm=".len()..]
        } else {
            rest
        };
        info.realm = unquote(rest);
    }

    info
}

/// Split a parameter list on commas that are not inside quotes
fn split_params(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in params.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(params[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

/// Build the `Authorization` header answering `challenge` for one request.
///
/// `nc` is the nonce count for digest challenges using `qop=auth`.
pub fn authorization_header(
    challenge: &AuthInfo,
    credential: &Credential,
    method: &str,
    uri: &str,
    nc: u32,
) -> Option<String> {
    match challenge.scheme? {
        AuthScheme::Basic => {
            let token = Base64.encode(format!("{}:{}", credential.username, credential.password));
            Some(format!("Basic {}", token))
        }
        AuthScheme::Digest => Some(digest_header(challenge, credential, method, uri, nc)),
    }
}

fn digest_header(
    challenge: &AuthInfo,
    credential: &Credential,
    method: &str,
    uri: &str,
    nc: u32,
) -> String {
    let nc = format!("{:08x}", nc);
    let cnonce = md5_hex(&format!(
        "{}:{}:{}",
        challenge.nonce,
        nc,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default()
    ))[..16]
        .to_string();

    let mut ha1 = md5_hex(&format!(
        "{}:{}:{}",
        credential.username, challenge.realm, credential.password
    ));
    if challenge.algorithm.eq_ignore_ascii_case("md5-sess") {
        ha1 = md5_hex(&format!("{}:{}:{}", ha1, challenge.nonce, cnonce));
    }
    let ha2 = md5_hex(&format!("{}:{}", method, uri));

    let use_qop = challenge
        .qop
        .split(',')
        .any(|q| q.trim().eq_ignore_ascii_case("auth"));

    let mut header = if use_qop {
        let response = md5_hex(&format!(
            "{}:{}:{}:{}:auth:{}",
            ha1, challenge.nonce, nc, cnonce, ha2
        ));
        format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\", qop=auth, nc={}, cnonce=\"{}\"",
            credential.username, challenge.realm, challenge.nonce, uri, response, nc, cnonce
        )
    } else {
        let response = md5_hex(&format!("{}:{}:{}", ha1, challenge.nonce, ha2));
        format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\"",
            credential.username, challenge.realm, challenge.nonce, uri, response
        )
    };

    if !challenge.algorithm.is_empty() {
        header.push_str(&format!(", algorithm={}", challenge.algorithm));
    }
    if !challenge.opaque.is_empty() {
        header.push_str(&format!(", opaque=\"{}\"", challenge.opaque));
    }
    header
}
