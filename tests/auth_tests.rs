use camscout::attack::auth::AuthMethodDetector;
use camscout::rtsp::auth::authorization_header;
use camscout::rtsp::{parse_auth_header, AuthInfo, AuthScheme};
use camscout::{AuthMethod, Credential};
use md5::{Digest, Md5};
use std::sync::Arc;
use test_utils::{test_stream, MockCamera, MockConnector};


fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

#[test]
fn test_parse_digest_header() {
    let info = parse_auth_header(r#"Digest realm="x", nonce="y", qop="auth""#);
    assert_eq!(info.scheme, Some(AuthScheme::Digest));
    assert_eq!(info.realm, "x");
    assert_eq!(info.nonce, "y");
    assert_eq!(info.qop, "auth");
    assert!(info.opaque.is_empty());
    assert!(info.stale.is_empty());
    assert!(info.algorithm.is_empty());
}

#[test]
fn test_parse_basic_header() {
    let info = parse_auth_header(r#"Basic realm="z""#);
    assert_eq!(info.scheme, Some(AuthScheme::Basic));
    assert_eq!(info.realm, "z");
    assert!(info.nonce.is_empty());
}

#[test]
fn test_parse_is_case_and_whitespace_tolerant() {
    let info = parse_auth_header(
        r#"DIGEST  Realm = "cam" ,NONCE="n1",  opaque="op", stale=FALSE, algorithm=MD5"#,
    );
    assert_eq!(info.scheme, Some(AuthScheme::Digest));
    assert_eq!(info.realm, "cam");
    assert_eq!(info.nonce, "n1");
    assert_eq!(info.opaque, "op");
    assert_eq!(info.stale, "FALSE");
    assert_eq!(info.algorithm, "MD5");
}

#[test]
fn test_parse_keeps_commas_inside_quotes() {
    let info = parse_auth_header(r#"Digest realm="a, b", nonce="n", qop="auth,auth-int""#);
    assert_eq!(info.realm, "a, b");
    assert_eq!(info.qop, "auth,auth-int");
}

#[test]
fn test_parse_unknown_scheme_keeps_raw_header() {
    let header = r#"Bearer realm="x""#;
    let info = parse_auth_header(header);
    assert_eq!(
        info,
        AuthInfo {
            header: header.to_string(),
            ..Default::default()
        }
    );
}

#[test]
fn test_basic_authorization_header() {
    let challenge = parse_auth_header(r#"Basic realm="cam""#);
    let header = authorization_header(
        &challenge,
        &Credential::new("admin", "admin"),
        "DESCRIBE",
        "rtsp://10.0.0.1:554/live",
        1,
    );
    assert_eq!(header.as_deref(), Some("Basic YWRtaW46YWRtaW4="));
}

#[test]
fn test_digest_authorization_header_without_qop() {
    let challenge = parse_auth_header(r#"Digest realm="cam", nonce="abc123""#);
    let uri = "rtsp://10.0.0.1:554/live";
    let header = authorization_header(
        &challenge,
        &Credential::new("admin", "12345"),
        "DESCRIBE",
        uri,
        1,
    )
    .unwrap();

    let ha1 = md5_hex("admin:cam:12345");
    let ha2 = md5_hex(&format!("DESCRIBE:{}", uri));
    let expected = md5_hex(&format!("{}:abc123:{}", ha1, ha2));

    assert!(header.starts_with(r#"Digest username="admin", realm="cam", nonce="abc123""#));
    assert!(header.contains(&format!(r#"response="{}""#, expected)));
    assert!(!header.contains("qop="));
}

#[test]
fn test_digest_authorization_header_with_qop() {
    let challenge = parse_auth_header(r#"Digest realm="cam", nonce="abc123", qop="auth", opaque="xyz""#);
    let header = authorization_header(
        &challenge,
        &Credential::new("admin", "12345"),
        "DESCRIBE",
        "rtsp://10.0.0.1:554/live",
        1,
    )
    .unwrap();

    assert!(header.contains("qop=auth"));
    assert!(header.contains("nc=00000001"));
    assert!(header.contains("cnonce=\""));
    assert!(header.contains(r#"opaque="xyz""#));
}

#[test]
fn test_unknown_scheme_has_no_authorization() {
    let challenge = parse_auth_header("Negotiate");
    let header = authorization_header(&challenge, &Credential::new("a", "b"), "DESCRIBE", "rtsp://h/", 1);
    assert!(header.is_none());
}

#[tokio::test]
async fn test_detects_digest() {
    let camera = Arc::new(MockCamera::new(|_, _| 401).with_challenge(r#"Digest realm="cam", nonce="n""#));
    let detector = AuthMethodDetector::new(Arc::new(MockConnector::new().with_camera(554, camera.clone())));

    assert_eq!(detector.detect(&test_stream(554)).await, AuthMethod::Digest);
}

#[tokio::test]
async fn test_detects_basic() {
    let camera = Arc::new(MockCamera::new(|_, _| 401).with_challenge(r#"Basic realm="cam""#));
    let detector = AuthMethodDetector::new(Arc::new(MockConnector::new().with_camera(554, camera)));

    assert_eq!(detector.detect(&test_stream(554)).await, AuthMethod::Basic);
}

#[tokio::test]
async fn test_detects_no_authentication() {
    let camera = Arc::new(MockCamera::new(|_, _| 200));
    let detector = AuthMethodDetector::new(Arc::new(MockConnector::new().with_camera(554, camera.clone())));

    assert_eq!(detector.detect(&test_stream(554)).await, AuthMethod::None);

    // Described without credentials
    let describes = camera.describes.lock().unwrap();
    assert!(describes.iter().all(|(_, credential)| credential.is_none()));
}

#[tokio::test]
async fn test_unreachable_stream_is_unknown() {
    let detector = AuthMethodDetector::new(Arc::new(MockConnector::new()));
    assert_eq!(detector.detect(&test_stream(554)).await, AuthMethod::Unknown);
}

#[tokio::test]
async fn test_detection_uses_fresh_session_each_call() {
    let camera = Arc::new(MockCamera::new(|_, _| 401).with_challenge(r#"Basic realm="cam""#));
    let detector = AuthMethodDetector::new(Arc::new(MockConnector::new().with_camera(554, camera.clone())));
    let stream = test_stream(554);

    detector.detect(&stream).await;
    detector.detect(&stream).await;

    assert_eq!(camera.connect_count(), 2);
    assert_eq!(camera.close_count(), 2);
}
