use camscout::attack::validate::StreamValidator;
use camscout::Stream;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use test_utils::{test_stream, MockCamera, MockConnector};


fn resolved_stream() -> Stream {
    let mut stream = test_stream(554);
    stream.routes = vec!["live.sdp".to_string()];
    stream.route_found = true;
    stream.username = "admin".to_string();
    stream.password = "12345".to_string();
    stream.credentials_found = true;
    stream
}

fn validator(camera: Arc<MockCamera>) -> StreamValidator {
    StreamValidator::new(Arc::new(MockConnector::new().with_camera(554, camera)))
}

#[tokio::test]
async fn test_full_handshake_makes_stream_available() {
    let camera = Arc::new(MockCamera::new(|route, credential| {
        if route == "live.sdp" && credential.is_some() {
            200
        } else {
            401
        }
    }));

    assert!(validator(camera.clone()).validate(&resolved_stream()).await);
    assert_eq!(camera.setups.load(Ordering::SeqCst), 1);
    assert_eq!(camera.plays.load(Ordering::SeqCst), 1);
    assert_eq!(camera.close_count(), camera.connect_count());
}

#[tokio::test]
async fn test_unresolved_stream_is_not_contacted() {
    let camera = Arc::new(MockCamera::new(|_, _| 200));
    let validator = validator(camera.clone());

    let mut no_credentials = resolved_stream();
    no_credentials.credentials_found = false;
    let mut no_route = resolved_stream();
    no_route.route_found = false;

    assert!(!validator.validate(&no_credentials).await);
    assert!(!validator.validate(&no_route).await);
    assert_eq!(camera.connect_count(), 0);
}

#[tokio::test]
async fn test_failed_describe_is_unavailable() {
    let camera = Arc::new(MockCamera::new(|_, _| 404));

    assert!(!validator(camera.clone()).validate(&resolved_stream()).await);
    assert_eq!(camera.setups.load(Ordering::SeqCst), 0);
    assert_eq!(camera.close_count(), 1);
}

#[tokio::test]
async fn test_failed_setup_is_unavailable() {
    let camera = Arc::new(MockCamera::new(|_, _| 200).with_setup_status(461));

    assert!(!validator(camera.clone()).validate(&resolved_stream()).await);
    assert_eq!(camera.plays.load(Ordering::SeqCst), 0);
    assert_eq!(camera.close_count(), 1);
}

#[tokio::test]
async fn test_unsupported_media_is_unavailable() {
    let sdp = "v=0\r\n\
o=- 0 0 IN IP4 127.0.0.1\r\n\
s=camera\r\n\
c=IN IP4 0.0.0.0\r\n\
t=0 0\r\n\
m=application 0 RTP/AVP 107\r\n\
a=rtpmap:107 vnd.onvif.metadata/90000\r\n\
a=control:trackID=1\r\n";
    let camera = Arc::new(MockCamera::new(|_, _| 200).with_sdp(sdp));

    assert!(!validator(camera.clone()).validate(&resolved_stream()).await);
    assert_eq!(camera.setups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_stream_is_unavailable() {
    let validator = StreamValidator::new(Arc::new(MockConnector::new()));
    assert!(!validator.validate(&resolved_stream()).await);
}
