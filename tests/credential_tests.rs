use camscout::attack::credentials::CredentialAttack;
use camscout::attack::StreamAttack;
use camscout::Credential;
use std::sync::Arc;
use test_utils::{dictionaries, test_config, test_stream, MockCamera, MockConnector};


const USERNAMES: &[&str] = &["root", "admin", "user"];
const PASSWORDS: &[&str] = &["", "12345", "admin"];

fn credential_attack(camera: Arc<MockCamera>) -> CredentialAttack {
    CredentialAttack::new(
        Arc::new(test_config()),
        Arc::new(dictionaries(USERNAMES, PASSWORDS, &[])),
        Arc::new(MockConnector::new().with_camera(554, camera)),
    )
}

fn accepts(username: &'static str, password: &'static str, status: u16) -> Arc<MockCamera> {
    Arc::new(MockCamera::new(move |_, credential| match credential {
        Some(c) if c.username == username && c.password == password => status,
        _ => 401,
    }))
}

#[tokio::test]
async fn test_attempts_follow_dictionary_rank() {
    let camera = accepts("admin", "12345", 200);
    let attack = credential_attack(camera.clone());
    let mut stream = test_stream(554);
    stream.routes = vec!["live".to_string()];
    stream.route_found = true;

    attack.attack(&mut stream).await.unwrap();

    // root x 3, then admin/"" and admin/12345
    assert_eq!(camera.describe_count(), 5);
    assert!(stream.credentials_found);
    assert_eq!(stream.username, "admin");
    assert_eq!(stream.password, "12345");
    assert!(stream.media.is_some());

    let describes = camera.describes.lock().unwrap();
    assert!(describes.iter().all(|(route, _)| route == "live"));
    assert_eq!(
        describes.last().unwrap().1,
        Some(Credential::new("admin", "12345"))
    );
}

#[tokio::test]
async fn test_first_pair_wins() {
    let camera = Arc::new(MockCamera::new(|_, _| 200));
    let attack = credential_attack(camera.clone());
    let mut stream = test_stream(554);

    attack.attack(&mut stream).await.unwrap();

    assert_eq!(camera.describe_count(), 1);
    assert_eq!(stream.username, "root");
    assert_eq!(stream.password, "");
}

#[tokio::test]
async fn test_not_found_means_credentials_accepted() {
    let camera = accepts("user", "admin", 404);
    let attack = credential_attack(camera.clone());
    let mut stream = test_stream(554);

    attack.attack(&mut stream).await.unwrap();

    assert_eq!(camera.describe_count(), 9);
    assert!(stream.credentials_found);
    assert_eq!(stream.username, "user");
    assert_eq!(stream.password, "admin");
    assert!(stream.media.is_none());
}

#[tokio::test]
async fn test_exhaustion_records_nothing() {
    let camera = Arc::new(MockCamera::new(|_, _| 401));
    let attack = credential_attack(camera.clone());
    let mut stream = test_stream(554);

    attack.attack(&mut stream).await.unwrap();

    assert_eq!(camera.describe_count(), USERNAMES.len() * PASSWORDS.len());
    assert!(!stream.credentials_found);
    assert!(stream.username.is_empty());
    assert!(stream.password.is_empty());
    assert!(stream.media.is_none());
    assert_eq!(camera.close_count(), 1);
}

#[tokio::test]
async fn test_empty_route_is_used_without_a_found_route() {
    let camera = accepts("root", "admin", 200);
    let attack = credential_attack(camera.clone());
    let mut stream = test_stream(554);

    attack.attack(&mut stream).await.unwrap();

    assert!(stream.credentials_found);
    assert!(camera.described_routes().iter().all(|route| route.is_empty()));
}

#[tokio::test]
async fn test_custom_credential_statuses() {
    let camera = Arc::new(MockCamera::new(|_, credential| match credential {
        Some(c) if c.username == "admin" && c.password == "12345" => 200,
        _ => 404,
    }));
    let attack = CredentialAttack::new(
        Arc::new(camscout::ScanConfig {
            credential_accept_statuses: vec![200],
            ..test_config()
        }),
        Arc::new(dictionaries(USERNAMES, PASSWORDS, &[])),
        Arc::new(MockConnector::new().with_camera(554, camera.clone())),
    );
    let mut stream = test_stream(554);

    attack.attack(&mut stream).await.unwrap();

    // 404 no longer counts as a success
    assert_eq!(camera.describe_count(), 5);
    assert!(stream.credentials_found);
    assert_eq!(stream.username, "admin");
    assert_eq!(stream.password, "12345");
}
