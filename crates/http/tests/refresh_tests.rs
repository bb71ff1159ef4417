//! Concurrent 401 handling and the shared refresh exchange

use futures::future::join_all;
use medibook_http::{
    ACCESS_TOKEN_KEY, ClientError, MedibookClient, MemoryStorage, REFRESH_TOKEN_KEY,
    RefreshError, SessionListener, TokenStorage,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CountingListener {
    expired: AtomicUsize,
}

impl SessionListener for CountingListener {
    fn session_expired(&self) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    server: MockServer,
    client: MedibookClient,
    listener: Arc<CountingListener>,
}

async fn harness(with_refresh_token: bool) -> Harness {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(ACCESS_TOKEN_KEY, "A1").unwrap();
    if with_refresh_token {
        storage.set_item(REFRESH_TOKEN_KEY, "R1").unwrap();
    }

    let listener = Arc::new(CountingListener::default());
    let client = MedibookClient::builder()
        .base_url(server.uri())
        .token_storage(storage)
        .session_listener(listener.clone())
        .build()
        .unwrap();

    Harness {
        server,
        client,
        listener,
    }
}

async fn mount_stats(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/appointments/stats"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/appointments/stats"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "total": 4, "pending": 1, "confirmed": 1, "completed": 2, "cancelled": 0,
                "noShow": 0, "upcoming": 1, "past": 3, "todayAppointments": 0
            }
        })))
        .mount(server)
        .await;
}

fn refresh_success() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({
            "message": "Token refreshed",
            "data": {"tokens": {"accessToken": "A2", "refreshToken": "R2"}}
        }))
        .set_delay(Duration::from_millis(200))
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let h = harness(true).await;
    mount_stats(&h.server).await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(header("authorization", "Bearer R1"))
        .and(body_json(json!({})))
        .respond_with(refresh_success())
        .expect(1)
        .mount(&h.server)
        .await;

    let calls = (0..5).map(|_| {
        let client = h.client.clone();
        async move { client.appointments().stats().await }
    });
    let results = join_all(calls).await;

    for result in results {
        let stats = result.unwrap().into_data().unwrap();
        assert_eq!(stats.total, 4);
    }
    assert_eq!(h.client.tokens().access_token().as_deref(), Some("A2"));
    assert_eq!(h.client.tokens().refresh_token().as_deref(), Some("R2"));
    assert_eq!(h.listener.expired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_refresh_signs_everyone_out() {
    let h = harness(true).await;
    mount_stats(&h.server).await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Refresh token expired"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let calls = (0..3).map(|_| {
        let client = h.client.clone();
        async move { client.appointments().stats().await }
    });
    let results = join_all(calls).await;

    for result in results {
        match result {
            Err(ClientError::SessionExpired(RefreshError::Rejected { status, message })) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Refresh token expired");
            }
            other => panic!("expected an expired session, got {other:?}"),
        }
    }
    assert!(h.client.tokens().access_token().is_none());
    assert!(h.client.tokens().refresh_token().is_none());
    assert_eq!(h.listener.expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_refresh_token_skips_the_exchange() {
    let h = harness(false).await;
    mount_stats(&h.server).await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(refresh_success())
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.client.appointments().stats().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::SessionExpired(RefreshError::MissingRefreshToken)
    ));
    assert!(h.client.tokens().access_token().is_none());
    assert_eq!(h.listener.expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_late_401_after_failed_refresh_does_not_sign_out_twice() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/patients/my-profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/appointments/stats"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "jwt expired"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let patients = h.client.patients();
    let appointments = h.client.appointments();
    let (first, second) = tokio::join!(patients.my_profile(), appointments.stats());

    assert!(matches!(
        first,
        Err(ClientError::SessionExpired(RefreshError::Rejected { status: 401, .. }))
    ));
    assert!(matches!(
        second,
        Err(ClientError::SessionExpired(RefreshError::MissingRefreshToken))
    ));
    assert!(h.client.tokens().access_token().is_none());
    assert_eq!(h.listener.expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_refresh_response_is_a_failure() {
    let h = harness(true).await;
    mount_stats(&h.server).await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&h.server)
        .await;

    let err = h.client.appointments().stats().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::SessionExpired(RefreshError::Malformed(_))
    ));
    assert!(h.client.tokens().refresh_token().is_none());
}

#[tokio::test]
async fn test_replay_is_attempted_only_once() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/patients/my-profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(refresh_success())
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.patients().my_profile().await.unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed(_)));
    // The refresh itself succeeded, so the session stays.
    assert_eq!(h.client.tokens().access_token().as_deref(), Some("A2"));
    assert_eq!(h.listener.expired.load(Ordering::SeqCst), 0);
}
