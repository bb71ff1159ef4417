//! Integration tests for the MediBook HTTP client

use chrono::NaiveDate;
use medibook_core::LoginForm;
use medibook_core::types::{
    AppointmentFilters, AppointmentStatus, DoctorSearchFilters, LoginCredentials, Role, Specialty,
};
use medibook_http::{
    ACCESS_TOKEN_KEY, ClientError, MedibookClient, MemoryStorage, REFRESH_TOKEN_KEY, TokenStorage,
};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(role: &str) -> Value {
    json!({
        "_id": "u1",
        "fullName": "Mona Adel",
        "userName": "mona",
        "email": "mona@example.com",
        "role": role,
        "isActive": true
    })
}

fn logged_in_client(server: &MockServer) -> (MedibookClient, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(ACCESS_TOKEN_KEY, "A1").unwrap();
    storage.set_item(REFRESH_TOKEN_KEY, "R1").unwrap();
    let client = MedibookClient::builder()
        .base_url(server.uri())
        .token_storage(storage.clone())
        .build()
        .unwrap();
    (client, storage)
}

#[tokio::test]
async fn test_client_builder() {
    let client = MedibookClient::builder()
        .base_url("http://localhost:8080/api")
        .timeout(std::time::Duration::from_secs(5))
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080/api");
    assert!(!client.tokens().has_session());
}

#[tokio::test]
async fn test_login_stores_tokens_and_skips_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "mona@example.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "status": 200,
            "data": {
                "user": user_json("patient"),
                "tokens": {"accessToken": "A1", "refreshToken": "R1"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MedibookClient::new(server.uri()).unwrap();
    let response = client
        .auth()
        .login(&LoginCredentials {
            email: "mona@example.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();

    assert_eq!(response.message.as_deref(), Some("Login successful"));
    assert_eq!(response.data.unwrap().user.role, Role::Patient);
    assert_eq!(client.tokens().access_token().as_deref(), Some("A1"));
    assert_eq!(client.tokens().refresh_token().as_deref(), Some("R1"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_wrong_password_does_not_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _) = logged_in_client(&server);
    let err = client
        .auth()
        .login(&LoginCredentials {
            email: "mona@example.com".into(),
            password: "wrong-password".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::AuthenticationFailed(_)));
    assert_eq!(err.user_message(), "Invalid credentials");
    assert_eq!(client.tokens().access_token().as_deref(), Some("A1"));
}

#[tokio::test]
async fn test_invalid_login_form_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = MedibookClient::new(server.uri()).unwrap();
    let err = client
        .auth()
        .login_form(LoginForm {
            email: "mona@example".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_logout_clears_tokens_even_when_backend_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (client, _) = logged_in_client(&server);
    let err = client.auth().logout().await.unwrap_err();

    assert!(matches!(err, ClientError::ServerError { status: 500, .. }));
    assert_eq!(err.user_message(), "An unexpected error occurred");
    assert!(client.tokens().access_token().is_none());
    assert!(client.tokens().refresh_token().is_none());
}

#[tokio::test]
async fn test_current_user_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": user_json("doctor")})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = logged_in_client(&server);
    let user = client
        .auth()
        .current_user()
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(user.role, Role::Doctor);
}

#[tokio::test]
async fn test_filters_become_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/my-appointments"))
        .and(query_param("status", "pending"))
        .and(query_param("startDate", "2025-01-01"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "data": [],
                "pagination": {"total": 0, "page": 2, "limit": 10, "totalPages": 0}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = logged_in_client(&server);
    let filters = AppointmentFilters {
        status: Some(AppointmentStatus::Pending),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        page: Some(2),
        ..AppointmentFilters::default()
    };
    let page = client
        .appointments()
        .my_appointments(&filters)
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert!(page.data.is_empty());
    assert!(!page.pagination.has_next_page());
}

#[tokio::test]
async fn test_doctor_search_query_overrides_filter_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/search"))
        .and(query_param("search", "heart"))
        .and(query_param("specialty", "cardiology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"data": [], "pagination": {"total": 0, "page": 1, "limit": 10, "totalPages": 0}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = logged_in_client(&server);
    let filters = DoctorSearchFilters {
        specialty: Some(Specialty::Cardiology),
        search: Some("ignored".into()),
        ..DoctorSearchFilters::default()
    };
    client.doctors().search("heart", &filters).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("ignored"));
}

#[tokio::test]
async fn test_defaults_for_top_rated_and_nearby() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/top-rated"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clinics/nearby"))
        .and(query_param("lat", "30.05"))
        .and(query_param("lng", "31.25"))
        .and(query_param("maxDistance", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = logged_in_client(&server);
    let doctors = client.doctors().top_rated(None).await.unwrap();
    assert_eq!(doctors.data.unwrap().len(), 0);
    let clinics = client.clinics().nearby(30.05, 31.25, None).await.unwrap();
    assert!(clinics.data.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_sends_reason_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/appointments/ap1/cancel"))
        .and(body_json(json!({"reason": "Travelling"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Cancelled"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = logged_in_client(&server);
    let response = client
        .appointments()
        .cancel("ap1", Some("Travelling"))
        .await
        .unwrap();
    assert_eq!(response.message.as_deref(), Some("Cancelled"));
    assert!(response.data.is_none());
}

#[tokio::test]
async fn test_remove_schedule_exception_uses_date_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/schedules/s1/exceptions/2025-03-14"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = logged_in_client(&server);
    let response = client
        .schedules()
        .remove_exception("s1", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
        .await
        .unwrap();
    assert!(response.data.is_none());
}

#[tokio::test]
async fn test_error_message_comes_from_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Doctor not found"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clinics/c1"))
        .respond_with(ResponseTemplate::new(403).set_body_string(""))
        .mount(&server)
        .await;

    let (client, _) = logged_in_client(&server);

    let err = client.doctors().get("missing").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref m) if m == "Doctor not found"));

    let err = client.clinics().get("c1").await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert_eq!(err.user_message(), "An unexpected error occurred");
}
