//! MediBook API client

pub mod appointments;
pub mod auth;
pub mod clinics;
pub mod doctors;
pub mod error;
pub mod patients;
pub mod refresh;
pub mod schedules;
pub mod token_store;

use error::ClientError;
use medibook_core::types::ApiResponse;
use refresh::{RefreshExchange, RefreshGuard, SessionListener};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use token_store::{MemoryStorage, TokenStorage, TokenStore};
use url::Url;

pub use appointments::Appointments;
pub use auth::Auth;
pub use clinics::Clinics;
pub use doctors::Doctors;
pub use patients::Patients;
pub use schedules::Schedules;

/// Backend used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

const REFRESH_PATH: [&str; 2] = ["auth", "refresh-token"];

/// MediBook API client
///
/// Clones share the token store and the refresh guard.
#[derive(Clone)]
pub struct MedibookClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: Url,
    tokens: TokenStore,
    refresh: RefreshGuard,
    listener: RwLock<Option<Arc<dyn SessionListener>>>,
}

impl MedibookClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> MedibookClientBuilder {
        MedibookClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Register the listener told about irrecoverable sessions
    pub fn set_session_listener(&self, listener: Arc<dyn SessionListener>) {
        *self
            .inner
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }

    pub const fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub const fn appointments(&self) -> Appointments<'_> {
        Appointments::new(self)
    }

    pub const fn doctors(&self) -> Doctors<'_> {
        Doctors::new(self)
    }

    pub const fn patients(&self) -> Patients<'_> {
        Patients::new(self)
    }

    pub const fn clinics(&self) -> Clinics<'_> {
        Clinics::new(self)
    }

    pub const fn schedules(&self) -> Schedules<'_> {
        Schedules::new(self)
    }

    fn url_for(&self, segments: &[String]) -> Result<Url, ClientError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Configuration("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn refresh_exchange(&self) -> Result<RefreshExchange, ClientError> {
        let refresh_path: Vec<String> = REFRESH_PATH.iter().map(ToString::to_string).collect();
        Ok(RefreshExchange {
            http: self.inner.http.clone(),
            url: self.url_for(&refresh_path)?,
            tokens: self.inner.tokens.clone(),
            listener: self
                .inner
                .listener
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        })
    }

    /// Obtain a new access token through the shared refresh guard
    pub(crate) async fn refresh_access_token(
        &self,
        rejected_token: Option<&str>,
    ) -> Result<String, ClientError> {
        let exchange = self.refresh_exchange()?;
        self.inner
            .refresh
            .refresh(exchange, rejected_token)
            .await
            .map_err(ClientError::SessionExpired)
    }

    /// Send a request and decode its envelope.
    ///
    /// Authenticated requests that come back 401 are replayed once after a
    /// refresh; a second 401 is returned as-is.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse<T>, ClientError> {
        if request.public {
            let response = self.dispatch(&request, None).await?;
            return Self::decode(response).await;
        }

        let token = self.inner.tokens.access_token();
        let response = self.dispatch(&request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        debug!(method = %request.method, path = %request.display_path(), "Access token rejected");
        let fresh = self.refresh_access_token(token.as_deref()).await?;
        let replay = self.dispatch(&request, Some(&fresh)).await?;
        Self::decode(replay).await
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.url_for(&request.path)?;
        trace!(method = %request.method, %url, "Sending request");

        let mut builder = self.inner.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiResponse<T>, ClientError> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(ApiResponse::empty());
            }
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(ClientError::from_status(
                status,
                error::message_from_body(&body),
            ))
        }
    }
}

/// One API call: method, path segments under the base URL, query and body
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    method: Method,
    path: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    public: bool,
}

impl ApiRequest {
    fn new(method: Method, path: &[&str]) -> Self {
        Self {
            method,
            path: path.iter().map(ToString::to_string).collect(),
            query: Vec::new(),
            body: None,
            public: false,
        }
    }

    pub(crate) fn get(path: &[&str]) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: &[&str]) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put(path: &[&str]) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete(path: &[&str]) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sent without a bearer token and never refreshed
    pub(crate) const fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Set one query parameter, replacing an earlier value for the same key
    pub(crate) fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.retain(|(existing, _)| existing != key);
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append the scalar fields of a serializable filter struct
    pub(crate) fn query<Q: Serialize>(mut self, params: &Q) -> Result<Self, ClientError> {
        if let Value::Object(fields) = serde_json::to_value(params)? {
            for (key, value) in fields {
                let rendered = match value {
                    Value::Null | Value::Array(_) | Value::Object(_) => continue,
                    Value::String(s) => s,
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                };
                self.query.retain(|(existing, _)| existing != &key);
                self.query.push((key, rendered));
            }
        }
        Ok(self)
    }

    fn display_path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

/// Builder for MedibookClient
#[derive(Default)]
pub struct MedibookClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    storage: Option<Arc<dyn TokenStorage>>,
    listener: Option<Arc<dyn SessionListener>>,
}

impl MedibookClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Persist tokens somewhere other than process memory
    pub fn token_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn session_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<MedibookClient, ClientError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|err| ClientError::Configuration(format!("invalid base_url {raw}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "base_url {raw} cannot be used as a base"
            )));
        }

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("medibook-client/", env!("CARGO_PKG_VERSION")).into()),
        );

        let client = client_builder.build()?;
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));

        Ok(MedibookClient {
            inner: Arc::new(ClientInner {
                http: client,
                base_url,
                tokens: TokenStore::new(storage),
                refresh: RefreshGuard::default(),
                listener: RwLock::new(self.listener),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibook_core::types::{AppointmentFilters, AppointmentStatus};

    #[test]
    fn test_default_base_url() {
        let client = MedibookClient::builder().build().unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn test_invalid_base_url_is_a_configuration_error() {
        let result = MedibookClient::new("not a url");
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_paths_are_joined_under_the_base_path() {
        let client = MedibookClient::new("http://localhost:3000/api/").unwrap();
        let url = client
            .url_for(&["doctors".to_string(), "d 1".to_string()])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/doctors/d%201");
    }

    #[tokio::test]
    async fn test_late_rejection_reuses_committed_token() {
        use token_store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"tokens": {"accessToken": "A2", "refreshToken": "R2"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(ACCESS_TOKEN_KEY, "A1").unwrap();
        storage.set_item(REFRESH_TOKEN_KEY, "R1").unwrap();
        let client = MedibookClient::builder()
            .base_url(server.uri())
            .token_storage(storage)
            .build()
            .unwrap();

        let first = client.refresh_access_token(Some("A1")).await.unwrap();
        let late = client.refresh_access_token(Some("A1")).await.unwrap();
        assert_eq!(first, "A2");
        assert_eq!(late, "A2");
    }

    #[test]
    fn test_query_flattens_scalar_filters() {
        let filters = AppointmentFilters {
            status: Some(AppointmentStatus::Confirmed),
            page: Some(2),
            ..AppointmentFilters::default()
        };
        let mut query = ApiRequest::get(&["appointments"])
            .param("page", 1)
            .query(&filters)
            .unwrap()
            .query;
        query.sort();

        assert_eq!(
            query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("status".to_string(), "confirmed".to_string()),
            ]
        );
    }
}
