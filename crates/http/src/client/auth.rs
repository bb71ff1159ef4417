//! Authentication API client methods

use super::{ApiRequest, ClientError, MedibookClient};
use medibook_core::types::{
    ApiResponse, ChangePassword, LoginCredentials, LoginResponse, SignupRequest, User,
    UserProfileUpdate,
};
use medibook_core::{CoreError, LoginForm, SignupForm};
use serde_json::Value;

/// `/auth` and `/users` endpoints
#[derive(Clone, Copy)]
pub struct Auth<'a> {
    client: &'a MedibookClient,
}

impl<'a> Auth<'a> {
    pub(crate) const fn new(client: &'a MedibookClient) -> Self {
        Self { client }
    }

    /// Log in and persist the issued tokens
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ApiResponse<LoginResponse>, ClientError> {
        let request = ApiRequest::post(&["auth", "login"])
            .json(credentials)?
            .public();
        let response: ApiResponse<LoginResponse> = self.client.send(request).await?;

        let login = response.data.as_ref().ok_or(CoreError::MissingData)?;
        self.client.tokens().store(&login.tokens)?;
        info!(role = %login.user.role, "Logged in");

        Ok(response)
    }

    /// Validate the form, then log in
    pub async fn login_form(
        &self,
        form: LoginForm,
    ) -> Result<ApiResponse<LoginResponse>, ClientError> {
        let credentials = form.validate()?;
        self.login(&credentials).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<ApiResponse<Value>, ClientError> {
        let request = ApiRequest::post(&["auth", "signup"]).json(request)?.public();
        self.client.send(request).await
    }

    /// Validate both signup steps, then register
    pub async fn signup_form(&self, form: SignupForm) -> Result<ApiResponse<Value>, ClientError> {
        let request = form.validate()?;
        self.signup(&request).await
    }

    /// Log out; local tokens are cleared whatever the backend answers
    pub async fn logout(&self) -> Result<ApiResponse<Value>, ClientError> {
        let result = self.client.send(ApiRequest::post(&["auth", "logout"])).await;
        let cleared = self.client.tokens().clear();

        match &result {
            Ok(_) => info!("Logged out"),
            Err(err) => warn!(error = %err, "Logout request failed, local session cleared anyway"),
        }

        let response = result?;
        cleared?;
        Ok(response)
    }

    pub async fn current_user(&self) -> Result<ApiResponse<User>, ClientError> {
        self.client.send(ApiRequest::get(&["auth", "me"])).await
    }

    /// Force a refresh through the shared guard
    pub async fn refresh_session(&self) -> Result<(), ClientError> {
        let current = self.client.tokens().access_token();
        self.client
            .refresh_access_token(current.as_deref())
            .await
            .map(|_| ())
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &UserProfileUpdate,
    ) -> Result<ApiResponse<User>, ClientError> {
        let request = ApiRequest::put(&["users", user_id]).json(update)?;
        self.client.send(request).await
    }

    pub async fn change_password(
        &self,
        request: &ChangePassword,
    ) -> Result<ApiResponse<Value>, ClientError> {
        let request = ApiRequest::post(&["users", "change-password"]).json(request)?;
        self.client.send(request).await
    }
}
