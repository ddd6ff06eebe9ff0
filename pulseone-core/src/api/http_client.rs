//! HTTP client for the Pulse One API

use super::{
    BRANDING_PATH, BRANDING_RESET_PATH, Envelope, LOGIN_PATH, PROFILE_PATH, PulseApi, cancellable,
    error_message_from_body,
};
use crate::auth::types::{Credentials, LoginResponse, UserProfile};
use crate::branding::types::BrandingSettings;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::storage::{CredentialStore, stored_token};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared HTTP client.
///
/// Every outgoing request passes through [`HttpApiClient::request`], which
/// attaches the stored bearer token.
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
}

impl HttpApiClient {
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Outbound interceptor: build a request and attach the bearer token
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match stored_token(self.store.as_ref()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode a JSON body, mapping failures to [`ApiError`]
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        cancellable(cancel, async {
            let response = builder
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                error!("{} failed: {} - {}", what, status, body);
                return Err(status_error(status, &body));
            }

            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(format!("Failed to parse {}: {}", what, e)))
        })
        .await
    }
}

/// Map a non-success status and its body to an error
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = error_message_from_body(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        _ => ApiError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl PulseApi for HttpApiClient {
    async fn fetch_profile(&self, cancel: &CancellationToken) -> Result<UserProfile, ApiError> {
        debug!("Fetching user profile");
        let builder = self.request(Method::GET, PROFILE_PATH);
        let profile: UserProfile = self.send_json(builder, "profile", cancel).await?;
        info!("Fetched user profile for {}", profile.id);
        Ok(profile)
    }

    async fn login(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<LoginResponse, ApiError> {
        debug!("Signing in user: {}", credentials.email);
        let builder = self.request(Method::POST, LOGIN_PATH).json(credentials);
        let response: LoginResponse = self.send_json(builder, "login", cancel).await?;
        info!("Sign in successful for user {}", response.user.id);
        Ok(response)
    }

    async fn fetch_branding(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BrandingSettings, ApiError> {
        debug!("Fetching branding settings");
        let builder = self.request(Method::GET, BRANDING_PATH);
        let envelope: Envelope<BrandingSettings> =
            self.send_json(builder, "branding settings", cancel).await?;
        envelope.into_result()
    }

    async fn save_branding(
        &self,
        settings: &BrandingSettings,
        cancel: &CancellationToken,
    ) -> Result<BrandingSettings, ApiError> {
        debug!("Saving branding settings for {}", settings.company_name);
        let builder = self.request(Method::PUT, BRANDING_PATH).json(settings);
        let envelope: Envelope<BrandingSettings> =
            self.send_json(builder, "branding save", cancel).await?;
        let saved = envelope.into_result()?;
        info!("Branding settings saved");
        Ok(saved)
    }

    async fn reset_branding(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BrandingSettings, ApiError> {
        debug!("Resetting branding settings");
        let builder = self.request(Method::POST, BRANDING_RESET_PATH);
        let envelope: Envelope<BrandingSettings> =
            self.send_json(builder, "branding reset", cancel).await?;
        let reset = envelope.into_result()?;
        info!("Branding settings reset to defaults");
        Ok(reset)
    }
}
