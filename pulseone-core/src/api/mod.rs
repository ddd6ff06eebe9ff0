//! Backend API seam
//!
//! [`PulseApi`] is the contract the session manager and branding resolver
//! consume. [`HttpApiClient`] implements it over HTTP; tests substitute a
//! scripted fake.

pub mod http_client;

pub use http_client::HttpApiClient;

use crate::auth::types::{Credentials, LoginResponse, UserProfile};
use crate::branding::types::BrandingSettings;
use crate::error::ApiError;
use async_trait::async_trait;
use serde::Deserialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub const PROFILE_PATH: &str = "/auth/profile";
pub const LOGIN_PATH: &str = "/auth/login";
pub const BRANDING_PATH: &str = "/settings/branding";
pub const BRANDING_RESET_PATH: &str = "/settings/branding/reset";

/// Operations the client core needs from the backend.
///
/// Every call races against `cancel` and returns [`ApiError::Cancelled`]
/// once it fires.
#[async_trait]
pub trait PulseApi: Send + Sync {
    /// `GET /auth/profile` with the stored bearer token
    async fn fetch_profile(&self, cancel: &CancellationToken) -> Result<UserProfile, ApiError>;

    /// `POST /auth/login`
    async fn login(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<LoginResponse, ApiError>;

    /// `GET /settings/branding`
    async fn fetch_branding(&self, cancel: &CancellationToken)
    -> Result<BrandingSettings, ApiError>;

    /// `PUT /settings/branding`, returns the server-confirmed value
    async fn save_branding(
        &self,
        settings: &BrandingSettings,
        cancel: &CancellationToken,
    ) -> Result<BrandingSettings, ApiError>;

    /// `POST /settings/branding/reset`, returns the server's defaults
    async fn reset_branding(&self, cancel: &CancellationToken)
    -> Result<BrandingSettings, ApiError>;
}

/// Canonical `{success, data, message}` wrapper used by the settings endpoints
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Validate the wrapper into a plain result
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(first_message(self.message, self.error)));
        }
        self.data
            .ok_or_else(|| ApiError::Decode("response envelope has no data".to_string()))
    }
}

/// Pull a human-readable message out of an error body, if it has one
pub fn error_message_from_body(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    first_message(parsed.message, parsed.error)
}

/// `message` wins over `error`; blank values count as missing
fn first_message(message: Option<String>, error: Option<String>) -> Option<String> {
    [message, error]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
}

/// Run `fut` unless `cancel` fires first
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}
