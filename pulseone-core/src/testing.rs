//! Scripted backend for unit tests

use crate::api::{PulseApi, cancellable};
use crate::auth::types::{Credentials, LoginResponse, UserProfile};
use crate::branding::types::BrandingSettings;
use crate::error::ApiError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Fake backend: each endpoint pops queued responses, falling back to a
/// network error when the queue is empty.
#[derive(Default)]
pub struct FakeApi {
    profile: Mutex<VecDeque<Result<UserProfile, ApiError>>>,
    login: Mutex<VecDeque<Result<LoginResponse, ApiError>>>,
    branding: Mutex<VecDeque<Result<BrandingSettings, ApiError>>>,
    save: Mutex<VecDeque<Result<BrandingSettings, ApiError>>>,
    reset: Mutex<VecDeque<Result<BrandingSettings, ApiError>>>,
    /// When set, branding fetches wait for a notification
    hold_branding: Mutex<Option<Arc<Notify>>>,
    hold_login: Mutex<Option<Arc<Notify>>>,
    pub profile_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub branding_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
    pub last_credentials: Mutex<Option<Credentials>>,
    pub last_saved: Mutex<Option<BrandingSettings>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_profile(&self, response: Result<UserProfile, ApiError>) {
        self.profile.lock().push_back(response);
    }

    pub fn push_login(&self, response: Result<LoginResponse, ApiError>) {
        self.login.lock().push_back(response);
    }

    pub fn push_branding(&self, response: Result<BrandingSettings, ApiError>) {
        self.branding.lock().push_back(response);
    }

    pub fn push_save(&self, response: Result<BrandingSettings, ApiError>) {
        self.save.lock().push_back(response);
    }

    pub fn push_reset(&self, response: Result<BrandingSettings, ApiError>) {
        self.reset.lock().push_back(response);
    }

    /// Make branding fetches block until the returned handle is notified
    pub fn hold_branding(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold_branding.lock() = Some(notify.clone());
        notify
    }

    /// Make logins block until the returned handle is notified
    pub fn hold_login(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold_login.lock() = Some(notify.clone());
        notify
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn pop<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>) -> Result<T, ApiError> {
        queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted response".to_string())))
    }
}

pub fn profile(id: i64, name: &str) -> UserProfile {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "email": format!("{}@pulseone.com", name.to_lowercase()),
    }))
    .unwrap()
}

#[async_trait]
impl PulseApi for FakeApi {
    async fn fetch_profile(&self, cancel: &CancellationToken) -> Result<UserProfile, ApiError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        cancellable(cancel, async { Self::pop(&self.profile) }).await
    }

    async fn login(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<LoginResponse, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_credentials.lock() = Some(credentials.clone());
        let hold = self.hold_login.lock().clone();
        cancellable(cancel, async {
            if let Some(notify) = hold {
                notify.notified().await;
            }
            Self::pop(&self.login)
        })
        .await
    }

    async fn fetch_branding(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BrandingSettings, ApiError> {
        self.branding_calls.fetch_add(1, Ordering::SeqCst);
        let hold = self.hold_branding.lock().clone();
        cancellable(cancel, async {
            if let Some(notify) = hold {
                notify.notified().await;
            }
            Self::pop(&self.branding)
        })
        .await
    }

    async fn save_branding(
        &self,
        settings: &BrandingSettings,
        cancel: &CancellationToken,
    ) -> Result<BrandingSettings, ApiError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_saved.lock() = Some(settings.clone());
        cancellable(cancel, async { Self::pop(&self.save) }).await
    }

    async fn reset_branding(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BrandingSettings, ApiError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        cancellable(cancel, async { Self::pop(&self.reset) }).await
    }
}
