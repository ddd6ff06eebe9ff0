//! Branding resolver - cache-first load, save/reset and editor preview

use super::style::{AppliedTheme, ThemeSource};
use super::types::BrandingSettings;
use crate::api::PulseApi;
use crate::error::ApiError;
use crate::storage::{BRANDING_KEY, CredentialStore};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// User-visible failure of an explicit branding change
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BrandingError {
    #[error("Failed to save branding settings: {}", user_message(.0))]
    Save(ApiError),

    #[error("Failed to reset branding settings: {}", user_message(.0))]
    Reset(ApiError),
}

fn user_message(err: &ApiError) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

/// Resolves and applies the tenant's branding.
///
/// A complete theme is applied at all times: defaults at construction, then
/// the cached copy, then the backend's copy. Failed fetches keep whatever was
/// last applied.
pub struct BrandingResolver {
    api: Arc<dyn PulseApi>,
    store: Arc<dyn CredentialStore>,
    applied: watch::Sender<AppliedTheme>,
    previewing: Mutex<bool>,
    last_error: Mutex<Option<BrandingError>>,
}

impl BrandingResolver {
    pub fn new(api: Arc<dyn PulseApi>, store: Arc<dyn CredentialStore>) -> Self {
        let (applied, _) = watch::channel(AppliedTheme::defaults());
        Self {
            api,
            store,
            applied,
            previewing: Mutex::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppliedTheme> {
        self.applied.subscribe()
    }

    pub fn current(&self) -> AppliedTheme {
        self.applied.borrow().clone()
    }

    pub fn is_previewing(&self) -> bool {
        *self.previewing.lock()
    }

    /// Error from the last failed save or reset, for the settings banner
    pub fn last_error(&self) -> Option<BrandingError> {
        self.last_error.lock().clone()
    }

    pub fn clear_error(&self) {
        self.last_error.lock().take();
    }

    /// Normalize and publish `settings`
    pub fn apply(&self, settings: &BrandingSettings, source: ThemeSource) -> AppliedTheme {
        let theme = AppliedTheme::from_settings(settings, source);
        debug!(
            "Applying branding from {} (primary {})",
            source, theme.settings.primary_color
        );
        self.applied.send_replace(theme.clone());
        theme
    }

    /// Read the cached blob, if present and parseable
    pub fn cached(&self) -> Option<BrandingSettings> {
        let blob = self.store.get(BRANDING_KEY)?;
        match BrandingSettings::from_json(&blob) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("Ignoring unparseable cached branding: {}", e);
                None
            }
        }
    }

    fn write_cache(&self, settings: &BrandingSettings) {
        let json = match serde_json::to_string(settings) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize branding for cache: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(BRANDING_KEY, &json) {
            warn!("Failed to cache branding settings: {}", e);
        }
    }

    /// Apply the cached copy immediately, then refresh from the backend.
    ///
    /// Never fails. While a preview is active the fetched value is cached but
    /// not applied; ending the preview picks it up.
    pub async fn load(&self, cancel: &CancellationToken) -> AppliedTheme {
        if let Some(cached) = self.cached() {
            if !self.is_previewing() {
                self.apply(&cached, ThemeSource::Cache);
            }
        }

        match self.api.fetch_branding(cancel).await {
            Ok(settings) => {
                self.write_cache(&settings);
                if self.is_previewing() {
                    debug!("Preview active, deferring fetched branding");
                } else {
                    self.apply(&settings, ThemeSource::Network);
                }
                info!("Branding loaded for {}", settings.normalized().company_name);
            }
            Err(ApiError::Cancelled) => debug!("Branding fetch cancelled"),
            Err(e) => warn!("Failed to fetch branding, keeping current theme: {}", e),
        }

        self.current()
    }

    /// Persist `settings` on the backend as entered and apply the confirmed value
    pub async fn save(
        &self,
        settings: &BrandingSettings,
        cancel: &CancellationToken,
    ) -> Result<BrandingSettings, BrandingError> {
        match self.api.save_branding(settings, cancel).await {
            Ok(confirmed) => {
                self.accept_confirmed(&confirmed);
                Ok(confirmed)
            }
            Err(e) => Err(self.record_error(BrandingError::Save(e))),
        }
    }

    /// Ask the backend to restore defaults and apply its answer
    pub async fn reset(&self, cancel: &CancellationToken) -> Result<BrandingSettings, BrandingError> {
        match self.api.reset_branding(cancel).await {
            Ok(confirmed) => {
                self.accept_confirmed(&confirmed);
                Ok(confirmed)
            }
            Err(e) => Err(self.record_error(BrandingError::Reset(e))),
        }
    }

    /// Server is the source of truth after a save or reset
    fn accept_confirmed(&self, confirmed: &BrandingSettings) {
        *self.previewing.lock() = false;
        self.clear_error();
        self.write_cache(confirmed);
        self.apply(confirmed, ThemeSource::Network);
        info!("Branding updated for {}", confirmed.normalized().company_name);
    }

    fn record_error(&self, err: BrandingError) -> BrandingError {
        warn!("{}", err);
        *self.last_error.lock() = Some(err.clone());
        err
    }

    /// Apply unsaved settings for live editing
    pub fn preview(&self, settings: &BrandingSettings) -> AppliedTheme {
        *self.previewing.lock() = true;
        self.apply(settings, ThemeSource::Preview)
    }

    /// Drop the preview and restore the last cached (saved) value
    pub fn end_preview(&self) -> AppliedTheme {
        let was_previewing = std::mem::replace(&mut *self.previewing.lock(), false);
        if !was_previewing {
            return self.current();
        }

        match self.cached() {
            Some(cached) => self.apply(&cached, ThemeSource::Cache),
            None => self.apply(&BrandingSettings::default(), ThemeSource::Default),
        }
    }

    /// Toggle the preview on with `settings`, or off
    pub fn toggle_preview(&self, settings: &BrandingSettings) -> AppliedTheme {
        if self.is_previewing() {
            self.end_preview()
        } else {
            self.preview(settings)
        }
    }

    /// Reset editor state owned by this resolver (used on logout)
    pub fn teardown(&self) {
        self.end_preview();
        self.clear_error();
    }
}
