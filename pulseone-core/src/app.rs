//! Application root
//!
//! Owns the one session manager and the one branding resolver so that the
//! shell and the settings editor share a single instance of each.

use crate::api::{HttpApiClient, PulseApi};
use crate::auth::{GuardDecision, LoginOutcome, RouteGuard, Session, SessionManager};
use crate::branding::{AppliedTheme, BrandingResolver};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::storage::{CredentialStore, FileCredentialStore};
use log::info;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct AppContext {
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    session: Arc<SessionManager>,
    branding: Arc<BrandingResolver>,
    guard: RouteGuard,
    shutdown: CancellationToken,
}

impl AppContext {
    /// Build the production stack: file credential store + HTTP client
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;
        let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(config.data_dir()?)?);
        let api: Arc<dyn PulseApi> = Arc::new(HttpApiClient::new(&config, store.clone())?);
        Ok(Self::with_parts(config, store, api))
    }

    /// Build from injected parts
    pub fn with_parts(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        api: Arc<dyn PulseApi>,
    ) -> Self {
        let session = Arc::new(SessionManager::new(api.clone(), store.clone()));
        let branding = Arc::new(BrandingResolver::new(api, store.clone()));
        let guard = RouteGuard::from_config(&config);

        // Logout resets branding editor state instead of reloading the app
        let resolver = Arc::downgrade(&branding);
        session.on_teardown(move || {
            if let Some(resolver) = resolver.upgrade() {
                resolver.teardown();
            }
        });

        Self {
            config,
            store,
            session,
            branding,
            guard,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn branding(&self) -> &Arc<BrandingResolver> {
        &self.branding
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Token for work that should stop when the app unmounts
    pub fn scope(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Validate the stored session and load branding concurrently
    pub async fn mount(&self) -> (Session, AppliedTheme) {
        info!("Mounting application shell");
        let auth_scope = self.scope();
        let branding_scope = self.scope();

        let (session, theme) = tokio::join!(
            self.session.check_auth(&auth_scope),
            self.branding.load(&branding_scope),
        );

        info!(
            "Shell mounted: session {}, branding from {}",
            session.state(),
            theme.source
        );
        (session, theme)
    }

    pub fn navigate(&self, path: &str) -> GuardDecision {
        self.guard.evaluate_path(path, &self.session.snapshot())
    }

    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        self.session.login(email, password, &self.scope()).await
    }

    /// Log out and return where the shell should navigate
    pub fn logout(&self) -> String {
        self.session.logout();
        self.guard.login_path().to_string()
    }

    /// Abort in-flight requests; the context is unusable for new work afterwards
    pub fn unmount(&self) {
        info!("Unmounting application shell");
        self.shutdown.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.shutdown.is_cancelled()
    }
}
