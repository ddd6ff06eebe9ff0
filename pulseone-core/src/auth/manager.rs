//! Session manager - handles the token check, login/logout and revalidation

use super::types::{Credentials, LoginOutcome, Session, SessionState, UserProfile};
use crate::api::PulseApi;
use crate::error::ApiError;
use crate::storage::{CredentialStore, TOKEN_KEY, stored_token};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Shown when the backend rejects a login without saying why
pub const GENERIC_LOGIN_ERROR: &str = "Login failed. Please check your credentials and try again.";

type TeardownHook = Box<dyn Fn() + Send + Sync>;

/// Owns the single [`Session`] and keeps it in sync with the credential store.
///
/// Other components read the session through [`SessionManager::subscribe`]
/// or [`SessionManager::snapshot`]; only this type mutates it.
pub struct SessionManager {
    api: Arc<dyn PulseApi>,
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<Session>,
    teardown: Mutex<Vec<TeardownHook>>,
}

impl SessionManager {
    /// Create the manager with the stored token loaded but not yet validated
    pub fn new(api: Arc<dyn PulseApi>, store: Arc<dyn CredentialStore>) -> Self {
        let token = stored_token(store.as_ref());
        match &token {
            Some(t) => info!("Found stored token ({} chars), awaiting validation", t.len()),
            None => info!("No stored token found"),
        }

        let (state, _) = watch::channel(Session::unresolved(token));
        Self {
            api,
            store,
            state,
            teardown: Mutex::new(Vec::new()),
        }
    }

    /// Receive every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    /// Register a hook that runs after logout to reset component state
    pub fn on_teardown<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.teardown.lock().push(Box::new(hook));
    }

    fn publish(&self, session: Session) {
        debug!("Session state -> {}", session.state());
        self.state.send_replace(session);
    }

    fn clear_stored_token(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!("Failed to clear stored token: {}", e);
        }
    }

    /// Validate the stored token against the backend.
    ///
    /// Always resolves: a missing token, a rejected token or an unreachable
    /// backend all end in the anonymous state.
    pub async fn check_auth(&self, cancel: &CancellationToken) -> Session {
        let Some(token) = stored_token(self.store.as_ref()) else {
            debug!("No token to validate");
            self.publish(Session::anonymous());
            return self.snapshot();
        };

        match self.api.fetch_profile(cancel).await {
            Ok(user) => {
                info!("Stored token validated for user {}", user.id);
                self.publish(Session::authenticated(token, user));
            }
            Err(ApiError::Cancelled) => {
                // Not proven invalid, keep it for the next check
                info!("Token check cancelled");
                self.publish(Session::anonymous());
            }
            Err(e) => {
                warn!("Stored token rejected: {}", e);
                self.clear_stored_token();
                self.publish(Session::anonymous());
            }
        }

        self.snapshot()
    }

    /// Sign in with email and password.
    ///
    /// Never returns an error; failures are reported through the outcome and
    /// the session's `error` field.
    pub async fn login(&self, email: &str, password: &str, cancel: &CancellationToken) -> LoginOutcome {
        info!("Signing in user: {}", email);

        self.state.send_modify(|session| {
            session.loading = true;
            session.error = None;
        });

        let credentials = Credentials::new(email, password);
        let result = self.api.login(&credentials, cancel).await;

        let failure = match result {
            Ok(response) if response.token.trim().is_empty() => {
                error!("Login response did not contain a token");
                GENERIC_LOGIN_ERROR.to_string()
            }
            Ok(response) => match self.store.set(TOKEN_KEY, &response.token) {
                Ok(()) => {
                    info!("Sign in successful for user {}", response.user.id);
                    self.publish(Session::authenticated(response.token, response.user));
                    return LoginOutcome::Success;
                }
                Err(e) => {
                    error!("Failed to persist session token: {}", e);
                    "Signed in, but the session could not be saved on this device.".to_string()
                }
            },
            Err(ApiError::Cancelled) => {
                info!("Sign in cancelled");
                self.state.send_modify(|session| session.loading = false);
                return LoginOutcome::Failed {
                    error: "Login cancelled".to_string(),
                };
            }
            Err(e) => {
                error!("Sign in failed: {}", e);
                e.server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| GENERIC_LOGIN_ERROR.to_string())
            }
        };

        self.state.send_modify(|session| {
            session.loading = false;
            session.error = Some(failure.clone());
        });
        LoginOutcome::Failed { error: failure }
    }

    /// Clear credentials and reset every component that registered a teardown hook
    pub fn logout(&self) {
        info!("Logging out");

        self.clear_stored_token();
        self.publish(Session::anonymous());

        let hooks = self.teardown.lock();
        debug!("Running {} teardown hook(s)", hooks.len());
        for hook in hooks.iter() {
            hook();
        }

        info!("Logged out successfully");
    }

    /// Re-check an authenticated session, e.g. after a 401 elsewhere in the app.
    ///
    /// Failure (other than cancellation) drops the session to anonymous.
    pub async fn revalidate(&self, cancel: &CancellationToken) -> Session {
        let current = self.snapshot();
        let Some(token) = current.token.clone().filter(|_| current.is_authenticated()) else {
            debug!("Nothing to revalidate");
            return current;
        };

        match self.api.fetch_profile(cancel).await {
            Ok(user) => {
                debug!("Session still valid for user {}", user.id);
                self.publish(Session::authenticated(token, user));
            }
            Err(ApiError::Cancelled) => {
                debug!("Revalidation cancelled, keeping session");
            }
            Err(e) => {
                warn!("Session invalidated: {}", e);
                self.clear_stored_token();
                self.publish(Session::anonymous());
            }
        }

        self.snapshot()
    }

    /// Clear the last login error
    pub fn clear_error(&self) {
        self.state.send_if_modified(|session| session.error.take().is_some());
    }
}
