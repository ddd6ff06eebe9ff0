//! Pulse One Core Library
//!
//! Session gating and dynamic branding for the Pulse One HR dashboard
//! client. Used by the shell binary.

pub mod api;
pub mod app;
pub mod auth;
pub mod branding;
pub mod config;
pub mod error;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
pub use app::AppContext;
pub use auth::{GuardDecision, LoginOutcome, RouteGuard, Session, SessionManager, SessionState};
pub use branding::{AppliedTheme, BrandingError, BrandingResolver, BrandingSettings, ThemeSource};
pub use config::{ClientConfig, load_config, save_config};
pub use error::{ApiError, Error, StorageError};
pub use storage::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
