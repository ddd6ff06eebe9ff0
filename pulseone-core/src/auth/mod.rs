//! Authentication module for the Pulse One client
//!
//! - Stored-token validation against the profile endpoint
//! - Email/password sign-in
//! - Logout with teardown fan-out
//! - Route guarding

pub mod guard;
mod manager;
pub mod types;

pub use guard::{GuardDecision, RouteGuard};
pub use manager::{GENERIC_LOGIN_ERROR, SessionManager};
pub use types::*;
