//! Authentication types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse session state derived from a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial token check still in flight
    Unresolved,
    /// Resolved, nobody signed in
    Anonymous,
    /// Resolved, token validated by the backend
    Authenticated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unresolved => write!(f, "unresolved"),
            SessionState::Anonymous => write!(f, "anonymous"),
            SessionState::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// In-memory authentication state, owned by the session manager
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub loading: bool,
    pub error: Option<String>,
    /// Set once the initial token check has finished; never cleared
    pub resolved: bool,
    /// Last time the backend confirmed the token
    pub validated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Session at process start: token read from storage, not yet checked
    pub fn unresolved(token: Option<String>) -> Self {
        Self {
            token,
            user: None,
            loading: true,
            error: None,
            resolved: false,
            validated_at: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            token: None,
            user: None,
            loading: false,
            error: None,
            resolved: true,
            validated_at: None,
        }
    }

    pub fn authenticated(token: String, user: UserProfile) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
            loading: false,
            error: None,
            resolved: true,
            validated_at: Some(Utc::now()),
        }
    }

    /// A login in flight does not change the state; only process start is unresolved
    pub fn state(&self) -> SessionState {
        if !self.resolved {
            SessionState::Unresolved
        } else if self.user.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// User identifier; the backend sends numbers or strings depending on the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Numeric(id) => write!(f, "{}", id),
            UserId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// Profile returned by the backend.
///
/// Only `id`, `name` and `email` are interpreted; everything else is kept
/// as-is in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// Name for display, falling back to the email
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Successful login response
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Result of a login attempt; failures are values, not errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failed { error: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success => None,
            LoginOutcome::Failed { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        serde_json::from_str(r#"{"id": 1, "name": "Admin", "email": "admin@pulseone.com"}"#)
            .unwrap()
    }

    #[test]
    fn test_session_states() {
        assert_eq!(
            Session::unresolved(Some("t".to_string())).state(),
            SessionState::Unresolved
        );
        assert_eq!(Session::anonymous().state(), SessionState::Anonymous);

        let session = Session::authenticated("t".to_string(), profile());
        assert_eq!(session.state(), SessionState::Authenticated);
        assert!(session.validated_at.is_some());
    }

    #[test]
    fn test_login_in_flight_keeps_authenticated_state() {
        let mut session = Session::authenticated("t".to_string(), profile());
        session.loading = true;
        assert_eq!(session.state(), SessionState::Authenticated);
    }

    #[test]
    fn test_login_in_flight_from_anonymous_stays_anonymous() {
        let mut session = Session::anonymous();
        session.loading = true;
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_user_profile_numeric_id() {
        let user = profile();
        assert_eq!(user.id, UserId::Numeric(1));
        assert_eq!(user.id.to_string(), "1");
        assert_eq!(user.display_name(), "Admin");
    }

    #[test]
    fn test_user_profile_keeps_unknown_fields() {
        let json = r#"{"id": "u-42", "name": "", "email": "hr@example.com", "role": "manager"}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::Text("u-42".to_string()));
        assert_eq!(user.display_name(), "hr@example.com");
        assert_eq!(user.extra.get("role").and_then(|v| v.as_str()), Some("manager"));
    }

    #[test]
    fn test_login_response_without_email() {
        let json = r#"{"token": "abc", "user": {"id": 1, "name": "Admin"}}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "abc");
        assert_eq!(resp.user.name, "Admin");
        assert!(resp.user.email.is_empty());
    }

    #[test]
    fn test_login_outcome_accessors() {
        assert!(LoginOutcome::Success.is_success());
        assert_eq!(LoginOutcome::Success.error(), None);

        let failed = LoginOutcome::Failed {
            error: "Invalid credentials".to_string(),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.error(), Some("Invalid credentials"));
    }

    #[test]
    fn test_credentials_serialize() {
        let json = serde_json::to_value(Credentials::new("a@b.c", "pw")).unwrap();
        assert_eq!(json["email"], "a@b.c");
        assert_eq!(json["password"], "pw");
    }
}
