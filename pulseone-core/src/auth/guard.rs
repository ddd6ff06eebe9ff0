//! Route guard: admit, hold or redirect navigation based on session state

use super::types::Session;
use crate::config::ClientConfig;

/// What the shell should do with a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session check still running; show a neutral loading indicator
    Wait,
    /// Not signed in. The attempted destination is not preserved.
    Redirect { to: String },
    Admit,
}

impl GuardDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, GuardDecision::Admit)
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    login_path: String,
    public_paths: Vec<String>,
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>) -> Self {
        let login_path = login_path.into();
        Self {
            public_paths: vec![login_path.clone()],
            login_path,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut guard = Self::new(config.login_path.clone());
        for path in &config.public_paths {
            guard = guard.with_public_path(path.clone());
        }
        guard
    }

    pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.public_paths.contains(&path) {
            self.public_paths.push(path);
        }
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize(path);
        self.public_paths.iter().any(|p| normalize(p) == path)
    }

    /// Decide for a guarded route.
    ///
    /// A login in flight while already signed in keeps the page admitted;
    /// `loading` only waits when there is no user yet.
    pub fn evaluate(&self, session: &Session) -> GuardDecision {
        if session.loading && session.user.is_none() {
            GuardDecision::Wait
        } else if session.user.is_none() {
            GuardDecision::Redirect {
                to: self.login_path.clone(),
            }
        } else {
            GuardDecision::Admit
        }
    }

    /// Decide for an arbitrary path; public paths are always admitted
    pub fn evaluate_path(&self, path: &str, session: &Session) -> GuardDecision {
        if self.is_public(path) {
            GuardDecision::Admit
        } else {
            self.evaluate(session)
        }
    }
}

/// Strip query, fragment and trailing slash
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::profile;

    fn guard() -> RouteGuard {
        RouteGuard::new("/login")
    }

    #[test]
    fn test_loading_waits() {
        let session = Session::unresolved(Some("abc".to_string()));
        assert_eq!(guard().evaluate(&session), GuardDecision::Wait);
    }

    #[test]
    fn test_anonymous_redirects_to_login() {
        assert_eq!(
            guard().evaluate(&Session::anonymous()),
            GuardDecision::Redirect {
                to: "/login".to_string()
            }
        );
    }

    #[test]
    fn test_authenticated_is_admitted() {
        let session = Session::authenticated("abc".to_string(), profile(1, "Admin"));
        assert!(guard().evaluate(&session).is_admitted());
    }

    #[test]
    fn test_login_in_flight_does_not_evict_signed_in_user() {
        let mut session = Session::authenticated("abc".to_string(), profile(1, "Admin"));
        session.loading = true;
        assert_eq!(guard().evaluate(&session), GuardDecision::Admit);
    }

    #[test]
    fn test_public_paths_always_admitted() {
        let guard = guard().with_public_path("/forgot-password");
        let session = Session::anonymous();

        assert!(guard.evaluate_path("/login", &session).is_admitted());
        assert!(guard.evaluate_path("/login/", &session).is_admitted());
        assert!(guard.evaluate_path("/login?next=/docs", &session).is_admitted());
        assert!(guard.evaluate_path("/forgot-password", &session).is_admitted());
        assert!(!guard.evaluate_path("/documents", &session).is_admitted());
    }

    #[test]
    fn test_redirect_discards_destination() {
        let decision = guard().evaluate_path("/documents/42", &Session::anonymous());
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/login".to_string()
            }
        );
    }

    #[test]
    fn test_from_config() {
        let mut config = ClientConfig::default();
        config.login_path = "/signin".to_string();
        config.public_paths = vec!["/help".to_string()];

        let guard = RouteGuard::from_config(&config);
        assert_eq!(guard.login_path(), "/signin");
        assert!(guard.is_public("/signin"));
        assert!(guard.is_public("/help"));
        assert!(!guard.is_public("/login"));
    }

    #[test]
    fn test_root_path_normalization() {
        let guard = guard().with_public_path("/");
        assert!(guard.is_public("/"));
        assert!(guard.is_public("/#top"));
    }
}
