//! Shell command handlers
//!
//! Each handler returns a serializable response or a user-facing error string.

use pulseone_core::auth::{GuardDecision, Session};
use pulseone_core::branding::{AppliedTheme, BrandingSettings};
use pulseone_core::{AppContext, LoginOutcome};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Serialize, PartialEq)]
pub struct AuthStateResponse {
    pub state: String,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub error: Option<String>,
}

pub fn map_session(session: &Session) -> AuthStateResponse {
    let user = session.user.as_ref();
    AuthStateResponse {
        state: session.state().to_string(),
        user_id: user.map(|u| u.id.to_string()),
        name: user.map(|u| u.display_name().to_string()),
        email: user.map(|u| u.email.clone()).filter(|e| !e.is_empty()),
        error: session.error.clone(),
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct NavigationResponse {
    pub path: String,
    pub decision: String,
    pub redirect_to: Option<String>,
}

pub fn map_decision(path: &str, decision: GuardDecision) -> NavigationResponse {
    match decision {
        GuardDecision::Admit => NavigationResponse {
            path: path.to_string(),
            decision: "admit".to_string(),
            redirect_to: None,
        },
        GuardDecision::Wait => NavigationResponse {
            path: path.to_string(),
            decision: "wait".to_string(),
            redirect_to: None,
        },
        GuardDecision::Redirect { to } => NavigationResponse {
            path: path.to_string(),
            decision: "redirect".to_string(),
            redirect_to: Some(to),
        },
    }
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub source: String,
    pub settings: BrandingSettings,
    pub variables: BTreeMap<String, String>,
}

pub fn map_theme(theme: &AppliedTheme) -> ThemeResponse {
    ThemeResponse {
        source: theme.source.to_string(),
        settings: theme.settings.clone(),
        variables: theme
            .variables
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub error: Option<String>,
    pub session: AuthStateResponse,
}

pub fn status(app: &AppContext) -> Result<AuthStateResponse, String> {
    Ok(map_session(&app.session().snapshot()))
}

pub async fn login(app: &AppContext, email: &str, password: &str) -> Result<LoginResponse, String> {
    let outcome = app.login(email, password).await;
    let session = map_session(&app.session().snapshot());
    match outcome {
        LoginOutcome::Success => Ok(LoginResponse {
            success: true,
            error: None,
            session,
        }),
        LoginOutcome::Failed { error } => Ok(LoginResponse {
            success: false,
            error: Some(error),
            session,
        }),
    }
}

pub fn logout(app: &AppContext) -> Result<NavigationResponse, String> {
    let login_path = app.logout();
    Ok(map_decision(&login_path, app.navigate(&login_path)))
}

pub fn visit(app: &AppContext, path: &str) -> Result<NavigationResponse, String> {
    Ok(map_decision(path, app.navigate(path)))
}

pub fn branding_show(app: &AppContext) -> Result<ThemeResponse, String> {
    Ok(map_theme(&app.branding().current()))
}

pub fn branding_css(app: &AppContext) -> Result<String, String> {
    Ok(app.branding().current().to_css())
}

/// Read a settings file for `branding save`
pub fn read_settings_file(path: &Path) -> Result<BrandingSettings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    BrandingSettings::from_json(&content).map_err(|e| format!("Invalid settings JSON: {}", e))
}

pub async fn branding_save(app: &AppContext, path: &Path) -> Result<ThemeResponse, String> {
    require_session(app)?;
    let settings = read_settings_file(path)?;
    app.branding()
        .save(&settings, &app.scope())
        .await
        .map_err(|e| e.to_string())?;
    Ok(map_theme(&app.branding().current()))
}

pub async fn branding_reset(app: &AppContext) -> Result<ThemeResponse, String> {
    require_session(app)?;
    app.branding()
        .reset(&app.scope())
        .await
        .map_err(|e| e.to_string())?;
    Ok(map_theme(&app.branding().current()))
}

/// The settings editor sits behind the guard like any other page
fn require_session(app: &AppContext) -> Result<(), String> {
    match app.navigate("/settings/branding") {
        GuardDecision::Admit => Ok(()),
        GuardDecision::Wait => Err("Session check has not finished".to_string()),
        GuardDecision::Redirect { to } => Err(format!("Not signed in. Log in at {}", to)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulseone_core::branding::types::DEFAULT_SECONDARY_COLOR;

    fn user_session() -> Session {
        let user = serde_json::from_str(r#"{"id": 1, "name": "Admin"}"#).unwrap();
        Session::authenticated("abc".to_string(), user)
    }

    #[test]
    fn test_map_authenticated_session() {
        let response = map_session(&user_session());
        assert_eq!(response.state, "authenticated");
        assert_eq!(response.user_id.as_deref(), Some("1"));
        assert_eq!(response.name.as_deref(), Some("Admin"));
        assert_eq!(response.email, None);
    }

    #[test]
    fn test_map_anonymous_session_with_error() {
        let mut session = Session::anonymous();
        session.error = Some("Invalid email or password".to_string());

        let response = map_session(&session);
        assert_eq!(response.state, "anonymous");
        assert!(response.user_id.is_none());
        assert_eq!(response.error.as_deref(), Some("Invalid email or password"));
    }

    #[test]
    fn test_map_decision() {
        let response = map_decision(
            "/documents",
            GuardDecision::Redirect {
                to: "/login".to_string(),
            },
        );
        assert_eq!(response.decision, "redirect");
        assert_eq!(response.redirect_to.as_deref(), Some("/login"));

        assert_eq!(map_decision("/", GuardDecision::Wait).decision, "wait");
    }

    #[test]
    fn test_map_theme_variables() {
        let response = map_theme(&AppliedTheme::defaults());
        assert_eq!(response.source, "default");
        assert_eq!(
            response.variables.get("--secondary-color").map(String::as_str),
            Some(DEFAULT_SECONDARY_COLOR)
        );
    }

    #[test]
    fn test_read_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("branding.json");
        std::fs::write(&path, r##"{"companyName": "Acme HR", "accentColor": "#10b981"}"##).unwrap();

        let settings = read_settings_file(&path).unwrap();
        assert_eq!(settings.company_name, "Acme HR");
        assert_eq!(settings.accent_color, "#10b981");

        assert!(read_settings_file(&dir.path().join("missing.json")).is_err());
    }
}
