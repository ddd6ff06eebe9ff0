//! Style variables derived from branding settings

use super::types::BrandingSettings;
use std::collections::BTreeMap;
use std::fmt;

pub const VAR_PRIMARY_COLOR: &str = "--primary-color";
pub const VAR_SECONDARY_COLOR: &str = "--secondary-color";
pub const VAR_ACCENT_COLOR: &str = "--accent-color";
pub const VAR_BACKGROUND_COLOR: &str = "--background-color";
pub const VAR_FONT_FAMILY: &str = "--font-family";
pub const VAR_BRAND_GRADIENT: &str = "--brand-gradient";
pub const VAR_COMPANY_NAME: &str = "--company-name";

/// Where the currently applied settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSource {
    /// Hardcoded defaults
    Default,
    /// Optimistic read of the local cache
    Cache,
    /// Confirmed by the backend
    Network,
    /// Unsaved editor preview
    Preview,
}

impl fmt::Display for ThemeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeSource::Default => write!(f, "default"),
            ThemeSource::Cache => write!(f, "cache"),
            ThemeSource::Network => write!(f, "network"),
            ThemeSource::Preview => write!(f, "preview"),
        }
    }
}

/// A complete, applied theme: normalized settings plus every style variable
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTheme {
    pub settings: BrandingSettings,
    pub variables: BTreeMap<&'static str, String>,
    pub source: ThemeSource,
}

impl AppliedTheme {
    /// Normalize `settings` and derive the variables
    pub fn from_settings(settings: &BrandingSettings, source: ThemeSource) -> Self {
        let settings = settings.normalized();
        let variables = style_variables(&settings);
        Self {
            settings,
            variables,
            source,
        }
    }

    pub fn defaults() -> Self {
        Self::from_settings(&BrandingSettings::default(), ThemeSource::Default)
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Render a `:root` block followed by the tenant's custom CSS
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in &self.variables {
            css.push_str(&format!("  {}: {};\n", name, value));
        }
        css.push_str("}\n");

        let custom = self.settings.custom_css.trim();
        if !custom.is_empty() {
            css.push('\n');
            css.push_str(custom);
            css.push('\n');
        }
        css
    }
}

/// Map settings to style variables. Expects normalized settings.
fn style_variables(settings: &BrandingSettings) -> BTreeMap<&'static str, String> {
    let gradient = if settings.enable_gradients {
        format!(
            "linear-gradient(135deg, {}, {})",
            settings.primary_color, settings.accent_color
        )
    } else {
        "none".to_string()
    };

    BTreeMap::from([
        (VAR_PRIMARY_COLOR, settings.primary_color.clone()),
        (VAR_SECONDARY_COLOR, settings.secondary_color.clone()),
        (VAR_ACCENT_COLOR, settings.accent_color.clone()),
        (VAR_BACKGROUND_COLOR, settings.background_color.clone()),
        (VAR_FONT_FAMILY, settings.font_family.clone()),
        (VAR_BRAND_GRADIENT, gradient),
        (VAR_COMPANY_NAME, css_string(&settings.company_name)),
    ])
}

/// Quote a value as a CSS string literal
fn css_string(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', " ");
    format!("\"{}\"", escaped)
}
