//! Branding settings model

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const DEFAULT_COMPANY_NAME: &str = "Pulse One";
pub const DEFAULT_PRIMARY_COLOR: &str = "#1f2937";
pub const DEFAULT_SECONDARY_COLOR: &str = "#374151";
pub const DEFAULT_ACCENT_COLOR: &str = "#3b82f6";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#f9fafb";
pub const DEFAULT_FONT_FAMILY: &str = "Inter, system-ui, sans-serif";

/// Voice used by assistant-facing copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationTone {
    #[default]
    Professional,
    Friendly,
    Casual,
    Authoritative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormalityLevel {
    #[default]
    Formal,
    SemiFormal,
    Informal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    #[default]
    Helpful,
    Concise,
    Enthusiastic,
    Empathetic,
}

impl fmt::Display for CommunicationTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommunicationTone::Professional => "professional",
            CommunicationTone::Friendly => "friendly",
            CommunicationTone::Casual => "casual",
            CommunicationTone::Authoritative => "authoritative",
        };
        f.write_str(name)
    }
}

impl fmt::Display for FormalityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormalityLevel::Formal => "formal",
            FormalityLevel::SemiFormal => "semi-formal",
            FormalityLevel::Informal => "informal",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Personality::Helpful => "helpful",
            Personality::Concise => "concise",
            Personality::Enthusiastic => "enthusiastic",
            Personality::Empathetic => "empathetic",
        };
        f.write_str(name)
    }
}

/// A tenant's visual identity.
///
/// Field names use serde rename to match the API's camelCase format. Every
/// field is optional on the wire: missing, `null` or malformed values decode
/// to their defaults so one bad field never discards the whole blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandingSettings {
    #[serde(deserialize_with = "lenient")]
    pub company_name: String,
    #[serde(deserialize_with = "lenient")]
    pub primary_color: String,
    #[serde(deserialize_with = "lenient")]
    pub secondary_color: String,
    #[serde(deserialize_with = "lenient")]
    pub accent_color: String,
    #[serde(deserialize_with = "lenient")]
    pub background_color: String,
    #[serde(deserialize_with = "lenient")]
    pub communication_tone: CommunicationTone,
    #[serde(deserialize_with = "lenient")]
    pub formality_level: FormalityLevel,
    #[serde(deserialize_with = "lenient")]
    pub personality: Personality,
    #[serde(deserialize_with = "lenient")]
    pub logo_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub favicon_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub font_family: String,
    #[serde(deserialize_with = "lenient_gradients")]
    pub enable_gradients: bool,
    #[serde(rename = "customCSS", deserialize_with = "lenient")]
    pub custom_css: String,
}

impl Default for BrandingSettings {
    fn default() -> Self {
        Self {
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            communication_tone: CommunicationTone::default(),
            formality_level: FormalityLevel::default(),
            personality: Personality::default(),
            logo_url: None,
            favicon_url: None,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            enable_gradients: true,
            custom_css: String::new(),
        }
    }
}

impl BrandingSettings {
    /// Parse a cached or received JSON blob
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Copy with every blank or invalid field replaced by its default
    pub fn normalized(&self) -> Self {
        Self {
            company_name: or_default(&self.company_name, DEFAULT_COMPANY_NAME),
            primary_color: color_or_default(&self.primary_color, DEFAULT_PRIMARY_COLOR),
            secondary_color: color_or_default(&self.secondary_color, DEFAULT_SECONDARY_COLOR),
            accent_color: color_or_default(&self.accent_color, DEFAULT_ACCENT_COLOR),
            background_color: color_or_default(&self.background_color, DEFAULT_BACKGROUND_COLOR),
            communication_tone: self.communication_tone,
            formality_level: self.formality_level,
            personality: self.personality,
            logo_url: non_blank(&self.logo_url),
            favicon_url: non_blank(&self.favicon_url),
            font_family: or_default(&self.font_family, DEFAULT_FONT_FAMILY),
            enable_gradients: self.enable_gradients,
            custom_css: self.custom_css.clone(),
        }
    }
}

fn or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

fn color_or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if is_css_color(trimmed) {
        trimmed.to_string()
    } else {
        default.to_string()
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

const COLOR_FUNCTIONS: &[&str] = &[
    "rgb", "rgba", "hsl", "hsla", "hwb", "lab", "lch", "oklab", "oklch", "color", "color-mix",
    "light-dark", "var",
];

/// Accepts hex colors, CSS color functions (`rgb(...)`, `oklch(...)`,
/// `var(...)` and friends) and named colors. Anything that could break out of
/// a declaration is rejected.
pub fn is_css_color(value: &str) -> bool {
    if value.is_empty() || value.contains([';', '{', '}', '<', '>']) {
        return false;
    }

    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    if let Some(open) = value.find('(') {
        let function = &value[..open];
        return COLOR_FUNCTIONS.contains(&function.trim()) && value.ends_with(')');
    }

    value.chars().all(|c| c.is_ascii_alphabetic())
}

/// Decode a field, falling back to its default on `null` or a type mismatch
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Gradients default to on, so `bool::default()` is the wrong fallback
fn lenient_gradients<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(true))
}
