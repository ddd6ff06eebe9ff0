//! Branding module
//!
//! Resolves a tenant's visual identity (cache first, network second) and
//! maps it onto global style variables.

mod resolver;
pub mod style;
pub mod types;

pub use resolver::{BrandingError, BrandingResolver};
pub use style::{AppliedTheme, ThemeSource};
pub use types::BrandingSettings;
