//! Consent cookie configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Browsers cap cookie lifetimes at 400 days.
pub const MAX_EXPIRY_DAYS: u32 = 400;

/// Cross-site policy attached to the consent cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Lax => write!(f, "Lax"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Where and how the consent record is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentConfig {
    /// Name of the durable slot (`dto_cookie_preferences`).
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Retention window of a saved record, in days.
    #[serde(default = "default_expiry_days")]
    pub expiry_days: u32,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_same_site")]
    pub same_site: SameSite,
    #[serde(default = "default_true")]
    pub secure: bool,
    /// Measurement ID handed to the analytics integration when it is bootstrapped.
    #[serde(default = "default_measurement_id")]
    pub analytics_measurement_id: String,
}

fn default_cookie_name() -> String {
    "dto_cookie_preferences".into()
}
fn default_expiry_days() -> u32 {
    365
}
fn default_path() -> String {
    "/".into()
}
fn default_same_site() -> SameSite {
    SameSite::Strict
}
fn default_true() -> bool {
    true
}
fn default_measurement_id() -> String {
    "GA_MEASUREMENT_ID".into()
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            expiry_days: default_expiry_days(),
            path: default_path(),
            same_site: default_same_site(),
            secure: true,
            analytics_measurement_id: default_measurement_id(),
        }
    }
}

impl ConsentConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("CONSENTKIT_COOKIE_NAME") {
            config.cookie_name = name;
        }
        if let Ok(days) = std::env::var("CONSENTKIT_EXPIRY_DAYS") {
            config.expiry_days = days
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid CONSENTKIT_EXPIRY_DAYS: {days}")))?;
        }
        if let Ok(id) = std::env::var("CONSENTKIT_MEASUREMENT_ID") {
            config.analytics_measurement_id = id;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the cookie jar cannot represent.
    pub fn validate(&self) -> Result<()> {
        if self.cookie_name.is_empty() {
            return Err(Error::Config("cookie name is empty".into()));
        }
        if self
            .cookie_name
            .chars()
            .any(|c| c == ';' || c == '=' || c == ',' || c.is_whitespace())
        {
            return Err(Error::Config(format!(
                "cookie name contains a delimiter: {:?}",
                self.cookie_name
            )));
        }
        if self.expiry_days == 0 || self.expiry_days > MAX_EXPIRY_DAYS {
            return Err(Error::Config(format!(
                "expiry_days must be between 1 and {MAX_EXPIRY_DAYS}, got {}",
                self.expiry_days
            )));
        }
        Ok(())
    }

    /// Retention window as a chrono duration.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.expiry_days))
    }
}
