//! The persisted consent record and its cookie-value codec.
//!
//! A record is JSON, percent-encoded so the jar's `;` and `=` delimiters can
//! never appear in the value:
//!
//! ```text
//! {"preferences":{"necessary":true,...},"consentDate":"...","consentId":"...","schemaVersion":1}
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::preferences::CategorySet;
use consentkit_core::{Error, Result};

/// Newest record layout this crate writes and understands.
pub const SCHEMA_VERSION: u32 = 1;

/// A saved consent decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub preferences: CategorySet,
    /// RFC 3339 UTC timestamp of the save.
    #[serde(rename = "consentDate")]
    pub consent_date: String,
    /// Fresh for every save.
    #[serde(rename = "consentId")]
    pub consent_id: String,
    /// Records written before versioning carry no version and read as 1.
    #[serde(rename = "schemaVersion", default = "first_version")]
    pub schema_version: u32,
}

fn first_version() -> u32 {
    1
}

impl ConsentRecord {
    /// Stamp `preferences` with a consent date of `now` and a new ID.
    pub fn new(preferences: CategorySet, now: DateTime<Utc>) -> Self {
        Self {
            preferences,
            consent_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            consent_id: generate_consent_id(now),
            schema_version: SCHEMA_VERSION,
        }
    }

    /// Parsed consent date, if the stored string is a valid timestamp.
    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.consent_date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    /// Serialize to a cookie-safe value.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(urlencoding::encode(&json).into_owned())
    }

    /// Parse a cookie value written by [`ConsentRecord::encode`].
    pub fn decode(raw: &str) -> Result<Self> {
        let json = urlencoding::decode(raw)
            .map_err(|e| Error::Decode(format!("percent-decoding: {e}")))?;
        let record: ConsentRecord = serde_json::from_str(&json)?;
        if record.schema_version > SCHEMA_VERSION {
            return Err(Error::Decode(format!(
                "unsupported schema version {}",
                record.schema_version
            )));
        }
        Ok(record)
    }
}

/// `consent_<unix millis>_<9 lowercase alphanumerics>`.
pub fn generate_consent_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("consent_{}_{}", now.timestamp_millis(), &suffix[..9])
}
