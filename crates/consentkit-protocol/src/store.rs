//! Consent store — the single owner of the persisted consent record.
//!
//! Nothing here fails past its own boundary. A record that cannot be read or
//! decoded is treated as "no consent yet"; a record that cannot be written is
//! logged and the preferences are still applied, so the visitor gets the
//! behaviour they chose for this page lifetime and is asked again next time.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::policy::{apply_preferences, Integrations};
use crate::preferences::CategorySet;
use crate::record::ConsentRecord;
use consentkit_core::{Clock, ConsentConfig, Error, Result, SystemClock};
use consentkit_store::{find_cookie, Cookie, CookieJar};

/// Reads, writes and applies the visitor's consent decision.
pub struct ConsentStore {
    jar: Arc<dyn CookieJar>,
    integrations: Arc<dyn Integrations>,
    clock: Arc<dyn Clock>,
    config: ConsentConfig,
}

impl ConsentStore {
    /// Create a store with default configuration on the wall clock.
    pub fn new(jar: Arc<dyn CookieJar>, integrations: Arc<dyn Integrations>) -> Self {
        Self {
            jar,
            integrations,
            clock: Arc::new(SystemClock),
            config: ConsentConfig::default(),
        }
    }

    /// Use `config` as given. It is not validated here; hosts should build it
    /// through [`ConsentConfig::from_env`] or call [`ConsentConfig::validate`].
    /// An out-of-range expiry makes every save fail to persist.
    pub fn with_config(mut self, config: ConsentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    pub fn integrations(&self) -> &dyn Integrations {
        self.integrations.as_ref()
    }

    /// Full saved record, or `None` if absent, expired or unreadable.
    pub fn get_record(&self) -> Option<ConsentRecord> {
        let header = match self.jar.header() {
            Ok(header) => header,
            Err(e) => {
                warn!("Error reading cookie preferences: {}", e);
                return None;
            }
        };

        let raw = find_cookie(&header, &self.config.cookie_name)?;
        match ConsentRecord::decode(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Error parsing cookie data, treating as no consent: {}", e);
                None
            }
        }
    }

    /// Saved preferences, or `None` before the visitor has decided.
    pub fn get_preferences(&self) -> Option<CategorySet> {
        self.get_record().map(|record| record.preferences)
    }

    pub fn has_consent(&self) -> bool {
        self.get_preferences().is_some()
    }

    /// Persist `prefs` as a new record and apply them immediately.
    ///
    /// The write happens first. If it fails the preferences are applied
    /// anyway; the returned record is what would have been stored.
    pub fn save_preferences(&self, prefs: CategorySet) -> ConsentRecord {
        let now = self.clock.now();
        let record = ConsentRecord::new(prefs, now);

        match self.write_record(&record, now) {
            Ok(()) => info!(
                "Cookie preferences saved: {} ({})",
                granted_keys(&prefs),
                record.consent_id
            ),
            Err(e) => error!("Error saving cookie preferences: {}", e),
        }

        apply_preferences(self.integrations.as_ref(), &prefs);
        record
    }

    fn write_record(&self, record: &ConsentRecord, now: chrono::DateTime<chrono::Utc>) -> Result<()> {
        let expires = now.checked_add_signed(self.config.retention()).ok_or_else(|| {
            Error::Config(format!(
                "expiry of {} days is out of range",
                self.config.expiry_days
            ))
        })?;
        let cookie = Cookie::new(self.config.cookie_name.clone(), record.encode()?)
            .with_path(self.config.path.clone())
            .with_expires(expires)
            .with_same_site(self.config.same_site)
            .with_secure(self.config.secure);
        debug!("Writing consent cookie: {}", cookie);
        self.jar.set(cookie)
    }

    /// Delete the saved record. Integrations are left as they are.
    pub fn clear_preferences(&self) {
        let cookie = Cookie::expired(self.config.cookie_name.clone(), self.config.path.clone());
        match self.jar.set(cookie) {
            Ok(()) => info!("Cookie preferences cleared"),
            Err(e) => error!("Error clearing cookie preferences: {}", e),
        }
    }

    /// Re-apply saved preferences at startup. Does nothing without a record.
    ///
    /// Safe to call any number of times.
    pub fn initialize(&self) {
        if let Some(prefs) = self.get_preferences() {
            debug!("Re-applying saved cookie preferences");
            apply_preferences(self.integrations.as_ref(), &prefs);
        }
    }
}

fn granted_keys(prefs: &CategorySet) -> String {
    prefs.granted().map(|c| c.key()).collect::<Vec<_>>().join(",")
}
