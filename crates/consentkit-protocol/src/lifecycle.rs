//! Consent lifecycle — the decisions a visitor can make.
//!
//! ```text
//! UNDECIDED --accept_all / reject_all / save_custom--> DECIDED
//! DECIDED   --save_custom-->                           DECIDED (record replaced)
//! DECIDED   --reset-->                                 UNDECIDED
//! ```
//!
//! Expiry of the stored record also returns to UNDECIDED; the jar enforces
//! it, so a lapsed record simply stops being readable.

use tracing::info;

use crate::policy::ConsentEvent;
use crate::preferences::CategorySet;
use crate::record::ConsentRecord;
use crate::store::ConsentStore;

/// Where the visitor stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentState {
    Undecided,
    Decided(ConsentRecord),
}

impl ConsentState {
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Decided(_))
    }
}

/// Lifecycle operations over a [`ConsentStore`].
pub struct ConsentManager {
    store: ConsentStore,
}

impl ConsentManager {
    pub fn new(store: ConsentStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ConsentStore {
        &self.store
    }

    /// Re-apply any saved decision. Call once from the host's startup.
    pub fn initialize(&self) {
        self.store.initialize();
    }

    pub fn state(&self) -> ConsentState {
        match self.store.get_record() {
            Some(record) => ConsentState::Decided(record),
            None => ConsentState::Undecided,
        }
    }

    /// Grant every category.
    pub fn accept_all(&self) -> ConsentRecord {
        let record = self.store.save_preferences(CategorySet::all_granted());
        self.track(ConsentEvent::accept_all());
        info!("Consent decision: accept all");
        record
    }

    /// Grant only the required category.
    pub fn reject_all(&self) -> ConsentRecord {
        let record = self.store.save_preferences(CategorySet::necessary_only());
        info!("Consent decision: reject all");
        record
    }

    /// Save a caller-chosen set, replacing any earlier decision outright.
    pub fn save_custom(&self, prefs: CategorySet) -> ConsentRecord {
        let record = self.store.save_preferences(prefs);
        if prefs.analytics {
            self.track(ConsentEvent::custom_preferences());
        }
        info!("Consent decision: custom preferences");
        record
    }

    /// Revoke the saved decision and return to UNDECIDED.
    pub fn reset(&self) {
        self.store.clear_preferences();
        info!("Consent decision reset");
    }

    fn track(&self, event: ConsentEvent) {
        let integrations = self.store.integrations();
        if integrations.analytics_loaded() {
            integrations.track_event(&event);
        }
    }
}
