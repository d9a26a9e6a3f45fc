//! Policy application — turning preferences into integration toggles.
//!
//! The host supplies an [`Integrations`] implementation that talks to the
//! real analytics, performance, functional and advertising hooks. The
//! applier only decides which calls to make; it keeps no state, so the
//! "already bootstrapped" question is answered by the integration itself.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::preferences::CategorySet;

/// Engagement event recorded when a visitor makes a consent choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsentEvent {
    pub action: &'static str,
    pub category: &'static str,
    pub label: &'static str,
}

impl ConsentEvent {
    pub fn accept_all() -> Self {
        Self {
            action: "cookie_consent",
            category: "engagement",
            label: "accept_all",
        }
    }

    pub fn custom_preferences() -> Self {
        Self {
            action: "cookie_consent",
            category: "engagement",
            label: "custom_preferences",
        }
    }
}

/// Host-side integration hooks, one group per consent category.
///
/// Every toggle must be safe to call repeatedly with the same value.
pub trait Integrations: Send + Sync {
    /// Whether the analytics script has been loaded for this page lifetime.
    fn analytics_loaded(&self) -> bool;

    /// Load the analytics script. Fire-and-forget: load failures belong to
    /// the integration and are never reported back.
    fn load_analytics(&self);

    /// Grant or deny analytics storage.
    fn set_analytics_consent(&self, granted: bool);

    fn set_performance(&self, enabled: bool);

    fn set_functional(&self, enabled: bool);

    fn set_advertising(&self, enabled: bool);

    /// Report a consent choice through analytics. Only called when analytics
    /// is loaded.
    fn track_event(&self, _event: &ConsentEvent) {}
}

/// Apply `prefs` to the host's integrations.
///
/// Categories are independent. Applying the same set twice has the same
/// observable result as applying it once: the analytics script is loaded at
/// most once and every other call sets a state rather than emitting one.
pub fn apply_preferences(integrations: &dyn Integrations, prefs: &CategorySet) {
    if prefs.analytics {
        if !integrations.analytics_loaded() {
            integrations.load_analytics();
        }
        integrations.set_analytics_consent(true);
    } else {
        integrations.set_analytics_consent(false);
    }

    integrations.set_performance(prefs.performance);
    integrations.set_functional(prefs.functional);
    integrations.set_advertising(prefs.advertising);

    debug!(
        "Consent applied: analytics={} performance={} functional={} advertising={}",
        prefs.analytics, prefs.performance, prefs.functional, prefs.advertising
    );
}

// ---------------------------------------------------------------
// Provided integrations
// ---------------------------------------------------------------

/// Integrations that do nothing. Analytics never reports itself loaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIntegrations;

impl Integrations for NoopIntegrations {
    fn analytics_loaded(&self) -> bool {
        false
    }
    fn load_analytics(&self) {}
    fn set_analytics_consent(&self, _granted: bool) {}
    fn set_performance(&self, _enabled: bool) {}
    fn set_functional(&self, _enabled: bool) {}
    fn set_advertising(&self, _enabled: bool) {}
}

/// Integrations that log each toggle through `tracing`.
///
/// Only changes are logged: the analytics bootstrap once, and a toggle only
/// when its value differs from the last one seen. `apply_preferences` grants
/// analytics on every application, so a second `initialize()` logs nothing.
#[derive(Debug)]
pub struct LoggingIntegrations {
    measurement_id: String,
    toggles: Mutex<LoggedToggles>,
}

#[derive(Debug, Default)]
struct LoggedToggles {
    analytics_loaded: bool,
    analytics_granted: Option<bool>,
    performance: Option<bool>,
    functional: Option<bool>,
    advertising: Option<bool>,
}

impl LoggingIntegrations {
    pub fn new(measurement_id: impl Into<String>) -> Self {
        Self {
            measurement_id: measurement_id.into(),
            toggles: Mutex::new(LoggedToggles::default()),
        }
    }

    /// Last analytics consent signalled, if any.
    pub fn analytics_granted(&self) -> Option<bool> {
        self.toggles.lock().analytics_granted
    }

    /// Store `value` in the chosen slot. Returns true if it changed.
    fn changed(&self, slot: fn(&mut LoggedToggles) -> &mut Option<bool>, value: bool) -> bool {
        let mut toggles = self.toggles.lock();
        let slot = slot(&mut *toggles);
        let changed = *slot != Some(value);
        *slot = Some(value);
        changed
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

impl Integrations for LoggingIntegrations {
    fn analytics_loaded(&self) -> bool {
        self.toggles.lock().analytics_loaded
    }

    fn load_analytics(&self) {
        self.toggles.lock().analytics_loaded = true;
        info!("Analytics loaded (measurement id {}, anonymized IP)", self.measurement_id);
    }

    fn set_analytics_consent(&self, granted: bool) {
        if self.changed(|t| &mut t.analytics_granted, granted) {
            info!(
                "Analytics storage {}",
                if granted { "granted" } else { "denied" }
            );
        }
    }

    fn set_performance(&self, enabled: bool) {
        if self.changed(|t| &mut t.performance, enabled) {
            info!("Performance monitoring {}", on_off(enabled));
        }
    }

    fn set_functional(&self, enabled: bool) {
        if self.changed(|t| &mut t.functional, enabled) {
            info!("Functional features {}", on_off(enabled));
        }
    }

    fn set_advertising(&self, enabled: bool) {
        if self.changed(|t| &mut t.advertising, enabled) {
            info!("Advertising cookies {}", on_off(enabled));
        }
    }

    fn track_event(&self, event: &ConsentEvent) {
        info!("Analytics event {} ({}: {})", event.action, event.category, event.label);
    }
}

/// End state of every integration, as seen by [`RecordingIntegrations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationState {
    /// `None` until analytics consent has been signalled.
    pub analytics_granted: Option<bool>,
    pub performance: Option<bool>,
    pub functional: Option<bool>,
    pub advertising: Option<bool>,
    /// How many times the analytics script was loaded.
    pub analytics_loads: usize,
    pub events: Vec<ConsentEvent>,
}

/// Integrations that remember what was asked of them.
#[derive(Debug, Default)]
pub struct RecordingIntegrations {
    state: Mutex<IntegrationState>,
    calls: Mutex<usize>,
}

impl RecordingIntegrations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> IntegrationState {
        self.state.lock().clone()
    }

    /// Total number of hook invocations, reads excluded.
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }

    fn record(&self, f: impl FnOnce(&mut IntegrationState)) {
        f(&mut *self.state.lock());
        *self.calls.lock() += 1;
    }
}

impl Integrations for RecordingIntegrations {
    fn analytics_loaded(&self) -> bool {
        self.state.lock().analytics_loads > 0
    }

    fn load_analytics(&self) {
        self.record(|s| s.analytics_loads += 1);
    }

    fn set_analytics_consent(&self, granted: bool) {
        self.record(|s| s.analytics_granted = Some(granted));
    }

    fn set_performance(&self, enabled: bool) {
        self.record(|s| s.performance = Some(enabled));
    }

    fn set_functional(&self, enabled: bool) {
        self.record(|s| s.functional = Some(enabled));
    }

    fn set_advertising(&self, enabled: bool) {
        self.record(|s| s.advertising = Some(enabled));
    }

    fn track_event(&self, event: &ConsentEvent) {
        let event = event.clone();
        self.record(|s| s.events.push(event));
    }
}
