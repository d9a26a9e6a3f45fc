//! Cookie consent protocol — preferences, persisted record, policy
//! application and the consent lifecycle.
//!
//! A host builds one [`ConsentStore`] over its cookie jar and integration
//! hooks, wraps it in a [`ConsentManager`], and calls
//! [`ConsentManager::initialize`] once at startup so a returning visitor's
//! choices take effect without asking again.

pub mod lifecycle;
pub mod panel;
pub mod policy;
pub mod preferences;
pub mod record;
pub mod store;

pub use lifecycle::{ConsentManager, ConsentState};
pub use panel::ConsentPanel;
pub use policy::{
    apply_preferences, ConsentEvent, IntegrationState, Integrations, LoggingIntegrations,
    NoopIntegrations, RecordingIntegrations,
};
pub use preferences::{Category, CategorySet};
pub use record::{ConsentRecord, SCHEMA_VERSION};
pub use store::ConsentStore;
