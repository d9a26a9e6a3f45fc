//! consentkit core — error type, consent configuration, clock.

pub mod clock;
pub mod config;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConsentConfig, SameSite, MAX_EXPIRY_DAYS};
pub use error::{Error, Result};
