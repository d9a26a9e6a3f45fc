//! The cookie jar abstraction.

use chrono::{DateTime, Utc};

use crate::cookie::Cookie;
use consentkit_core::Result;

/// A string-keyed store with per-entry expiry.
///
/// Implementations must be `Send + Sync`. Reads never return expired
/// entries; the jar, not its callers, enforces the TTL.
pub trait CookieJar: Send + Sync {
    /// Live cookies in `name=value; name=value` form.
    fn header(&self) -> Result<String>;

    /// Store `cookie`, replacing any entry with the same name and path.
    ///
    /// A cookie whose expiry is not after the jar's current time deletes the
    /// entry instead of storing it.
    fn set(&self, cookie: Cookie) -> Result<()>;
}

/// Apply a write to an in-memory cookie list with browser semantics.
///
/// Returns true if the list changed.
pub(crate) fn apply_set(cookies: &mut Vec<Cookie>, cookie: Cookie, now: DateTime<Utc>) -> bool {
    let len_before = cookies.len();
    cookies.retain(|c| c.is_live(now) && !(c.name == cookie.name && c.path == cookie.path));
    let removed = cookies.len() < len_before;

    if cookie.is_live(now) {
        cookies.push(cookie);
        true
    } else {
        removed
    }
}
