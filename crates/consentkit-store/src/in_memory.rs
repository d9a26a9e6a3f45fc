//! In-memory cookie jar for tests and hosts without durable storage.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::cookie::{cookie_header, Cookie};
use crate::jar::{apply_set, CookieJar};
use consentkit_core::{Clock, Result, SystemClock};

/// Non-persistent jar. Expiry is evaluated against the injected clock.
pub struct InMemoryCookieJar {
    cookies: RwLock<Vec<Cookie>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCookieJar {
    /// Create an empty jar on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            cookies: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Number of live cookies.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.cookies.read().iter().filter(|c| c.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar for InMemoryCookieJar {
    fn header(&self) -> Result<String> {
        let now = self.clock.now();
        let cookies = self.cookies.read();
        Ok(cookie_header(cookies.iter().filter(|c| c.is_live(now))))
    }

    fn set(&self, cookie: Cookie) -> Result<()> {
        let now = self.clock.now();
        apply_set(&mut *self.cookies.write(), cookie, now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use consentkit_core::ManualClock;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_set_and_read_header() {
        let jar = InMemoryCookieJar::new();
        jar.set(Cookie::new("lang", "en")).unwrap();
        jar.set(Cookie::new("theme", "dark")).unwrap();
        assert_eq!(jar.header().unwrap(), "lang=en; theme=dark");
        assert_eq!(jar.len(), 2);
    }

    #[test]
    fn test_expiry_hides_cookie() {
        let clock = clock();
        let jar = InMemoryCookieJar::with_clock(clock.clone());
        let expires = clock.now() + Duration::days(365);
        jar.set(Cookie::new("prefs", "x").with_expires(expires)).unwrap();
        assert_eq!(jar.header().unwrap(), "prefs=x");

        clock.advance(Duration::days(364));
        assert!(!jar.is_empty());

        clock.advance(Duration::days(1));
        assert_eq!(jar.header().unwrap(), "");
        assert!(jar.is_empty());
    }

    #[test]
    fn test_expired_write_deletes() {
        let jar = InMemoryCookieJar::new();
        jar.set(Cookie::new("prefs", "x")).unwrap();
        jar.set(Cookie::expired("prefs", "/")).unwrap();
        assert!(jar.is_empty());
    }
}
