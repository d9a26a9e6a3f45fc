//! Cookie entries and the `name=value; name=value` header form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consentkit_core::SameSite;

const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A single named entry in a cookie jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// `None` is a session cookie: it never expires on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
    #[serde(default)]
    pub secure: bool,
}

fn default_path() -> String {
    "/".into()
}

impl Cookie {
    /// Session cookie on the root path with no transport attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: default_path(),
            expires: None,
            same_site: None,
            secure: false,
        }
    }

    /// Cookie that deletes `name` on `path` when written to a jar.
    pub fn expired(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            path: path.into(),
            expires: Some(DateTime::UNIX_EPOCH),
            same_site: None,
            secure: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Whether the cookie is still readable at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(true, |at| at > now)
    }
}

/// Renders the assignment form a browser accepts through `document.cookie`.
impl std::fmt::Display for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(expires) = self.expires {
            write!(f, "; expires={}", expires.format(EXPIRES_FORMAT))?;
        }
        write!(f, "; path={}", self.path)?;
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={same_site}")?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        Ok(())
    }
}

/// Join cookies into a `name=value; name=value` header.
pub fn cookie_header<'a>(cookies: impl IntoIterator<Item = &'a Cookie>) -> String {
    cookies
        .into_iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw value of the first entry named exactly `name`.
///
/// The value is everything after the first `=`, so values that themselves
/// contain `=` survive intact.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim_start().split_once('=')?;
        (key == name).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_with_attributes() {
        let expires = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let cookie = Cookie::new("prefs", "abc%7B")
            .with_expires(expires)
            .with_same_site(SameSite::Strict)
            .with_secure(true);
        assert_eq!(
            cookie.to_string(),
            "prefs=abc%7B; expires=Sat, 01 Mar 2025 12:00:00 GMT; path=/; SameSite=Strict; Secure"
        );
    }

    #[test]
    fn test_expired_cookie_renders_epoch() {
        let cookie = Cookie::expired("prefs", "/");
        assert_eq!(
            cookie.to_string(),
            "prefs=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/"
        );
        assert!(!cookie.is_live(Utc::now()));
    }

    #[test]
    fn test_find_cookie_exact_name() {
        let header = "theme=dark; prefs_old=1; prefs=%7B%7D; lang=en";
        assert_eq!(find_cookie(header, "prefs"), Some("%7B%7D"));
        assert_eq!(find_cookie(header, "theme"), Some("dark"));
        assert_eq!(find_cookie(header, "pref"), None);
        assert_eq!(find_cookie("", "prefs"), None);
    }

    #[test]
    fn test_find_cookie_keeps_equals_in_value() {
        assert_eq!(find_cookie("token=a=b=c", "token"), Some("a=b=c"));
    }

    #[test]
    fn test_cookie_header_joins_pairs() {
        let cookies = vec![Cookie::new("a", "1"), Cookie::new("b", "2")];
        assert_eq!(cookie_header(&cookies), "a=1; b=2");
    }

    #[test]
    fn test_session_cookie_is_live() {
        assert!(Cookie::new("a", "1").is_live(Utc::now()));
    }
}
