//! File-backed cookie jar.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cookie::{cookie_header, Cookie};
use crate::jar::{apply_set, CookieJar};
use consentkit_core::{Clock, Error, Result, SystemClock};

/// Jar persisted as a JSON array of cookies.
///
/// Every change rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written jar behind.
pub struct FileCookieJar {
    path: PathBuf,
    cookies: RwLock<Vec<Cookie>>,
    clock: Arc<dyn Clock>,
}

impl FileCookieJar {
    /// Open the jar at `path` on the wall clock.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    /// Open the jar at `path`. A missing or unreadable file is an empty jar.
    pub fn open_with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Self {
        let path = path.as_ref().to_path_buf();
        let cookies = load_cookies(&path);
        debug!("FileCookieJar: {} cookies loaded from {}", cookies.len(), path.display());

        Self {
            path,
            cookies: RwLock::new(cookies),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, cookies: &[Cookie]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(cookies)?;
        let tmp = tmp_path(&self.path);
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Storage(format!("replace {}: {e}", self.path.display())))
    }
}

/// Sibling of `path` with `.tmp` appended to the full file name.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn load_cookies(path: &Path) -> Vec<Cookie> {
    let Ok(data) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str(&data) {
        Ok(cookies) => cookies,
        Err(e) => {
            warn!("Ignoring unreadable cookie jar {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

impl CookieJar for FileCookieJar {
    fn header(&self) -> Result<String> {
        let now = self.clock.now();
        let cookies = self.cookies.read();
        Ok(cookie_header(cookies.iter().filter(|c| c.is_live(now))))
    }

    fn set(&self, cookie: Cookie) -> Result<()> {
        let now = self.clock.now();
        let mut cookies = self.cookies.write();
        let mut updated = cookies.clone();
        if apply_set(&mut updated, cookie, now) {
            // Only publish the new state once it is on disk.
            self.save(&updated)?;
            *cookies = updated;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");

        let jar = FileCookieJar::open(&path);
        jar.set(Cookie::new("prefs", "%7B%7D").with_expires(Utc::now() + Duration::days(1)))
            .unwrap();
        drop(jar);

        let reopened = FileCookieJar::open(&path);
        assert_eq!(reopened.header().unwrap(), "prefs=%7B%7D");
    }

    #[test]
    fn test_delete_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");

        let jar = FileCookieJar::open(&path);
        jar.set(Cookie::new("prefs", "x")).unwrap();
        jar.set(Cookie::expired("prefs", "/")).unwrap();

        let reopened = FileCookieJar::open(&path);
        assert_eq!(reopened.header().unwrap(), "");
    }

    #[test]
    fn test_corrupt_file_is_empty_jar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "not json at all").unwrap();

        let jar = FileCookieJar::open(&path);
        assert_eq!(jar.header().unwrap(), "");

        // Writing replaces the corrupt file.
        jar.set(Cookie::new("a", "1")).unwrap();
        assert_eq!(FileCookieJar::open(&path).header().unwrap(), "a=1");
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/state/cookies.json");
        let jar = FileCookieJar::open(&path);
        jar.set(Cookie::new("a", "1")).unwrap();
        assert!(path.exists());
        assert_eq!(jar.path(), path.as_path());
    }

    #[test]
    fn test_tmp_path_never_aliases_jar_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            tmp_path(&dir.path().join("cookies.json")),
            dir.path().join("cookies.json.tmp")
        );
        assert_eq!(
            tmp_path(&dir.path().join("cookies.tmp")),
            dir.path().join("cookies.tmp.tmp")
        );

        let path = dir.path().join("cookies.tmp");
        let jar = FileCookieJar::open(&path);
        jar.set(Cookie::new("a", "1")).unwrap();
        assert!(!dir.path().join("cookies.tmp.tmp").exists());
        assert_eq!(FileCookieJar::open(&path).header().unwrap(), "a=1");
    }

    #[test]
    fn test_write_failure_leaves_state_unchanged() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes every save fail.
        let path = dir.path().join("cookies.json");
        std::fs::create_dir_all(&path).unwrap();

        let jar = FileCookieJar::open(&path);
        assert!(jar.set(Cookie::new("a", "1")).is_err());
        assert_eq!(jar.header().unwrap(), "");
    }
}
