//! consentkit store — the cookie-shaped durable slot.
//!
//! A jar holds name/value entries with a path, an optional expiry and the
//! transport attributes a browser would honour. Expired entries are never
//! readable, and writing an already-expired cookie deletes the entry, which
//! is how a browser's `document.cookie` behaves.

pub mod cookie;
pub mod file;
pub mod in_memory;
pub mod jar;

pub use cookie::{cookie_header, find_cookie, Cookie};
pub use file::FileCookieJar;
pub use in_memory::InMemoryCookieJar;
pub use jar::CookieJar;
