//! End-to-end consent flows over a real cookie jar.
//!
//! Each test plays a visitor through the lifecycle and checks both the
//! persisted record and what the integrations were told to do.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use consentkit_core::ManualClock;
use consentkit_protocol::*;
use consentkit_store::{find_cookie, Cookie, CookieJar, FileCookieJar, InMemoryCookieJar};
use tempfile::TempDir;

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 11, 4, 15, 0, 0).unwrap(),
    ))
}

fn manager_over(
    jar: Arc<dyn CookieJar>,
    clock: Arc<ManualClock>,
) -> (ConsentManager, Arc<RecordingIntegrations>) {
    let integrations = Arc::new(RecordingIntegrations::new());
    let store = ConsentStore::new(jar, integrations.clone()).with_clock(clock);
    (ConsentManager::new(store), integrations)
}

#[test]
fn test_accept_customise_reset() {
    let clock = clock();
    let jar = Arc::new(InMemoryCookieJar::with_clock(clock.clone()));
    let (manager, integrations) = manager_over(jar.clone(), clock.clone());
    let store = manager.store();

    // First visit.
    assert!(!store.has_consent());

    manager.accept_all();
    assert!(store.has_consent());
    let prefs = store.get_preferences().unwrap();
    for category in Category::all() {
        assert!(prefs.get(*category), "{category} should be granted");
    }

    // Re-decide: only functional. The all-granted record is gone entirely.
    manager.save_custom(CategorySet::new(true, false, false, false));
    assert_eq!(
        store.get_preferences(),
        Some(CategorySet::new(true, false, false, false))
    );
    assert!(store.get_preferences().unwrap().necessary());
    assert_eq!(integrations.state().analytics_granted, Some(false));

    manager.reset();
    assert!(!store.has_consent());

    // Next page load performs no integration calls at all.
    let (next_load, next_integrations) = manager_over(jar, clock);
    next_load.initialize();
    assert_eq!(next_integrations.calls(), 0);
    assert_eq!(next_integrations.state(), IntegrationState::default());
}

#[test]
fn test_returning_visitor_across_restarts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cookies.json");
    let clock = clock();

    {
        let jar = Arc::new(FileCookieJar::open_with_clock(&path, clock.clone()));
        let (manager, _) = manager_over(jar, clock.clone());
        manager.save_custom(CategorySet::new(false, true, true, false));
    }

    clock.advance(Duration::days(30));
    let jar = Arc::new(FileCookieJar::open_with_clock(&path, clock.clone()));
    let (manager, integrations) = manager_over(jar, clock.clone());
    manager.initialize();
    manager.initialize();

    let state = integrations.state();
    assert_eq!(state.analytics_loads, 1);
    assert_eq!(state.analytics_granted, Some(true));
    assert_eq!(state.performance, Some(true));
    assert_eq!(state.functional, Some(false));
    assert_eq!(state.advertising, Some(false));
    assert!(state.events.is_empty());
}

#[test]
fn test_record_expires_after_a_year() {
    let clock = clock();
    let jar = Arc::new(InMemoryCookieJar::with_clock(clock.clone()));
    let (manager, _) = manager_over(jar.clone(), clock.clone());

    manager.reject_all();
    clock.advance(Duration::days(365));

    assert_eq!(manager.state(), ConsentState::Undecided);
    assert_eq!(jar.header().unwrap(), "");
}

#[test]
fn test_tampered_record_reverts_to_undecided() {
    let clock = clock();
    let jar = Arc::new(InMemoryCookieJar::with_clock(clock.clone()));
    let (manager, integrations) = manager_over(jar.clone(), clock);

    manager.accept_all();
    let loads = integrations.state().analytics_loads;

    jar.set(Cookie::new("dto_cookie_preferences", "%7Bnot-json")).unwrap();
    assert_eq!(manager.state(), ConsentState::Undecided);

    manager.initialize();
    assert_eq!(integrations.state().analytics_loads, loads);
}

#[test]
fn test_stored_necessary_false_reads_back_true() {
    let jar = Arc::new(InMemoryCookieJar::new());
    let json = r#"{"preferences":{"necessary":false,"functional":false,"analytics":false,"performance":false,"advertising":true},"consentDate":"2024-01-01T00:00:00.000Z","consentId":"consent_1_abcdefghi"}"#;
    jar.set(Cookie::new("dto_cookie_preferences", urlencoding::encode(json).into_owned()))
        .unwrap();

    let store = ConsentStore::new(jar, Arc::new(NoopIntegrations));
    let prefs = store.get_preferences().unwrap();
    assert!(prefs.necessary());
    assert!(prefs.advertising);
}

#[test]
fn test_saved_cookie_value_is_percent_encoded_json() {
    let jar = Arc::new(InMemoryCookieJar::new());
    let store = ConsentStore::new(jar.clone(), Arc::new(NoopIntegrations));
    let record = store.save_preferences(CategorySet::new(false, false, true, true));

    let header = jar.header().unwrap();
    let raw = find_cookie(&header, "dto_cookie_preferences").unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&urlencoding::decode(raw).unwrap()).unwrap();

    assert_eq!(json["preferences"]["necessary"], true);
    assert_eq!(json["preferences"]["performance"], true);
    assert_eq!(json["preferences"]["advertising"], true);
    assert_eq!(json["consentId"], record.consent_id.as_str());
    assert_eq!(json["consentDate"], record.consent_date.as_str());
}
