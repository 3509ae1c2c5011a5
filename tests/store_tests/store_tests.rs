//! Tests for Store
//!
//! These tests verify:
//! - Insert / get / remove / list_all
//! - Duplicate rejection
//! - set_ttl on missing keys
//! - Concurrent readers and writers

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use ttlkv::{Config, Store, TtlKvError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store() -> Store {
    // A long sweep interval keeps the background loop out of the way
    let config = Config::builder()
        .sweep_interval(Duration::from_secs(3600))
        .build();
    Store::open(config).unwrap()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let store = setup_store();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(store.list_all().is_empty());
    assert_eq!(store.backend_name(), "noop");
}

#[test]
fn test_insert_and_get() {
    let store = setup_store();

    store.insert("hello", "world").unwrap();

    assert_eq!(store.get("hello"), Some("world".to_string()));
    assert!(store.contains_key("hello"));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_get_nonexistent_key() {
    let store = setup_store();
    assert_eq!(store.get("nonexistent"), None);
}

#[test]
fn test_insert_duplicate_is_rejected() {
    let store = setup_store();

    store.insert("key", "v1").unwrap();
    let err = store.insert("key", "v2").unwrap_err();

    assert!(matches!(err, TtlKvError::DuplicateKey(ref k) if k == "key"));
    assert_eq!(store.get("key"), Some("v1".to_string()));
}

#[test]
fn test_insert_with_ttl_duplicate_is_rejected() {
    let store = setup_store();

    store.insert("key", "forever").unwrap();
    let err = store
        .insert_with_ttl("key", "short", Duration::from_secs(1))
        .unwrap_err();

    assert!(matches!(err, TtlKvError::DuplicateKey(_)));
    assert_eq!(store.get("key"), Some("forever".to_string()));
    assert!(store.snapshot()["key"].expires_at.is_none());
}

#[test]
fn test_duplicate_keeps_original_created_at() {
    let store = setup_store();

    store.insert("key", "v1").unwrap();
    let created = store.snapshot()["key"].created_at;
    thread::sleep(Duration::from_millis(5));
    let _ = store.insert("key", "v2");

    assert_eq!(store.snapshot()["key"].created_at, created);
}

#[test]
fn test_remove() {
    let store = setup_store();

    store.insert("key", "value").unwrap();
    store.remove("key");

    assert_eq!(store.get("key"), None);
    assert!(store.is_empty());
}

#[test]
fn test_remove_nonexistent_key_is_noop() {
    let store = setup_store();
    store.insert("other", "value").unwrap();

    store.remove("nonexistent");

    assert_eq!(store.len(), 1);
}

#[test]
fn test_insert_after_remove_succeeds() {
    let store = setup_store();

    store.insert("key", "v1").unwrap();
    store.remove("key");
    store.insert("key", "v2").unwrap();

    assert_eq!(store.get("key"), Some("v2".to_string()));
}

#[test]
fn test_list_all_returns_every_value() {
    let store = setup_store();

    store.insert("1", "one").unwrap();
    store.insert("2", "two").unwrap();
    store
        .insert_with_ttl("3", "three", Duration::from_secs(60))
        .unwrap();

    let mut values = store.list_all();
    values.sort();
    assert_eq!(values, vec!["one", "three", "two"]);
}

#[test]
fn test_list_all_is_a_copy() {
    let store = setup_store();
    store.insert("a", "1").unwrap();

    let values = store.list_all();
    store.remove("a");

    assert_eq!(values, vec!["1"]);
    assert!(store.list_all().is_empty());
}

#[test]
fn test_empty_key_and_value() {
    let store = setup_store();

    store.insert("", "empty_key_value").unwrap();
    store.insert("empty_value", "").unwrap();

    assert_eq!(store.get(""), Some("empty_key_value".to_string()));
    assert_eq!(store.get("empty_value"), Some(String::new()));
}

#[test]
fn test_large_value() {
    let store = setup_store();

    let large_value = "x".repeat(100_000);
    store.insert("large_key", large_value.clone()).unwrap();

    assert_eq!(store.get("large_key"), Some(large_value));
}

// =============================================================================
// TTL Metadata Tests
// =============================================================================

#[test]
fn test_set_ttl_missing_key() {
    let store = setup_store();

    let err = store.set_ttl("missing", Utc::now()).unwrap_err();

    assert!(matches!(err, TtlKvError::NotFound(ref k) if k == "missing"));
}

#[test]
fn test_set_ttl_replaces_expiry() {
    let store = setup_store();
    store.insert("key", "value").unwrap();

    let at = Utc::now() + chrono::Duration::seconds(30);
    store.set_ttl("key", at).unwrap();

    assert_eq!(store.snapshot()["key"].expires_at, Some(at));
}

#[test]
fn test_insert_with_ttl_sets_expiry_from_now() {
    let store = setup_store();
    let before = Utc::now();

    store
        .insert_with_ttl("key", "value", Duration::from_secs(10))
        .unwrap();

    let entry = store.snapshot()["key"].clone();
    let expires_at = entry.expires_at.unwrap();
    assert!(expires_at >= before + chrono::Duration::seconds(10));
    assert_eq!(expires_at - entry.created_at, chrono::Duration::seconds(10));
}

#[test]
fn test_extreme_ttl_is_capped() {
    let store = setup_store();

    store
        .insert_with_ttl("key", "value", Duration::from_secs(u64::MAX))
        .unwrap();

    let entry = store.snapshot()["key"].clone();
    let ttl = (entry.expires_at.unwrap() - entry.created_at).to_std().unwrap();
    assert_eq!(ttl, ttlkv::store::MAX_TTL);
}

#[test]
fn test_time_alive_missing_key() {
    let store = setup_store();
    assert_eq!(store.time_alive("missing"), None);
}

#[test]
fn test_time_alive_grows() {
    let store = setup_store();
    store.insert("key", "value").unwrap();

    thread::sleep(Duration::from_millis(50));
    let first = store.time_alive("key").unwrap();
    thread::sleep(Duration::from_millis(10));
    let second = store.time_alive("key").unwrap();

    assert!(first >= Duration::from_millis(50));
    assert!(second > first);
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_writers_and_readers() {
    let store = Arc::new(setup_store());
    let mut handles = vec![];

    for t in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                store
                    .insert(format!("t{}_k{}", t, i), format!("t{}_v{}", t, i))
                    .unwrap();
            }
        }));
    }

    for _ in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let _ = store.list_all();
                let _ = store.get(&format!("t0_k{}", i));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let values: Vec<String> = store.list_all();
    assert_eq!(values.len(), 800);
    let unique: HashSet<&String> = values.iter().collect();
    assert_eq!(unique.len(), 800);

    for t in 0..8 {
        for i in 0..100 {
            assert_eq!(
                store.get(&format!("t{}_k{}", t, i)),
                Some(format!("t{}_v{}", t, i))
            );
        }
    }
}

#[test]
fn test_concurrent_inserts_same_key_exactly_one_wins() {
    let store = Arc::new(setup_store());
    let mut handles = vec![];

    for t in 0..10 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            store.insert("contested", format!("thread{}", t)).is_ok()
        }));
    }

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_background_loops_running() {
    let store = setup_store();

    assert!(store.sweep_running());
    assert!(!store.backup_running());
}

#[test]
fn test_zero_sweep_interval_rejected() {
    let config = Config::builder().sweep_interval(Duration::ZERO).build();
    assert!(matches!(Store::open(config), Err(TtlKvError::Config(_))));
}

#[test]
fn test_close_without_backup() {
    let store = setup_store();
    store.insert("key", "value").unwrap();
    store.close().unwrap();
}
