//! Tests for the serving loop
//!
//! These tests verify:
//! - The bootstrap report (success and each failure step)
//! - Request ordering and durability through the loop
//! - Dropping undelivered responses after the timeout
//! - Termination on `quit` and on disconnect

use std::fs;
use std::thread;
use std::time::Duration;

use crossbeam::channel::bounded;
use jsonkv::config::{Config, POISON_KEY};
use jsonkv::storage::FamilyStore;
use jsonkv::table::PLACEHOLDER_FAMILY;
use jsonkv::{listen, JsonKvError, LoopExit, Request, StoreHandle};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

// =============================================================================
// Helper Functions
// =============================================================================

fn config_for(temp_dir: &TempDir, timeout: Duration) -> Config {
    Config::builder()
        .jsons_path(temp_dir.path().join("jsons"))
        .response_timeout(timeout)
        .build()
}

fn setup_store() -> (TempDir, StoreHandle) {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(&temp_dir, Duration::from_secs(5));
    let store = StoreHandle::spawn_with_config(config).unwrap();
    store.bootstrap(WAIT).unwrap();
    (temp_dir, store)
}

fn write_config_file(temp_dir: &TempDir, timeout_secs: u64) -> String {
    let path = temp_dir.path().join("config.json");
    let json = serde_json::json!({
        "JsonsPath": temp_dir.path().join("jsons"),
        "ReceivingResponseChannelTimeout": timeout_secs,
    });
    fs::write(&path, json.to_string()).unwrap();
    format!("--cfg={}", path.display())
}

fn decode_list(lines: &[String]) -> Vec<String> {
    serde_json::from_str(lines.last().unwrap()).unwrap()
}

// =============================================================================
// Bootstrap Tests
// =============================================================================

#[test]
fn test_bootstrap_success_from_args() {
    let temp_dir = TempDir::new().unwrap();
    let arg = write_config_file(&temp_dir, 5);

    let store = StoreHandle::spawn([arg]).unwrap();
    let lines = store.bootstrap(WAIT).unwrap();

    assert_eq!(lines[0], "reading config file...");
    assert_eq!(lines[1], "configuration loaded successfully");
    assert!(lines[2].starts_with("loading jsons from "));
    assert_eq!(lines.last().unwrap(), "json files loaded into memory");
    assert!(temp_dir.path().join("jsons").is_dir());

    store.request(Request::quit(), WAIT).unwrap();
    assert_eq!(store.join().unwrap(), LoopExit::Quit);
}

#[test]
fn test_bootstrap_with_supplied_config() {
    let temp_dir = TempDir::new().unwrap();
    let store = StoreHandle::spawn_with_config(config_for(&temp_dir, WAIT)).unwrap();

    let lines = store.bootstrap(WAIT).unwrap();

    assert_eq!(lines[0], "configuration supplied directly");
    assert_eq!(lines.last().unwrap(), "json files loaded into memory");
}

#[test]
fn test_bootstrap_is_sent_once_then_closed() {
    let (_temp, store) = setup_store();

    let second = store.bootstrap(Duration::from_millis(200));

    assert!(matches!(second, Err(JsonKvError::Disconnected(_))));
}

#[test]
fn test_bootstrap_fails_without_cfg_arg() {
    let store = StoreHandle::spawn(Vec::<String>::new()).unwrap();

    let err = store.bootstrap(WAIT).unwrap_err();

    assert_eq!(
        err.to_string(),
        "you must provide path to config with --cfg=[[/path/to/file.json]]"
    );
    assert_eq!(store.join().unwrap(), LoopExit::BootstrapFailed);
}

#[test]
fn test_bootstrap_fails_on_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let arg = format!("--cfg={}", temp_dir.path().join("absent.json").display());
    let store = StoreHandle::spawn([arg]).unwrap();

    let err = store.bootstrap(WAIT).unwrap_err();

    assert!(err.to_string().starts_with("Configuration error"));
    assert_eq!(store.join().unwrap(), LoopExit::BootstrapFailed);
}

#[test]
fn test_bootstrap_fails_when_path_is_a_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("jsons");
    fs::write(&path, b"x").unwrap();
    let config = Config::builder().jsons_path(&path).build();

    let store = StoreHandle::spawn_with_config(config).unwrap();
    let err = store.bootstrap(WAIT).unwrap_err();

    assert!(err.to_string().ends_with("is not a directory"));
    assert_eq!(store.join().unwrap(), LoopExit::BootstrapFailed);
}

#[test]
fn test_bootstrap_fails_on_corrupt_family_file() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("jsons");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("broken.json"), b"{\"a\":").unwrap();

    let store = StoreHandle::spawn_with_config(config_for(&temp_dir, WAIT)).unwrap();
    let err = store.bootstrap(WAIT).unwrap_err();

    assert!(matches!(err, JsonKvError::Remote(ref msg) if msg.starts_with("Decode error")));
    assert_eq!(store.join().unwrap(), LoopExit::BootstrapFailed);
}

#[test]
fn test_failed_bootstrap_keeps_earlier_lines() {
    let temp_dir = TempDir::new().unwrap();
    let arg = write_config_file(&temp_dir, 5);
    let dir = temp_dir.path().join("jsons");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("broken.json"), b"[]").unwrap();
    let (_request_tx, request_rx) = bounded(0);
    let (response_tx, _response_rx) = bounded(0);
    let (bootstrap_tx, bootstrap_rx) = bounded(1);

    let exit = listen([arg], request_rx, response_tx, bootstrap_tx);
    let report = bootstrap_rx.recv().unwrap();

    assert_eq!(exit, LoopExit::BootstrapFailed);
    assert!(!report.status_ok);
    assert_eq!(report.message.len(), 4);
    assert_eq!(report.message[0], "reading config file...");
    assert!(report.message[2].starts_with("loading jsons from "));
    assert!(report.last_line().unwrap().starts_with("Decode error"));
    // Closed after the single report
    assert!(bootstrap_rx.recv().is_err());
}

#[test]
fn test_empty_store_is_seeded_with_placeholder() {
    let (temp, store) = setup_store();

    let lines = store.request(Request::list(), WAIT).unwrap();

    assert_eq!(decode_list(&lines), vec![PLACEHOLDER_FAMILY]);
    // Placeholder is never written to disk
    assert_eq!(fs::read_dir(temp.path().join("jsons")).unwrap().count(), 0);
}

#[test]
fn test_existing_families_are_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("jsons");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("users.json"), r#"{"alice":"admin"}"#).unwrap();

    let store = StoreHandle::spawn_with_config(config_for(&temp_dir, WAIT)).unwrap();
    store.bootstrap(WAIT).unwrap();

    assert_eq!(
        store.request(Request::get("users", "alice"), WAIT).unwrap(),
        vec!["\"admin\""]
    );
    assert_eq!(
        decode_list(&store.request(Request::list(), WAIT).unwrap()),
        vec!["users"]
    );
}

// =============================================================================
// Serving Tests
// =============================================================================

#[test]
fn test_requests_processed_in_order() {
    let (_temp, store) = setup_store();

    for value in ["1", "2", "3"] {
        assert_eq!(
            store.request(Request::set("f", "a", value), WAIT).unwrap(),
            vec!["value set"]
        );
    }

    assert_eq!(
        store.request(Request::get("f", "a"), WAIT).unwrap(),
        vec!["\"3\""]
    );
}

#[test]
fn test_unknown_action_does_not_stop_loop() {
    let (_temp, store) = setup_store();

    let err = store
        .request(Request::with_action("explode"), WAIT)
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown action: explode");

    assert_eq!(
        store.request(Request::get("f", "a"), WAIT).unwrap(),
        vec!["\"\""]
    );
}

#[test]
fn test_list_includes_every_written_family() {
    let (_temp, store) = setup_store();
    for family in ["a", "b", "c"] {
        store.request(Request::set(family, "k", "v"), WAIT).unwrap();
    }

    let mut families = decode_list(&store.request(Request::list(), WAIT).unwrap());
    families.retain(|f| f != PLACEHOLDER_FAMILY);
    families.sort();

    assert_eq!(families, vec!["a", "b", "c"]);
}

#[test]
fn test_durability_across_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = StoreHandle::spawn_with_config(config_for(&temp_dir, WAIT)).unwrap();
        store.bootstrap(WAIT).unwrap();
        store.request(Request::set("f", "a", "1"), WAIT).unwrap();
        store.request(Request::quit(), WAIT).unwrap();
        store.join().unwrap();
    }

    let store = StoreHandle::spawn_with_config(config_for(&temp_dir, WAIT)).unwrap();
    store.bootstrap(WAIT).unwrap();

    assert_eq!(
        store.request(Request::get("f", "a"), WAIT).unwrap(),
        vec!["\"1\""]
    );
    let on_disk = FamilyStore::open(&temp_dir.path().join("jsons"))
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(on_disk.get("f", "a"), Some("1"));
}

// =============================================================================
// Delivery Timeout Tests
// =============================================================================

#[test]
fn test_uncollected_response_is_dropped() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(&temp_dir, Duration::from_millis(200));
    let store = StoreHandle::spawn_with_config(config).unwrap();
    store.bootstrap(WAIT).unwrap();

    // Let the set response expire unread
    store.send(Request::set("f", "a", "1")).unwrap();
    thread::sleep(Duration::from_millis(600));

    // The next response is the get's, not the stale set's
    assert_eq!(
        store.request(Request::get("f", "a"), WAIT).unwrap(),
        vec!["\"1\""]
    );
}

#[test]
fn test_poison_key_times_out_then_loop_recovers() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .jsons_path(temp_dir.path().join("jsons"))
        .response_timeout(Duration::from_millis(100))
        .poison_key(POISON_KEY, Duration::from_millis(400))
        .build();
    let store = StoreHandle::spawn_with_config(config).unwrap();
    store.bootstrap(WAIT).unwrap();

    let timed_out = store.request(Request::set("f", POISON_KEY, "x"), Duration::from_millis(100));
    assert!(matches!(timed_out, Err(JsonKvError::DeliveryTimeout)));

    assert_eq!(
        store.request(Request::get("f", POISON_KEY), WAIT).unwrap(),
        vec!["\"x\""]
    );
}

// =============================================================================
// Termination Tests
// =============================================================================

#[test]
fn test_quit_says_bye_and_closes_channels() {
    let (_temp, store) = setup_store();

    assert_eq!(store.request(Request::quit(), WAIT).unwrap(), vec!["BYE"]);

    assert!(matches!(store.recv(WAIT), Err(JsonKvError::Disconnected(_))));
    assert!(matches!(
        store.send(Request::get("f", "a")),
        Err(JsonKvError::Disconnected(_))
    ));
    assert_eq!(store.join().unwrap(), LoopExit::Quit);
}

#[test]
fn test_quit_terminates_even_if_bye_is_not_collected() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(&temp_dir, Duration::from_millis(100));
    let store = StoreHandle::spawn_with_config(config).unwrap();
    store.bootstrap(WAIT).unwrap();

    store.send(Request::quit()).unwrap();
    thread::sleep(Duration::from_millis(500));

    assert!(store.is_finished());
    assert_eq!(store.join().unwrap(), LoopExit::Quit);
}

#[test]
fn test_dropping_request_sender_stops_loop() {
    let (_temp, store) = setup_store();
    assert!(!store.is_finished());

    assert_eq!(store.join().unwrap(), LoopExit::Disconnected);
}
