#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use metricsink_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
store:
  path: "metrics.txt"
  flush_intreval_ms: 1000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.server.shutdown_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.store.path, "store.txt");
    assert_eq!(cfg.store.flush_interval(), Duration::from_secs(5));
    assert_eq!(cfg.store.expected_rps, 50_000);
}

#[test]
fn ok_full_config() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9090"
  shutdown_timeout_ms: 2000
store:
  path: "/var/lib/metricsink/metrics.txt"
  flush_interval_ms: 250
  expected_rps: 400
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 9090);

    let store = cfg.store.to_store_config();
    assert_eq!(store.flush_interval, Duration::from_millis(250));
    assert_eq!(store.expected_rps, 400);
    assert_eq!(store.path.to_str(), Some("/var/lib/metricsink/metrics.txt"));
}

#[test]
fn rejects_store_too_small_to_batch() {
    let bad = r#"
version: 1
store:
  flush_interval_ms: 1000
  expected_rps: 0
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIGURATION");
}

#[test]
fn rejects_zero_flush_interval() {
    let bad = r#"
version: 1
store:
  flush_interval_ms: 0
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIGURATION");
}

#[test]
fn rejects_bad_listen_and_version() {
    let bad_listen = r#"
version: 1
server:
  listen: "localhost"
"#;
    let err = config::load_from_str(bad_listen).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIGURATION");

    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIGURATION");
}

#[test]
fn load_from_missing_file_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nope.yaml");
    assert!(config::load_from_file(path.to_str().unwrap()).is_err());
}
