#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use timegate_gateway::config;

#[test]
fn deny_unknown_fields() {
    let bad = r#"{ "token": "s3cret", "prt": 9000 }"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config_applies_defaults() {
    let ok = r#"{ "token": "s3cret" }"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.token, "s3cret");
    assert_eq!(cfg.path, "/mcp");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.heartbeat_interval_secs, 15);
    assert_eq!(cfg.channel_capacity, 64);
    assert_eq!(cfg.listen_addr(), "127.0.0.1:8000");
}

#[test]
fn empty_token_is_rejected() {
    let bad = r#"{ "token": "" }"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn path_must_be_a_rooted_prefix() {
    let no_slash = r#"{ "token": "t", "path": "mcp" }"#;
    assert!(config::load_from_str(no_slash).is_err());

    let trailing = r#"{ "token": "t", "path": "/mcp/" }"#;
    assert!(config::load_from_str(trailing).is_err());

    let ok = r#"{ "token": "t", "path": "/api/time" }"#;
    assert_eq!(config::load_from_str(ok).unwrap().path, "/api/time");
}

#[test]
fn heartbeat_interval_is_range_checked() {
    let zero = r#"{ "token": "t", "heartbeat_interval_secs": 0 }"#;
    assert!(config::load_from_str(zero).is_err());

    let huge = r#"{ "token": "t", "heartbeat_interval_secs": 600 }"#;
    assert!(config::load_from_str(huge).is_err());

    let ok = r#"{ "token": "t", "heartbeat_interval_secs": 30 }"#;
    assert_eq!(
        config::load_from_str(ok).unwrap().heartbeat_interval_secs,
        30
    );
}

#[test]
fn zero_channel_capacity_is_rejected() {
    let bad = r#"{ "token": "t", "channel_capacity": 0 }"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn original_deployment_shape_parses() {
    // The shape the original config.json used: token, path, port.
    let cfg = config::load_from_str(r#"{ "token": "abc123", "path": "/time", "port": 9001 }"#)
        .expect("must parse");
    assert_eq!(cfg.listen_addr(), "127.0.0.1:9001");
    assert_eq!(cfg.path, "/time");
}
