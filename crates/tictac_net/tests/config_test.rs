//! Configuration loading from TOML files.

use std::io::Write;
use std::net::Ipv4Addr;
use std::time::Duration;

use tictac_net::NetConfig;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
multicast_group = "239.1.2.3"
multicast_port = 2020
max_sessions = 4
discovery_timeout_ms = 500
discovery_attempts = 2
"#
    )
    .unwrap();

    let config = NetConfig::load(Some(file.path())).unwrap();
    assert_eq!(*config.multicast_group(), Ipv4Addr::new(239, 1, 2, 3));
    assert_eq!(*config.multicast_port(), 2020);
    assert_eq!(*config.multicast_interface(), Ipv4Addr::UNSPECIFIED);
    assert_eq!(*config.max_sessions(), 4);
    assert_eq!(config.discovery_timeout(), Duration::from_millis(500));
    assert_eq!(*config.discovery_attempts(), 2);
}

#[test]
fn test_no_file_means_defaults() {
    assert_eq!(NetConfig::load(None).unwrap(), NetConfig::default());
}

#[test]
fn test_non_multicast_group_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"multicast_group = "10.0.0.1""#).unwrap();

    let err = NetConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("not a multicast address"));
}

#[test]
fn test_capacity_must_fit_slot_byte() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_sessions = 300").unwrap();

    let err = NetConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = NetConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}
