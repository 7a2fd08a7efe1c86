use std::fs;
use std::net::Ipv4Addr;

use huginn_syn::config::load_from_path;
use huginn_syn::SynError;

type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[test]
fn loads_full_config() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("capture.toml");
    let toml = r#"
[filter]
dst_ip = "198.51.100.1"
dst_port = 443

[collector]
stale_tick_threshold = 1024

[logging]
level = "debug"
show_target = true
"#;
    fs::write(&path, toml)?;

    let cfg = load_from_path(&path)?;
    assert_eq!(cfg.filter.dst_ip, Some(Ipv4Addr::new(198, 51, 100, 1)));
    assert_eq!(cfg.filter().dst_port(), Some(443));
    assert_eq!(cfg.collector.stale_tick_threshold, 1024);
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.show_target);
    Ok(())
}

#[test]
fn unspecified_address_matches_any() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("any.toml");
    fs::write(&path, "[filter]\ndst_ip = \"0.0.0.0\"\ndst_port = 0\n")?;

    let cfg = load_from_path(&path)?;
    assert_eq!(cfg.filter().dst_ip(), None);
    assert_eq!(cfg.filter().dst_port(), None);
    Ok(())
}

#[test]
fn missing_file_is_a_config_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let err = load_from_path(dir.path().join("absent.toml")).err().ok_or("expected error")?;
    assert!(matches!(err, SynError::Config(_)));
    Ok(())
}

#[test]
fn out_of_range_port_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("port.toml");
    fs::write(&path, "[filter]\ndst_port = 70000\n")?;
    assert!(load_from_path(&path).is_err());
    Ok(())
}
