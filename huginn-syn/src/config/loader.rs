use std::fs;
use std::path::Path;

use crate::config::CaptureConfig;
use crate::error::{Result, SynError};

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<CaptureConfig> {
    let txt = fs::read_to_string(p)
        .map_err(|e| SynError::Config(format!("Failed to read config file: {e}")))?;
    parse_config(&txt)
}

pub fn parse_config(txt: &str) -> Result<CaptureConfig> {
    let cfg: CaptureConfig = toml::from_str(txt)
        .map_err(|e| SynError::Config(format!("Failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &CaptureConfig) -> Result<()> {
    if cfg.collector.stale_tick_threshold == 0 {
        return Err(SynError::Config(
            "collector.stale_tick_threshold must be greater than 0".to_string(),
        ));
    }

    if let Some(ip) = cfg.filter.dst_ip {
        if ip.is_multicast() || ip.is_broadcast() {
            return Err(SynError::Config(format!(
                "filter.dst_ip must be a unicast address: {ip}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.filter(), huginn_syn_common::FilterConfig::ANY);
        assert_eq!(cfg.collector.stale_tick_threshold, 16_384);
        assert_eq!(cfg.logging.level, "info");
        assert!(!cfg.logging.show_target);
    }

    #[test]
    fn test_filter_section() {
        let cfg = parse_config(
            r#"
[filter]
dst_ip = "198.51.100.1"
dst_port = 443
"#,
        )
        .unwrap();
        let filter = cfg.filter();
        assert_eq!(filter.dst_ip(), Some(Ipv4Addr::new(198, 51, 100, 1)));
        assert_eq!(filter.dst_port(), Some(443));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = parse_config("[collector]\nstale_tick_threshold = 0\n").unwrap_err();
        assert!(matches!(err, SynError::Config(_)));
    }

    #[test]
    fn test_multicast_destination_rejected() {
        assert!(parse_config("[filter]\ndst_ip = \"224.0.0.1\"\n").is_err());
        assert!(parse_config("[filter]\ndst_ip = \"255.255.255.255\"\n").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = parse_config("[filter\n").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Failed to parse config"));
    }
}
