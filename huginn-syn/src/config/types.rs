use std::net::Ipv4Addr;

use huginn_syn_common::FilterConfig;
use serde::Deserialize;

use crate::collector::STALE_TICK_THRESHOLD;

/// Top-level capture configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CaptureConfig {
    #[serde(default)]
    pub filter: ListenFilter,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CaptureConfig {
    pub fn filter(&self) -> FilterConfig {
        self.filter.to_filter()
    }
}

/// Destination the capture path is restricted to
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenFilter {
    /// Destination IPv4 address; absent or 0.0.0.0 matches any
    #[serde(default)]
    pub dst_ip: Option<Ipv4Addr>,
    /// Destination TCP port; absent or 0 matches any
    #[serde(default)]
    pub dst_port: Option<u16>,
}

impl ListenFilter {
    pub fn to_filter(&self) -> FilterConfig {
        FilterConfig::new(
            self.dst_ip.unwrap_or(Ipv4Addr::UNSPECIFIED),
            self.dst_port.unwrap_or(0),
        )
    }
}

/// Lookup-side policy
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CollectorConfig {
    /// SYNs that may be captured after an entry before it is considered stale
    /// Default: 16384
    #[serde(default = "default_stale_tick_threshold")]
    pub stale_tick_threshold: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self { stale_tick_threshold: default_stale_tick_threshold() }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    /// Default: "info"
    /// Can be overridden at runtime via RUST_LOG environment variable
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Show module path (target) in log messages
    /// Default: false
    #[serde(default)]
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), show_target: false }
    }
}

fn default_stale_tick_threshold() -> u64 {
    STALE_TICK_THRESHOLD
}

fn default_log_level() -> String {
    "info".to_string()
}
