#![forbid(unsafe_code)]

pub mod cache;
pub mod collector;
pub mod config;
pub mod counter;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod telemetry;

pub use cache::{FingerprintCache, SynStore, Upsert, SYN_MAP_CAPACITY};
pub use collector::{SynCollector, SynLookup, SynRecordView, STALE_TICK_THRESHOLD};
pub use config::{load_from_path, parse_config, CaptureConfig};
pub use counter::{SequenceCounter, TickSource};
pub use dispatcher::{Capture, CaptureDispatcher, CaptureStats, StatsSnapshot};
pub use engine::SynCapture;
pub use error::{Result, SynError};
pub use huginn_syn_common::{quirk_bits, FilterConfig, FlowKey, PassReason, SynRecord, SYN_RECORD_LEN};
pub use telemetry::init_tracing;
