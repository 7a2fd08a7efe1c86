use std::net::Ipv4Addr;

use huginn_syn::{FilterConfig, FingerprintCache, SynCapture, SynLookup};
use huginn_syn_common::testing::SynFrameBuilder;

type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const CLIENT: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 44);

#[test]
fn miss_for_unknown_peer() {
    let engine = SynCapture::new(FilterConfig::ANY);
    assert_eq!(engine.collector().lookup_fresh(CLIENT, 40000), SynLookup::Miss);
}

#[test]
fn entry_goes_stale_after_threshold_captures() -> TestResult {
    let engine = SynCapture::with_parts(FilterConfig::ANY, FingerprintCache::with_capacity(64), 4);
    let dispatcher = engine.dispatcher();
    let collector = engine.collector();

    dispatcher.on_frame(SynFrameBuilder::new().source(CLIENT, 40000).build().as_bytes());
    assert!(matches!(collector.lookup_fresh(CLIENT, 40000), SynLookup::Hit(_)));

    // Four more SYNs from other clients: age 5 > 4.
    for port in 1..=4 {
        dispatcher.on_frame(SynFrameBuilder::new().source(Ipv4Addr::new(192, 0, 2, 1), port).build().as_bytes());
    }
    assert_eq!(collector.current_tick(), 5);
    match collector.lookup_fresh(CLIENT, 40000) {
        SynLookup::Stale { record, age } => {
            assert_eq!(age, 5);
            assert_eq!(record.sequence_tick, 0);
        }
        other => return Err(format!("expected stale entry, got {other:?}").into()),
    }
    Ok(())
}

#[test]
fn port_reuse_gets_the_new_fingerprint() -> TestResult {
    let engine = SynCapture::new(FilterConfig::ANY);
    let dispatcher = engine.dispatcher();
    dispatcher.on_frame(SynFrameBuilder::new().source(CLIENT, 40000).ttl(64).build().as_bytes());
    dispatcher.on_frame(SynFrameBuilder::new().source(CLIENT, 40000).ttl(128).build().as_bytes());

    let SynLookup::Hit(record) = engine.collector().lookup_fresh(CLIENT, 40000) else {
        return Err("expected a fresh entry".into());
    };
    assert_eq!(record.ip_ttl, 128);
    Ok(())
}
