#![forbid(unsafe_code)]

mod frames;

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use huginn_syn::{init_tracing, load_from_path, Capture, CaptureConfig, SynCapture, SynRecordView};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay Ethernet frames through the SYN capture path")]
struct Cli {
    /// Path to configuration TOML file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// File with one hex-encoded Ethernet frame per line
    #[arg(short, long, value_name = "FILE")]
    frames: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => load_from_path(path),
        None => Ok(CaptureConfig::default()),
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing(&cfg.logging.level, cfg.logging.show_target) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    if let Err(err) = run(&cfg, &cli.frames) {
        error!(%err, "replay failed");
        std::process::exit(1);
    }
}

fn run(cfg: &CaptureConfig, frames_path: &Path) -> huginn_syn::Result<()> {
    let txt = std::fs::read_to_string(frames_path)?;
    let frames = frames::parse_frames(&txt)?;
    info!(frames = frames.len(), path = %frames_path.display(), "frames loaded");

    let engine = SynCapture::from_config(cfg);
    let dispatcher = engine.dispatcher();
    let collector = engine.collector();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for frame in &frames {
        let Capture::Captured { key, .. } = dispatcher.on_frame(frame) else {
            continue;
        };
        if let Some(record) = collector.lookup_key(key) {
            serde_json::to_writer(&mut out, &SynRecordView::from(&record))?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;

    let stats = engine.stats();
    info!(
        captured = stats.captured,
        passed = stats.passed,
        dropped = stats.dropped,
        entries = engine.cache().len(),
        "replay finished"
    );
    engine.shutdown();
    Ok(())
}
