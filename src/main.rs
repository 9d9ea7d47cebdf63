//! Command-line replay tool
//!
//! Loads a test case from a directory of JSON sequences and replays it to
//! stdout in real time, with optional speed and layer filtering.

use anyhow::Context;
use clap::Parser;
use protoplay_rs::{
    config::EngineConfig,
    loader::JsonDirectorySource,
    playback::SessionEvent,
    registry::PlaybackEngine,
    types::{Layer, MessageFilter},
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "protoplay", about = "Replay a recorded protocol test case")]
struct Args {
    /// Test case identifier (file stem of a JSON sequence)
    test_case_id: String,

    /// Directory containing `<id>.json` sequence files
    #[arg(short = 'd', long, default_value = "test_cases")]
    test_case_dir: PathBuf,

    /// Playback speed multiplier
    #[arg(short, long)]
    speed: Option<f64>,

    /// Only show messages on these layers (e.g. RRC, NAS)
    #[arg(short, long)]
    layer: Vec<Layer>,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the layer parameter simulator
    #[arg(long)]
    seed: Option<u64>,

    /// Show layer parameter updates alongside messages
    #[arg(long)]
    parameters: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,protoplay_rs=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let source = JsonDirectorySource::new(&args.test_case_dir);
    let engine = PlaybackEngine::new(Box::new(source), config)?;

    let session = engine
        .initialize(&args.test_case_id)
        .with_context(|| format!("failed to initialize test case '{}'", args.test_case_id))?;

    if !args.layer.is_empty() {
        engine.set_filter(session, MessageFilter::for_layers(&args.layer))?;
    }
    let events = engine.subscribe(session)?;
    if let Some(speed) = args.speed {
        engine.set_speed(session, speed)?;
    }
    engine.start(session)?;

    for event in events {
        match event {
            SessionEvent::Message(msg) => {
                println!(
                    "[{:>8} ms] {:<5} {:<13} {} ({})",
                    msg.timestamp_ms, msg.layer, msg.direction, msg.message_name, msg.message_type
                );
            }
            SessionEvent::ParameterUpdate(update) if args.parameters => {
                println!(
                    "[{:>8} ms] {:<5} {} = {:.2} {} ({:?})",
                    update.timestamp_ms,
                    update.layer,
                    update.parameter_name,
                    update.current_value,
                    update.unit,
                    update.trend
                );
            }
            SessionEvent::Error { reason } => {
                eprintln!("playback error: {reason}");
            }
            SessionEvent::Complete(stats) => {
                println!(
                    "completed: {} messages, {:.1}% success, compliance {:.1}, {:.2} msg/s",
                    stats.total_messages,
                    stats.success_rate_percent,
                    stats.compliance_score,
                    stats.messages_per_second
                );
                break;
            }
            _ => {}
        }
    }

    engine.destroy(session)?;
    Ok(())
}
