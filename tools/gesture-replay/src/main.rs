//! Gesture Replay - drive the stabilizer from a recorded landmark stream
//!
//! Feeds recorded frames through a live translator backed by the HTTP
//! classification endpoint, then prints the archived translation, history
//! and stats.
//!
//! # Usage
//!
//! ```bash
//! # Replay a recording at 30 fps against the default endpoint
//! gesture-replay replay ./session.jsonl
//!
//! # Custom endpoint, config file and JSONL event output
//! gesture-replay --config translator.toml --endpoint http://10.0.0.5:8000/predict \
//!     replay ./session.jsonl --events
//!
//! # Text-to-sign
//! gesture-replay text "hello"
//!
//! # Print the effective configuration
//! gesture-replay config
//! ```

mod recording;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gesture_bridge_core::client::HttpClassificationClient;
use gesture_bridge_core::config::TranslatorConfig;
use gesture_bridge_core::events::{EventSink, MultiSink, TerminalSink};
use gesture_bridge_core::Translator;
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use recording::Step;

/// Gesture Replay - replay landmark recordings through the stabilizer
#[derive(Parser)]
#[command(name = "gesture-replay")]
#[command(author, version)]
#[command(about = "Replay recorded hand-landmark frames through the gesture stabilizer")]
struct Args {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Translator config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the classification endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSONL landmark recording
    Replay {
        /// Path to the recording
        recording: PathBuf,

        /// Frame rate the recording is played back at
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Print translator events as JSONL on stdout
        #[arg(long)]
        events: bool,
    },

    /// Render text as a sign glyph sequence
    Text {
        /// Text to translate
        text: String,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let mut config = match &args.config {
        Some(path) => TranslatorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TranslatorConfig::default(),
    };
    if let Some(endpoint) = args.endpoint {
        config = config.with_endpoint(endpoint);
        config.validate()?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("gesture-replay")
        .enable_all()
        .build()?;

    match args.command {
        Command::Replay {
            recording,
            fps,
            events,
        } => runtime.block_on(replay(config, recording, fps, events)),
        Command::Text { text } => runtime.block_on(text_to_sign(config, text)),
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn event_sink(events: bool) -> Arc<dyn EventSink> {
    let sink = MultiSink::new();
    if events {
        Arc::new(sink.with_sink(Box::new(TerminalSink::stdout())))
    } else {
        Arc::new(sink)
    }
}

async fn replay(config: TranslatorConfig, path: PathBuf, fps: u32, events: bool) -> Result<()> {
    let steps = recording::load(&path)?;
    let frame_interval = Duration::from_secs(1) / fps.max(1);
    let drain = config.classifier.timeout();

    tracing::info!(
        recording = %path.display(),
        steps = steps.len(),
        fps,
        endpoint = %config.classifier.endpoint,
        "Replaying recording"
    );

    let classifier = Arc::new(HttpClassificationClient::new(&config.classifier)?);
    let translator = Translator::spawn(config, classifier, event_sink(events))?;

    translator.start_capture().await?;

    tokio::select! {
        result = play(&translator, steps, frame_interval) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, stopping capture");
        }
    }

    // Let in-flight classifications land before the session closes
    tokio::time::sleep(drain).await;

    let archived = translator.stop_capture().await?;
    let snapshot = translator.snapshot().await?;
    translator.shutdown().await?;

    let summary = json!({
        "translation": archived.map(|entry| entry.text),
        "history": snapshot.history,
        "stats": snapshot.stats,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn play(translator: &Translator, steps: Vec<Step>, frame_interval: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(frame_interval);
    for step in steps {
        match step {
            Step::Frame(values) => {
                ticker.tick().await;
                translator.push_frame(values).await?;
            }
            Step::Pause(pause) => {
                tracing::debug!(pause_ms = pause.as_millis() as u64, "Pause");
                tokio::time::sleep(pause).await;
                ticker.reset();
            }
        }
    }
    Ok(())
}

async fn text_to_sign(config: TranslatorConfig, text: String) -> Result<()> {
    let poll = Duration::from_millis(50);
    let classifier = Arc::new(HttpClassificationClient::new(&config.classifier)?);
    let translator = Translator::spawn(config, classifier, event_sink(false))?;

    translator.submit_text(text).await?;
    let snapshot = loop {
        let snapshot = translator.snapshot().await?;
        if !snapshot.text_to_sign_pending {
            break snapshot;
        }
        tokio::time::sleep(poll).await;
    };
    translator.shutdown().await?;

    if let Some(entry) = snapshot.history.first() {
        println!("{}", entry.text);
    }
    if let Some(display) = snapshot.sign_display {
        println!("{}", display);
    }
    Ok(())
}
