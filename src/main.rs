use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use gesture_warp::pattern_file::parse_pattern;
use gesture_warp::sensor::FrameClock;
use gesture_warp::{
    Config, GestureRecognizer, RecognitionEvent, RecognizerCommand, RecognizerConfig,
    RecognizerUpdate, RecognizerWorker,
};

#[derive(Debug, Parser)]
#[command(name = "gesture-replay")]
#[command(about = "Replay a recorded sensor stream through the gesture recognizer")]
struct Cli {
    /// Stream file, one `t,c1,...,cN` line per frame (t in absolute seconds)
    stream: PathBuf,
    /// 3 for acceleration, 2 for touch displacement
    #[arg(long, default_value_t = 3)]
    channels: usize,
    /// Profile whose patterns are loaded before replay
    #[arg(long)]
    profile: String,
    /// Config file (defaults to the platform config location)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the pattern directory from the config
    #[arg(long = "pattern-dir")]
    pattern_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let events = match cli.channels {
        3 => replay::<3>(config.accel, &cli)?,
        2 => replay::<2>(config.touch, &cli)?,
        n => bail!("Unsupported channel count `{n}` (use 2|3)"),
    };

    for event in &events {
        println!(
            "{:.3}\t{}\t{:.3}",
            event.timestamp, event.pattern_name, event.distance
        );
    }
    log::info!("Replay finished: {} recognitions", events.len());
    Ok(())
}

fn replay<const N: usize>(mut config: RecognizerConfig, cli: &Cli) -> Result<Vec<RecognitionEvent>> {
    if let Some(dir) = &cli.pattern_dir {
        config.pattern_dir = dir.clone();
    }

    let contents = fs::read_to_string(&cli.stream)
        .with_context(|| format!("failed to read stream {}", cli.stream.display()))?;
    let frames = parse_pattern::<N>(&cli.stream, &contents)?;
    log::info!("Loaded {} frames from {}", frames.len(), cli.stream.display());

    let mut recognizer =
        GestureRecognizer::<N>::try_new(config).context("invalid recognizer configuration")?;
    recognizer
        .set_active_profile(&cli.profile)
        .with_context(|| format!("failed to load profile `{}`", cli.profile))?;

    let worker = RecognizerWorker::spawn(recognizer);
    let mut clock = FrameClock::new();
    for sample in &frames {
        let frame = clock.frame(sample.values, sample.t_abs);
        worker
            .send(RecognizerCommand::Tick(frame))
            .map_err(anyhow::Error::msg)?;
    }
    // Status is answered after every queued frame has been processed
    worker
        .send(RecognizerCommand::QueryStatus)
        .map_err(anyhow::Error::msg)?;

    let mut events = Vec::new();
    for update in worker.updates().iter() {
        match update {
            RecognizerUpdate::Recognized(event) => events.push(event),
            RecognizerUpdate::CommandFailed { command, reason } => {
                log::warn!("{} failed: {}", command, reason)
            }
            RecognizerUpdate::Status(status) => {
                if let Some(best) = status.last_match {
                    log::debug!("Final best match {} at {:.3}", best.name, best.distance);
                }
                break;
            }
            _ => {}
        }
    }

    worker.shutdown();
    Ok(events)
}
