//! snapgif binary entry point.
//!
//! Wires the CLI and config file into a `RecordingSession`, records until
//! Ctrl-C (or `--duration`), and builds the GIF.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use snapgif::capture::TestPatternSource;
use snapgif::cli::Args;
use snapgif::config::Config;
use snapgif::frame::{Resolution, Rgb};
use snapgif::session::{
    default_output_path, timestamped_file_name, RecorderConfig, RecordingSession,
};

/// Set by the Ctrl-C handler, polled by the wait loop. The only process
/// global: recording state itself lives in the session.
static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

fn main() {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    let env = env_logger::Env::default().filter_or("RUST_LOG", default_level);
    env_logger::Builder::from_env(env).init();

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(duration) = args.duration {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(format!("--duration must be positive, got {}", duration).into());
        }
    }

    let config = Config::load(args.config.as_deref())?;
    let recorder = build_recorder_config(&args, &config)?;
    let output = output_path(&args, &config);

    ctrlc::set_handler(|| {
        STOP_REQUESTED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, stopping...");
    })?;

    let resolution = recorder.resolution;
    let mut session = RecordingSession::new(recorder)?;
    session.start(move || TestPatternSource::new(resolution.width, resolution.height))?;

    wait_for_stop(args.duration);

    let report = session.stop_and_encode(&output)?;
    println!(
        "Captured {} frames in {:.1}s ({:.1} fps) -> {}",
        report.frame_count,
        report.recorded_for.as_secs_f64(),
        report.achieved_fps,
        report.output_path.display()
    );
    Ok(())
}

/// Block until Ctrl-C arrives or the optional duration elapses.
fn wait_for_stop(duration: Option<f64>) {
    let deadline = duration.map(|secs| Instant::now() + Duration::from_secs_f64(secs));
    loop {
        if STOP_REQUESTED.load(Ordering::SeqCst) {
            return;
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return;
            }
        }
        thread::sleep(Duration::from_millis(50));
    }
}

/// Layer CLI flags over config-file values over built-in defaults.
fn build_recorder_config(
    args: &Args,
    config: &Config,
) -> Result<RecorderConfig, Box<dyn std::error::Error>> {
    let defaults = RecorderConfig::default();

    let resolution = match args.resolution {
        Some(r) => r,
        None => match &config.output.resolution {
            Some(s) => s.parse::<Resolution>()?,
            None => defaults.resolution,
        },
    };
    let transparent_color = match args.transparent {
        Some(color) => Some(color),
        None => config
            .encoder
            .transparent
            .as_deref()
            .map(str::parse::<Rgb>)
            .transpose()?,
    };

    Ok(RecorderConfig {
        fps: args.fps.or(config.recording.fps).unwrap_or(defaults.fps),
        thread_count: args
            .threads
            .or(config.recording.threads)
            .unwrap_or(defaults.thread_count),
        strict_fps: args
            .strict_fps
            .or(config.recording.strict_fps)
            .unwrap_or(defaults.strict_fps),
        resolution,
        merge: args.merge.unwrap_or(defaults.merge),
        repeat: args.repeat.or(config.encoder.repeat).unwrap_or(defaults.repeat),
        quantization_sample: args
            .sample
            .or(config.encoder.sample)
            .unwrap_or(defaults.quantization_sample),
        transparent_color,
        disposal_method: args.disposal.or(config.encoder.disposal),
        use_global_color_table: args.global_color_table
            || config.encoder.global_color_table.unwrap_or(false),
    })
}

/// Explicit `--output` wins; otherwise a timestamped name in the configured
/// directory, or the Downloads folder.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    if let Some(path) = &args.output {
        return path.clone();
    }
    match &config.output.directory {
        Some(directory) => directory.join(timestamped_file_name()),
        None => default_output_path(),
    }
}
