//! PlayPass - automatic queueing of PlayOn catalog videos into PlayLater
//!
//! Command line entry point.
//!
//! # Execution Flow
//!
//! 1. Parse flags and load the rule file (`PlayPass.yaml` by default)
//! 2. Initialize logging → `logs/playpass.<date>` plus the console
//! 3. Build the queue list, the admission controller and the PlayOn client
//! 4. Run every pass, then log the run summary
//!
//! Without `--queue` the run is a preview: nothing is submitted and nothing is
//! recorded in the queue list.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use playpass::config::DEFAULT_CONFIG_FILE;
use playpass::services::build_queue_list;
use playpass::{
    APP_NAME, ConfigManager, LogManager, PassProcessor, PlayOnClient, QueueValidator, RunMode,
    TracingSink, VERSION,
};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "playpass", version, about = "Queue PlayOn videos into PlayLater")]
struct Args {
    /// Rule file to run
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    config: Utf8PathBuf,

    /// Submit matching videos to PlayLater (otherwise preview only)
    #[arg(short, long)]
    queue: bool,

    /// Record matching videos as handled without queueing them
    #[arg(short, long)]
    skip: bool,

    /// Show every checked item and folder in the pass log
    #[arg(short, long)]
    verbose: bool,

    /// Write a starter rule file to CONFIG and exit
    #[arg(long)]
    init: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("PlayPass Auto Queueing Engine Version {}", VERSION);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config_manager = ConfigManager::new(&args.config);

    if args.init {
        config_manager.init_config()?;
        println!("Wrote starter config to {}", config_manager.config_path());
        return Ok(());
    }

    let config = config_manager.load_config()?;
    let settings = &config.settings;

    // Held until the end of the run so buffered log lines are flushed
    let _log_guard = playpass::logging::setup_logging_with_console(
        &settings.logging.log_dir,
        &settings.logging.log_prefix,
        settings.logging.debug,
        settings.logging.console,
    )?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let mode = RunMode {
        queue: args.queue,
        skip: args.skip,
    };
    if mode.skip {
        tracing::info!("Skip mode: matching videos are recorded without being queued");
    } else if !mode.queue {
        tracing::info!("Preview mode: pass --queue to submit videos");
    }

    let queue_list =
        build_queue_list(&settings.queue_list).context("Failed to open the queue list")?;
    let validator = QueueValidator::with_limits(queue_list, &settings.limits);
    let client = PlayOnClient::from_settings(&settings.playon)
        .context("Failed to create the PlayOn client")?;
    tracing::info!("Using PlayOn server at {}:{}", client.host(), client.port());

    let log = LogManager::new()
        .with_sink(TracingSink::new(args.verbose || settings.logging.verbose));

    let processor = PassProcessor::new(&client, &log, &validator).with_mode(mode);
    processor.run_passes(&config.passes());
    processor.metrics().log_summary();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["playpass"]);
        assert_eq!(args.config, DEFAULT_CONFIG_FILE);
        assert!(!args.queue);
        assert!(!args.skip);
        assert!(!args.verbose);
        assert!(!args.init);
    }

    #[test]
    fn test_args_flags() {
        let args = Args::parse_from(["playpass", "-q", "--verbose", "rules.yaml"]);
        assert_eq!(args.config, "rules.yaml");
        assert!(args.queue);
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_config_fails() {
        let args = Args::parse_from(["playpass", "does/not/exist.yaml"]);
        let err = run(args).unwrap_err();
        assert_eq!(err.to_string(), "Config file not found: does/not/exist.yaml");
    }
}
