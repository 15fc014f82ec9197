//! lazconv - batch LAZ <-> LAS point cloud converter
//!
//! Main entry point for the command-line application.
//!
//! # Execution Flow
//!
//! 1. Parse the command line
//! 2. Load `lazconv.yaml` (defaults + file + `LAZCONV_*` environment overrides)
//! 3. Initialize logging -> `<log_dir>/lazconv.<date>`, then record where settings came from
//! 4. `convert`: start a run on the engine's worker thread, then poll its event channel
//!    on a current-thread tokio runtime while listening for Ctrl-C
//! 5. Exit non-zero if any file failed
//!
//! Ctrl-C asks the run to stop before its next file; the file being converted is
//! finished first and the summary is still printed.

use anyhow::{Context, Result};
use clap::Parser;
use lazconv::cli::{Cli, Commands, ConvertArgs};
use lazconv::observer::{TerminalObserver, poll_events};
use lazconv::config::SettingsSource;
use lazconv::{APP_NAME, ConfigManager, Converter, Settings, VERSION};
use std::process::ExitCode;
use std::time::Duration;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let settings = config_manager.load_settings()?;

    let _log_guard = lazconv::logging::setup_logging(
        &settings.log_dir,
        APP_NAME,
        cli.debug || settings.debug_mode,
        cli.verbose,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    match config_manager.settings_source() {
        SettingsSource::File(path) => tracing::info!("Loaded settings from {}", path),
        SettingsSource::Defaults => tracing::warn!(
            "Settings file not found at {}, using defaults",
            config_manager.settings_path()
        ),
    }

    match &cli.command {
        Commands::Convert(args) => run_convert(args, &settings),
        Commands::Settings { init, force } => {
            run_settings(&config_manager, &settings, *init, *force)
        }
    }
}

fn run_convert(args: &ConvertArgs, settings: &Settings) -> Result<ExitCode> {
    let config = args.to_run_config(settings);
    tracing::info!(
        "Convert requested: {} -> {} ({})",
        config.input_root,
        config.output_root,
        config.direction
    );

    let converter = Converter::new().with_block_size(settings.block_size);
    let mut channel = converter
        .start(config)
        .context("Failed to start conversion")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let interval = Duration::from_millis(settings.poll_interval_ms);
    let outcome = runtime.block_on(async {
        let mut observer = TerminalObserver::new();
        let drive = poll_events(&mut channel, &mut observer, interval);
        tokio::pin!(drive);

        loop {
            tokio::select! {
                outcome = &mut drive => break outcome,
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            eprintln!("Stopping after the current file...");
                            converter.request_stop();
                        }
                        Err(e) => {
                            // No signal handling available; keep observing without it
                            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                            break (&mut drive).await;
                        }
                    }
                }
            }
        }
    });

    let Some(outcome) = outcome else {
        anyhow::bail!("Conversion worker terminated unexpectedly");
    };

    tracing::info!(
        "Run complete: {} (log: {})",
        outcome.counters,
        outcome.log_path
    );

    if outcome.counters.failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_settings(
    config_manager: &ConfigManager,
    settings: &Settings,
    init: bool,
    force: bool,
) -> Result<ExitCode> {
    if init {
        config_manager.init_settings(force)?;
        println!("Wrote default settings to {}", config_manager.settings_path());
    } else {
        let yaml = serde_yaml_ng::to_string(settings).context("Failed to render settings")?;
        println!("# source: {}", config_manager.settings_source());
        print!("{}", yaml);
    }
    Ok(ExitCode::SUCCESS)
}
