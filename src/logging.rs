use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the application log: `<log_dir>/<log_prefix>.<YYYY-MM-DD>`, rotated daily.
///
/// This is the diagnostic log of the program itself. Conversion results go to each
/// run's `convert_<timestamp>.log` in the output folder instead.
///
/// With `console_output`, events are mirrored to stderr so they do not interleave
/// with the progress bar on stdout. The returned guard flushes the background writer
/// when dropped and must outlive every logging call.
pub fn setup_logging(
    log_dir: &str,
    log_prefix: &str,
    debug_mode: bool,
    console_output: bool,
) -> Result<WorkerGuard> {
    let log_dir = Utf8Path::new(log_dir);
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir))?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, log_prefix));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    let console_layer = console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(level_filter(debug_mode))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!(
        "Application log at {}/{} (console={})",
        log_dir,
        log_prefix,
        console_output
    );

    Ok(guard)
}

fn level_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::new(if debug_mode { "debug" } else { "info" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_directory_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("nested/logs");
        let log_dir = log_dir.to_str().unwrap();

        // Installing may fail if another test already set the global subscriber;
        // the directory exists either way
        let _ = setup_logging(log_dir, "lazconv", false, false);

        assert!(Utf8Path::new(log_dir).is_dir());
    }

    #[test]
    fn test_level_follows_debug_mode() {
        assert_eq!(level_filter(true).to_string(), "debug");
        assert_eq!(level_filter(false).to_string(), "info");
    }
}
