use super::RunObserver;
use crate::engine::RunEvent;
use crate::models::RunCounters;
use camino::Utf8Path;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "  {spinner:.cyan} Converting [{bar:30.cyan/dim}] {pos}/{len} files ({elapsed})";

/// CLI observer: echoes log lines above an indicatif progress bar.
///
/// - Before `Total`: spinner (scan in progress)
/// - After `Total`: bar sized to the number of planned files
/// - On `Done`: bar cleared, summary and log location printed
pub struct TerminalObserver {
    bar: ProgressBar,
    echo_log: bool,
}

impl TerminalObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_message("Scanning input folder...");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self {
            bar,
            echo_log: true,
        }
    }

    /// Observer that tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            echo_log: false,
        }
    }

    /// Current (position, length) of the progress bar.
    pub fn progress(&self) -> (u64, Option<u64>) {
        (self.bar.position(), self.bar.length())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn print_summary(&self, counters: &RunCounters, log_path: &Utf8Path) {
        if self.echo_log {
            println!("Summary: {}", counters);
            println!("Log: {}", log_path);
        }
    }
}

impl Default for TerminalObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RunObserver for TerminalObserver {
    fn on_event(&mut self, event: &RunEvent) {
        match event {
            RunEvent::Total(total) => {
                self.bar.set_style(Self::bar_style());
                self.bar.set_length(*total as u64);
                self.bar.set_position(0);
            }
            RunEvent::Progress(index) => {
                self.bar.set_position(*index as u64);
            }
            RunEvent::LogLine(line) => {
                if self.echo_log {
                    self.bar.println(line);
                }
            }
            RunEvent::Done { counters, log_path } => {
                self.bar.finish_and_clear();
                self.print_summary(counters, log_path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_progress_follows_events() {
        let mut observer = TerminalObserver::hidden();

        observer.on_event(&RunEvent::Total(4));
        assert_eq!(observer.progress(), (0, Some(4)));

        observer.on_event(&RunEvent::Progress(1));
        observer.on_event(&RunEvent::LogLine("12:00:00 [ok]   a.laz -> a.las".into()));
        observer.on_event(&RunEvent::Progress(2));
        assert_eq!(observer.progress().0, 2);
    }

    #[test]
    fn test_done_finishes_bar() {
        let mut observer = TerminalObserver::hidden();
        observer.on_event(&RunEvent::Total(1));
        observer.on_event(&RunEvent::Progress(1));
        observer.on_event(&RunEvent::Done {
            counters: RunCounters {
                converted: 1,
                skipped: 0,
                failed: 0,
            },
            log_path: Utf8PathBuf::from("/out/convert_20240101_000000.log"),
        });

        assert!(observer.bar.is_finished());
    }
}
