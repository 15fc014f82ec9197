use crate::models::{AppInfo, RunConfig};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::Write;

/// Append-only, human-readable log of one conversion run.
///
/// Lives at `<output_root>/convert_<YYYYMMDD_HHMMSS>.log`. The file is opened in append
/// mode and never truncated; two runs started within the same second share a file.
#[derive(Debug)]
pub struct RunLog {
    path: Utf8PathBuf,
    file: File,
}

impl RunLog {
    /// Log file path for a run started at `started`.
    pub fn path_for(output_root: &Utf8Path, started: DateTime<Local>) -> Utf8PathBuf {
        output_root.join(format!("convert_{}.log", started.format("%Y%m%d_%H%M%S")))
    }

    pub fn create(output_root: &Utf8Path, started: DateTime<Local>) -> Result<Self> {
        let path = Self::path_for(output_root, started);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open run log: {}", path))?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Write the run header block and return its lines.
    pub fn write_header(
        &mut self,
        info: &AppInfo,
        config: &RunConfig,
        started: DateTime<Local>,
    ) -> Vec<String> {
        let lines = vec![
            format!("=== {} {} ===", info.title, info.version),
            format!("Start: {}", started.format("%Y-%m-%d %H:%M:%S")),
            format!("Input: {}", config.input_root),
            format!("Output: {}", config.output_root),
            format!(
                "Mode: {} | Preserve: {} | Overwrite: {}",
                config.direction, config.preserve_structure, config.overwrite_existing
            ),
            String::new(),
        ];
        for line in &lines {
            self.write_raw(line);
        }
        lines
    }

    /// Append `message` prefixed with the local wall-clock time; returns the line written.
    pub fn append(&mut self, message: &str) -> String {
        let line = format!("{} {}", Local::now().format("%H:%M:%S"), message);
        self.write_raw(&line);
        line
    }

    // A failing log write never aborts the run; the line still reaches the observer.
    fn write_raw(&mut self, line: &str) {
        if let Err(e) = writeln!(self.file, "{}", line).and_then(|_| self.file.flush()) {
            tracing::warn!("Failed to write run log {}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_root(temp_dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_path_format() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let path = RunLog::path_for(Utf8Path::new("/out"), started);
        assert_eq!(path, Utf8PathBuf::from("/out/convert_20240309_070501.log"));
    }

    #[test]
    fn test_header_and_lines_are_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);
        let started = Local::now();
        let config = RunConfig::new("/data/in", root.clone());
        let info = AppInfo {
            title: "Converter".to_string(),
            version: "9.9".to_string(),
        };

        let mut log = RunLog::create(&root, started).unwrap();
        let header = log.write_header(&info, &config, started);
        let line = log.append("[proc] (1/1) a.laz");

        assert_eq!(header[0], "=== Converter 9.9 ===");
        assert!(line.ends_with(" [proc] (1/1) a.laz"));

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.starts_with("=== Converter 9.9 ===\n"));
        assert!(content.contains("Input: /data/in\n"));
        assert!(content.contains("Mode: auto | Preserve: true | Overwrite: false\n"));
        assert!(content.ends_with(&format!("{}\n", line)));
    }

    #[test]
    fn test_reopen_appends() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);
        let started = Local::now();

        RunLog::create(&root, started).unwrap().append("first");
        RunLog::create(&root, started).unwrap().append("second");

        let content = fs::read_to_string(RunLog::path_for(&root, started)).unwrap();
        assert!(content.contains("first"));
        assert!(content.contains("second"));
    }

    #[test]
    fn test_create_fails_for_missing_directory() {
        let result = RunLog::create(Utf8Path::new("/definitely/not/a/dir"), Local::now());
        assert!(result.is_err());
    }
}
