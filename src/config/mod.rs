use crate::models::Settings;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File, FileFormat};
use std::fmt;
use std::fs;

/// Prefix for environment overrides, e.g. `LAZCONV_OVERWRITE_EXISTING=true`.
pub const ENV_PREFIX: &str = "LAZCONV";

/// Settings file name inside the configuration directory.
pub const SETTINGS_FILE: &str = "lazconv.yaml";

/// Origin of the file layer of the loaded settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    File(Utf8PathBuf),
    Defaults,
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsSource::File(path) => write!(f, "{}", path),
            SettingsSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Configuration manager for loading and saving the YAML settings file.
///
/// Settings are layered: built-in defaults, then `lazconv.yaml`, then `LAZCONV_*`
/// environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `lazconv.yaml` (created if missing)
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE),
            config_dir,
        })
    }

    /// Where [`load_settings`](Self::load_settings) takes file-level values from.
    pub fn settings_source(&self) -> SettingsSource {
        if self.settings_path.is_file() {
            SettingsSource::File(self.settings_path.clone())
        } else {
            SettingsSource::Defaults
        }
    }

    /// Load settings, falling back to defaults for anything not configured.
    ///
    /// Nothing is logged here since the log directory itself comes from these settings;
    /// callers report [`settings_source`](Self::settings_source) once logging is up.
    pub fn load_settings(&self) -> Result<Settings> {
        let settings: Settings = Config::builder()
            .add_source(
                File::new(self.settings_path.as_str(), FileFormat::Yaml).required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        Ok(settings)
    }

    /// Write a settings file holding the defaults.
    ///
    /// An existing file is only replaced when `force` is set.
    pub fn init_settings(&self, force: bool) -> Result<()> {
        if self.settings_path.exists() && !force {
            bail!(
                "Settings file already exists: {} (use --force to replace it)",
                self.settings_path
            );
        }
        self.save_settings(&Settings::default())
    }

    /// Save settings to `lazconv.yaml`.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}
