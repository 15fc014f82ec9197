use crate::models::{Direction, RunConfig, Settings};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default configuration directory, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "lazconv_data";

#[derive(Debug, Parser)]
#[command(name = "lazconv")]
#[command(about = "Batch LAZ <-> LAS point cloud converter", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding lazconv.yaml
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: Utf8PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Mirror the application log to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert every matching file under INPUT into OUTPUT
    Convert(ConvertArgs),
    /// Print the effective settings, or write a default settings file
    Settings {
        /// Write lazconv.yaml with default values
        #[arg(long)]
        init: bool,

        /// Replace an existing lazconv.yaml when used with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input folder, searched recursively
    pub input: Utf8PathBuf,

    /// Output folder, created if missing
    pub output: Utf8PathBuf,

    /// Conversion direction (defaults to the configured direction)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Write every output directly into OUTPUT instead of mirroring subfolders
    #[arg(long, conflicts_with = "preserve")]
    pub flatten: bool,

    /// Mirror input subfolders under OUTPUT even if settings say otherwise
    #[arg(long)]
    pub preserve: bool,

    /// Replace outputs that already exist
    #[arg(long, conflicts_with = "no_overwrite")]
    pub overwrite: bool,

    /// Skip outputs that already exist even if settings say otherwise
    #[arg(long)]
    pub no_overwrite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Auto,
    LazToLas,
    LasToLaz,
}

impl From<ModeArg> for Direction {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => Direction::Auto,
            ModeArg::LazToLas => Direction::CompressedToUncompressed,
            ModeArg::LasToLaz => Direction::UncompressedToCompressed,
        }
    }
}

impl ConvertArgs {
    /// Build a run configuration; command-line flags win over saved settings.
    pub fn to_run_config(&self, settings: &Settings) -> RunConfig {
        let direction = self
            .mode
            .map(Direction::from)
            .unwrap_or(settings.default_direction);

        RunConfig::new(self.input.clone(), self.output.clone())
            .with_direction(direction)
            .with_preserve_structure(flag_override(
                self.preserve,
                self.flatten,
                settings.preserve_structure,
            ))
            .with_overwrite_existing(flag_override(
                self.overwrite,
                self.no_overwrite,
                settings.overwrite_existing,
            ))
    }
}

/// Resolve an on/off flag pair against the saved setting.
fn flag_override(on: bool, off: bool, saved: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => saved,
    }
}
