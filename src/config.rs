//! Player settings and command line options
//!
//! Settings live in `<data_dir>/zerfall/settings.json`. Command line flags
//! override whatever the file says. Neither has any effect on game logic,
//! only on output timing and audio volume.

use crate::output::Timing;
use crate::{GameError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

/// Persisted player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub reduced_motion: bool,
    pub audio_enabled: bool,
    pub type_speed_ms: u64,
    pub type_speed_fast_ms: u64,
    pub type_speed_glitch_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            audio_enabled: true,
            type_speed_ms: 30,
            type_speed_fast_ms: 10,
            type_speed_glitch_ms: 6,
        }
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| GameError::InvalidSettings(e.to_string()))
    }

    /// Load settings from a file, falling back to defaults.
    ///
    /// A missing file is normal. A broken one is logged and ignored.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        match Self::from_json(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Output timing for these settings
    pub fn timing(&self) -> Timing {
        if self.reduced_motion {
            Timing::instant()
        } else {
            Timing {
                normal_ms: self.type_speed_ms,
                fast_ms: self.type_speed_fast_ms,
                glitch_ms: self.type_speed_glitch_ms,
                animate: true,
            }
        }
    }

    pub fn volume(&self) -> f32 {
        if self.audio_enabled {
            0.3
        } else {
            0.0
        }
    }
}

/// Default directory for saves and settings
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("zerfall")
}

/// Command line options
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "zerfall", version, about = "ZERFALL PROTOKOLL - a terminal that is falling apart")]
pub struct Cli {
    /// Directory holding the save and settings files
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Print text instantly and skip animations
    #[arg(long)]
    pub reduced_motion: bool,

    /// Disable audio cues
    #[arg(long)]
    pub mute: bool,

    /// Start over without loading the saved game
    #[arg(long)]
    pub fresh: bool,

    /// Write the log here instead of the state directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir().join(SETTINGS_FILE)
    }

    /// Apply flag overrides on top of loaded settings
    pub fn apply(&self, settings: &mut Settings) {
        if self.reduced_motion {
            settings.reduced_motion = true;
        }
        if self.mute {
            settings.audio_enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings = Settings::from_json(r#"{"reduced_motion": true}"#).unwrap();
        assert!(settings.reduced_motion);
        assert!(settings.audio_enabled);
        assert_eq!(settings.type_speed_ms, 30);
    }

    #[test]
    fn test_malformed_settings_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ nope").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_missing_settings_file_falls_back() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Settings::load(&dir.path().join("absent.json")), Settings::default());
    }

    #[test]
    fn test_reduced_motion_makes_output_instant() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(settings.timing(), Timing::instant());
    }

    #[test]
    fn test_cli_overrides_settings() {
        let cli = Cli::parse_from(["zerfall", "--mute", "--reduced-motion", "--data-dir", "/tmp/z"]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert!(!settings.audio_enabled);
        assert!(settings.reduced_motion);
        assert_eq!(settings.volume(), 0.0);
        assert_eq!(cli.settings_path(), PathBuf::from("/tmp/z").join(SETTINGS_FILE));
    }
}
