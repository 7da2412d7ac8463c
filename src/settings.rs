//! Host settings
//!
//! Read from a JSON file next to the binary. Every field has a default, so
//! a missing file or a partial one is fine.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_TICK_HZ, MAX_SUBSTEPS};
use crate::tuning::Tuning;

/// Settings file looked up when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "maze_chase.json";
pub const DEFAULT_HIGHSCORE_PATH: &str = "maze_chase_highscore.txt";

/// Why a settings file could not be used
#[derive(Debug)]
pub enum SettingsError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            SettingsError::Parse { path, source } => {
                write!(f, "invalid settings in {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            SettingsError::Parse { source, .. } => Some(source),
        }
    }
}

/// Host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulation rate (ticks per second)
    pub tick_hz: u32,
    /// Cap on ticks run per rendered frame
    pub max_substeps: u32,
    pub render_fps: u32,
    /// Fixed RNG seed; time-derived when absent
    pub seed: Option<u64>,
    pub highscore_path: PathBuf,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_hz: DEFAULT_TICK_HZ,
            max_substeps: MAX_SUBSTEPS,
            render_fps: 30,
            seed: None,
            highscore_path: PathBuf::from(DEFAULT_HIGHSCORE_PATH),
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Read and parse a settings file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(settings.sanitized())
    }

    /// Like [`Settings::load`], falling back to defaults. A missing file is
    /// silent; anything else is logged.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Fixed simulation timestep (seconds)
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_hz as f32
    }

    /// Clamp values the host loop cannot work with
    pub fn sanitized(mut self) -> Self {
        if self.tick_hz == 0 {
            log::warn!("tick_hz must be positive, using {}", DEFAULT_TICK_HZ);
            self.tick_hz = DEFAULT_TICK_HZ;
        }
        self.max_substeps = self.max_substeps.max(1);
        self.render_fps = self.render_fps.clamp(1, 240);
        self.tuning = self.tuning.sanitized();
        self
    }
}
