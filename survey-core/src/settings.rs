use crate::boundary::BoundarySpec;
use crate::coordinates::DisplayFrame;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_POLL_INTERVAL_MS: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub simulation_speed: f64,
    pub photo_size: u32,
    pub script_path: PathBuf,
    pub boundary: BoundarySpec,
    pub poll_interval_ms: f64,
    pub compass_failure_rate: f64,
    pub seed: u64,
    pub max_flight_seconds: Option<f64>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 600,
            fps: 30,
            simulation_speed: 25.0,
            photo_size: 19,
            script_path: PathBuf::from("lua_scripts/script.lua"),
            boundary: BoundarySpec::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            compass_failure_rate: 0.0,
            seed: 42,
            max_flight_seconds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    Read { path: PathBuf, message: String },
    Parse(String),
    Invalid { field: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "failed to read settings {}: {}", path.display(), message)
            }
            Self::Parse(message) => write!(f, "malformed settings: {}", message),
            Self::Invalid { field, reason } => write!(f, "invalid setting `{}`: {}", field, reason),
        }
    }
}

impl Error for SettingsError {}

impl SimSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|err| SettingsError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|err| SettingsError::Parse(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::invalid("width/height", "display extent must be non-empty"));
        }
        if self.fps == 0 {
            return Err(SettingsError::invalid("fps", "must be at least 1"));
        }
        if !self.simulation_speed.is_finite() || self.simulation_speed <= 0.0 {
            return Err(SettingsError::invalid("simulation_speed", "must be a positive number"));
        }
        if self.photo_size == 0 {
            return Err(SettingsError::invalid("photo_size", "must be at least 1"));
        }
        if !self.poll_interval_ms.is_finite() || self.poll_interval_ms <= 0.0 {
            return Err(SettingsError::invalid("poll_interval_ms", "must be a positive number"));
        }
        if !(0.0..=1.0).contains(&self.compass_failure_rate) {
            return Err(SettingsError::invalid("compass_failure_rate", "must lie in [0, 1]"));
        }
        if let Some(limit) = self.max_flight_seconds {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(SettingsError::invalid("max_flight_seconds", "must be a positive number"));
            }
        }
        self.boundary
            .validate()
            .map_err(|reason| SettingsError::invalid("boundary", reason))
    }

    pub fn frame(&self) -> DisplayFrame {
        DisplayFrame::new(self.width, self.height)
    }

    pub fn poll_interval_seconds(&self) -> f64 {
        self.poll_interval_ms / 1000.0
    }

    pub fn frame_interval_seconds(&self) -> f64 {
        1.0 / self.fps as f64
    }
}
