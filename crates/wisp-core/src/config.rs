// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runtime configuration supplied once at start-up.

use crate::control::FrameRate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a [`RuntimeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for this struct.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The values are inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Frame loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Initial target rate in frames per second.
    pub target_fps: u32,
    /// Rate below which adaptive scaling never drops.
    pub minimum_fps: u32,
    /// Whether the controller may change the target rate on its own.
    pub adaptive_scaling: bool,
    /// Slots in the entity table.
    pub entity_capacity: usize,
    /// Slots in the region table.
    pub region_capacity: usize,
    /// Maximum events recorded per frame.
    pub event_capacity: usize,
    /// Whether the pipeline sleeps out the rest of each frame.
    pub frame_limiter: bool,
    /// Frames between telemetry summaries.
    pub telemetry_interval_frames: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target_fps: 24,
            minimum_fps: 12,
            adaptive_scaling: true,
            entity_capacity: 64,
            region_capacity: 32,
            event_capacity: 128,
            frame_limiter: true,
            telemetry_interval_frames: 300,
        }
    }
}

impl RuntimeConfig {
    /// Parses a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serializes the config as pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects configurations that cannot be run as written.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps < self.minimum_fps {
            return Err(ConfigError::Invalid(format!(
                "target_fps ({}) is below minimum_fps ({})",
                self.target_fps, self.minimum_fps
            )));
        }
        for (name, value) in [
            ("entity_capacity", self.entity_capacity),
            ("region_capacity", self.region_capacity),
            ("event_capacity", self.event_capacity),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }

    /// Returns a copy with both rates snapped onto the ladder and the target
    /// raised to at least the floor.
    pub fn sanitized(&self) -> Self {
        let minimum = FrameRate::at_or_below(self.minimum_fps);
        let target = FrameRate::at_or_below(self.target_fps).max(minimum);
        Self {
            target_fps: target.fps(),
            minimum_fps: minimum.fps(),
            ..self.clone()
        }
    }

    /// The target rate as a ladder rung.
    pub fn target_rate(&self) -> FrameRate {
        FrameRate::at_or_below(self.target_fps)
    }

    /// The floor rate as a ladder rung.
    pub fn minimum_rate(&self) -> FrameRate {
        FrameRate::at_or_below(self.minimum_fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = RuntimeConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.target_rate(), FrameRate::Fps24);
        assert_eq!(cfg.minimum_rate(), FrameRate::Fps12);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let cfg = RuntimeConfig::from_json(r#"{ "target_fps": 30, "frame_limiter": false }"#)
            .unwrap();
        assert_eq!(cfg.target_fps, 30);
        assert!(!cfg.frame_limiter);
        assert_eq!(cfg.minimum_fps, 12);
        assert_eq!(cfg.entity_capacity, 64);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = RuntimeConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = RuntimeConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validate_rejects_target_below_floor() {
        let cfg = RuntimeConfig {
            target_fps: 10,
            minimum_fps: 15,
            ..RuntimeConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let cfg = RuntimeConfig {
            event_capacity: 0,
            ..RuntimeConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("event_capacity"));
    }

    #[test]
    fn test_sanitized_snaps_to_ladder() {
        let cfg = RuntimeConfig {
            target_fps: 9,
            minimum_fps: 11,
            ..RuntimeConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.minimum_fps, 10);
        assert_eq!(cfg.target_fps, 10);

        let cfg = RuntimeConfig {
            target_fps: 500,
            ..RuntimeConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.target_fps, 60);
    }

    #[test]
    fn test_json_round_trip_keeps_values() {
        let cfg = RuntimeConfig {
            target_fps: 15,
            ..RuntimeConfig::default()
        };
        let back = RuntimeConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }
}
