//! Detector settings
//!
//! The operator-facing configuration surface, loaded once from JSON before
//! the detector is built. No runtime reconfiguration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::renderer::BeamStyle;
use crate::sim::{Color, DetectorConfig, SceneWorld};

/// Detector settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    // === Detection ===
    /// Beam reach along the detector's forward axis
    pub length: f32,
    /// Name of the guarded scene object (none = never alarms)
    pub target: Option<String>,
    /// Collision layers the beam interacts with
    pub collision_mask: u32,

    // === Alarm ===
    /// Seconds between repeating "alarm active" notifications
    pub tick_interval: f32,

    // === Visuals ===
    pub color_normal: Color,
    pub color_alert: Color,
    pub beam_width: f32,
    pub overlay_size: f32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            length: DEFAULT_LASER_LENGTH,
            target: None,
            collision_mask: DEFAULT_COLLISION_MASK,

            tick_interval: ALARM_TICK_INTERVAL,

            color_normal: Color::GREEN,
            color_alert: Color::RED,
            beam_width: BEAM_WIDTH,
            overlay_size: OVERLAY_SIZE,
        }
    }
}

impl DetectorSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded detector settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolve against a scene into a validated detector config.
    ///
    /// A named target that does not exist is an error; no target is not.
    pub fn resolve(&self, scene: &SceneWorld) -> Result<DetectorConfig, SettingsError> {
        let target = match &self.target {
            Some(name) => Some(
                scene
                    .find_by_name(name)
                    .ok_or_else(|| SettingsError::UnknownTarget(name.clone()))?,
            ),
            None => {
                log::info!("No target configured - detector will never alarm");
                None
            }
        };

        let config = DetectorConfig {
            length: self.length,
            color_normal: self.color_normal,
            color_alert: self.color_alert,
            tick_interval: self.tick_interval,
            target,
            collision_mask: self.collision_mask,
        };
        config.validate()?;
        Ok(config)
    }

    /// Presentation parameters
    pub fn beam_style(&self) -> BeamStyle {
        BeamStyle {
            beam_width: self.beam_width,
            overlay_size: self.overlay_size,
        }
    }
}
