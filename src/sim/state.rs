//! Detector configuration and detection state
//!
//! Everything the detector decides from lives here; nothing in this file
//! talks to the scene, timer or notification collaborators.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hierarchy::ObjectHandle;
use crate::consts::*;
use crate::error::DetectorError;
use crate::{normalize_angle, rotate};

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const GREEN: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);
    pub const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same tint, different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Immutable detector parameters, fixed at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Beam reach along the forward axis
    pub length: f32,
    /// Beam color while no alarm is raised
    pub color_normal: Color,
    /// Beam color while alarmed; also tints the pulsing overlay
    pub color_alert: Color,
    /// Period of the repeating "alarm active" notification (seconds)
    pub tick_interval: f32,
    /// Protected subject. `None` means the alarm can never trigger.
    pub target: Option<ObjectHandle>,
    /// Collision layers the beam interacts with
    pub collision_mask: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LASER_LENGTH,
            color_normal: Color::GREEN,
            color_alert: Color::RED,
            tick_interval: ALARM_TICK_INTERVAL,
            target: None,
            collision_mask: DEFAULT_COLLISION_MASK,
        }
    }
}

impl DetectorConfig {
    /// Config guarding `target` with default length, colors and interval
    pub fn guarding(target: ObjectHandle) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(DetectorError::InvalidLength(self.length));
        }
        if !self.tick_interval.is_finite() || self.tick_interval < MIN_TICK_INTERVAL {
            return Err(DetectorError::InvalidTickInterval(self.tick_interval));
        }
        Ok(())
    }

    /// Beam endpoint (local frame) when nothing is hit
    pub fn miss_endpoint(&self) -> Vec2 {
        Vec2::new(self.length, 0.0)
    }
}

/// World transform of the detector, owned by the host and synced each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorPose {
    pub position: Vec2,
    /// Heading of the local +X (forward) axis, radians
    pub rotation: f32,
}

impl Default for DetectorPose {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
        }
    }
}

impl DetectorPose {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation: normalize_angle(rotation),
        }
    }

    /// Unit forward axis in world space
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    /// Express a world-space point in the detector's local frame
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        rotate(world - self.position, -self.rotation)
    }

    /// Express a local-frame point in world space
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.position + rotate(local, self.rotation)
    }
}

/// Alarm state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlarmPhase {
    /// Beam clear, or hitting something other than the target
    #[default]
    Inactive,
    /// Beam is hitting the target or one of its descendants
    Active,
}

/// Mutable detection state, owned exclusively by the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionState {
    pub phase: AlarmPhase,
    /// Time since the alarm last went active; meaningful only while active
    pub elapsed_since_alarm_start: f32,
    /// Beam endpoint in the detector's local frame
    pub endpoint: Vec2,
}

impl DetectionState {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            phase: AlarmPhase::Inactive,
            elapsed_since_alarm_start: 0.0,
            endpoint: config.miss_endpoint(),
        }
    }

    #[inline]
    pub fn is_alarm_active(&self) -> bool {
        self.phase == AlarmPhase::Active
    }
}

/// Everything the presenter needs for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    /// Beam end, local frame (beam starts at the local origin)
    pub beam_endpoint: Vec2,
    pub beam_color: Color,
    /// Overlay tint; alpha 0 while inactive
    pub overlay_color: Color,
}
