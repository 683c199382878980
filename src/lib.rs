//! Laser Tripwire - line-of-sight intrusion detection for 2D scenes
//!
//! Core modules:
//! - `sim`: Deterministic detection logic (ray classification, alarm state machine)
//! - `renderer`: Beam/overlay mesh generation from render parameters
//! - `settings`: Operator-facing detector configuration
//! - `error`: Error types for construction, configuration and hierarchy walks

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{DetectorError, HierarchyError, SettingsError};
pub use settings::DetectorSettings;

use glam::Vec2;

/// Detector configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz physics step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default beam reach (world units)
    pub const DEFAULT_LASER_LENGTH: f32 = 500.0;
    /// Interval between repeating "alarm active" notifications (seconds)
    pub const ALARM_TICK_INTERVAL: f32 = 0.5;
    /// Shortest accepted alarm tick interval (seconds)
    pub const MIN_TICK_INTERVAL: f32 = 1.0e-3;
    /// Most repeating fires reported by one timer advance; older backlog is dropped
    pub const MAX_TIMER_CATCHUP: u32 = 8;
    /// Ray collision mask (layer 1)
    pub const DEFAULT_COLLISION_MASK: u32 = 1;

    /// Overlay pulse angular rate (rad/s)
    pub const FLASH_RATE: f32 = 10.0;
    /// Overlay pulse peak alpha
    pub const FLASH_PEAK_ALPHA: f32 = 0.3;

    /// Beam line width
    pub const BEAM_WIDTH: f32 = 3.0;
    /// Side length of the square alarm overlay centered on the detector
    pub const OVERLAY_SIZE: f32 = 100.0;

    /// Upper bound on parent links followed by an ancestor walk
    pub const MAX_ANCESTOR_DEPTH: usize = 4096;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Rotate a vector counter-clockwise by `theta` radians
#[inline]
pub fn rotate(v: Vec2, theta: f32) -> Vec2 {
    Vec2::from_angle(theta).rotate(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - FRAC_PI_2).abs() < 1e-5);
        assert!((normalize_angle(-1.5 * PI) - FRAC_PI_2).abs() < 1e-5);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::X, FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
        assert!((polar_to_cartesian(2.0, FRAC_PI_2) - Vec2::new(0.0, 2.0)).length() < 1e-5);
    }
}
