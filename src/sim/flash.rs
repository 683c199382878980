//! Alarm overlay pulse

use crate::consts::{FLASH_PEAK_ALPHA, FLASH_RATE};

/// Overlay alpha after `elapsed` seconds of alarm.
///
/// A sine pulse at [`FLASH_RATE`] rad/s between 0 and [`FLASH_PEAK_ALPHA`],
/// starting at half peak.
#[inline]
pub fn flash_alpha(elapsed: f32) -> f32 {
    (0.5 * ((elapsed * FLASH_RATE).sin() + 1.0) * FLASH_PEAK_ALPHA).clamp(0.0, 1.0)
}
