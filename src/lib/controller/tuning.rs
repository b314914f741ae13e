use snafu::ensure;

use crate::config;
use crate::error::{ConfigError, TuningSnafu};

/// Gains and limits shared by the heading-hold primitives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionTuning {
    /// Heading gain while turning in place.
    pub turn_gain: f32,
    /// Heading gain while holding a line during straight travel.
    pub drive_gain: f32,
    pub heading_threshold_deg: f32,
    /// Give up on a primitive after this many seconds. `None` waits forever.
    pub timeout_s: Option<f32>,
    /// How long the blocking driver yields while a step is pausing.
    pub pause_poll_ms: u32,
}

impl MotionTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.turn_gain.is_finite() && self.turn_gain > 0.0,
            TuningSnafu { name: "turn_gain" }
        );
        ensure!(
            self.drive_gain.is_finite() && self.drive_gain > 0.0,
            TuningSnafu { name: "drive_gain" }
        );
        ensure!(
            self.heading_threshold_deg.is_finite() && self.heading_threshold_deg >= 0.0,
            TuningSnafu {
                name: "heading_threshold_deg"
            }
        );
        if let Some(timeout) = self.timeout_s {
            ensure!(
                timeout.is_finite() && timeout > 0.0,
                TuningSnafu { name: "timeout_s" }
            );
        }
        ensure!(
            self.pause_poll_ms > 0,
            TuningSnafu {
                name: "pause_poll_ms"
            }
        );
        Ok(())
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout_s.map(seconds_to_ms)
    }
}

impl Default for MotionTuning {
    fn default() -> Self {
        MotionTuning {
            turn_gain: config::TURN_GAIN,
            drive_gain: config::DRIVE_GAIN,
            heading_threshold_deg: config::HEADING_THRESHOLD_DEG,
            timeout_s: None,
            pause_poll_ms: config::PAUSE_POLL_MS,
        }
    }
}

pub(crate) fn seconds_to_ms(seconds: f32) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    libm::roundf(seconds * 1000.0) as u64
}
