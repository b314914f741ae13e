use libm::fmodf;
use num_traits::{clamp, Float};

use crate::field::Alliance;

/// Past this magnitude the error is pre-reduced with a float remainder so the
/// unwrap loops below stay short.
const WIDE_ANGLE_DEG: f32 = 720.0;

/// Wrap an angle into (-180, 180] degrees.
///
/// Unwraps by whole turns so the sign convention is kept: positive is
/// counter-clockwise and exactly -180 maps to +180. Non-finite input is
/// returned unchanged.
pub fn normalize(angle_deg: f32) -> f32 {
    if !angle_deg.is_finite() {
        return angle_deg;
    }

    let mut angle = angle_deg;
    if angle.abs() >= WIDE_ANGLE_DEG {
        angle = fmodf(angle, 360.0);
    }
    while angle > 180.0 {
        angle -= 360.0;
    }
    while angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

/// Proportional steering correction in [-1, 1].
///
/// `raw_heading - heading_offset` is the robot-frame heading; the wrapped
/// error to `desired` is scaled by `gain` and saturated.
pub fn correction(desired: f32, raw_heading: f32, heading_offset: f32, gain: f32) -> f32 {
    let error = normalize(desired - (raw_heading - heading_offset));
    clamp(error * gain, -1.0, 1.0)
}

/// Reflect a field heading for the alliance that plays the mirrored side.
pub fn mirror(heading_deg: f32, alliance: Alliance, mirrored: bool) -> f32 {
    if mirrored && alliance.is_reflected() {
        -heading_deg
    } else {
        heading_deg
    }
}

/// One control iteration's view of the heading.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeadingState {
    pub raw_heading: f32,
    pub heading_offset: f32,
    pub robot_heading: f32,
    /// Wrapped error to the target, in (-180, 180].
    pub error: f32,
}

/// Holds the offset between the sensor's yaw and the robot frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadingTracker {
    offset: f32,
}

impl HeadingTracker {
    pub fn new() -> Self {
        Self { offset: 0.0 }
    }

    /// Make the current raw heading the new zero.
    pub fn reset(&mut self, raw_heading: f32) {
        self.offset = raw_heading;
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn state(&self, desired: f32, raw_heading: f32) -> HeadingState {
        let robot_heading = raw_heading - self.offset;
        HeadingState {
            raw_heading,
            heading_offset: self.offset,
            robot_heading,
            error: normalize(desired - robot_heading),
        }
    }

    pub fn correction(&self, desired: f32, raw_heading: f32, gain: f32) -> f32 {
        correction(desired, raw_heading, self.offset, gain)
    }
}
