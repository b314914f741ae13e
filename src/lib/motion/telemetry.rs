use log::trace;

use crate::controller::heading::HeadingState;
use crate::controller::mixer::{MotionCommand, WheelCommand};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionKind {
    DriveStraight,
    TurnToHeading,
    HoldHeading,
}

/// Everything one control iteration computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSample {
    pub motion: MotionKind,
    pub target_heading: f32,
    pub heading: HeadingState,
    pub command: MotionCommand,
    pub wheels: WheelCommand,
    /// Encoder targets, straight drives only.
    pub targets: Option<[i32; 4]>,
    pub positions: Option<[i32; 4]>,
}

/// Receives a [`ControlSample`] per iteration. Owned by the caller.
pub trait TelemetrySink {
    fn record(&mut self, sample: &ControlSample);
}

impl TelemetrySink for () {
    fn record(&mut self, _sample: &ControlSample) {}
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for &mut T {
    fn record(&mut self, sample: &ControlSample) {
        (**self).record(sample);
    }
}

/// Forwards samples to the `log` facade at trace level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn record(&mut self, s: &ControlSample) {
        trace!(
            "{:?} target {:.1} heading {:.1} error {:.1} drive {:.2} turn {:.2} wheels {:.2}/{:.2} pos {:?}",
            s.motion,
            s.target_heading,
            s.heading.robot_heading,
            s.heading.error,
            s.command.drive,
            s.command.turn,
            s.wheels.left,
            s.wheels.right,
            s.positions,
        );
    }
}
