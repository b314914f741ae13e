//! Device seams.
//!
//! The control core never talks to hardware directly. Each collaborator is a
//! small trait; the firmware, the simulator in [`crate::sim`] and test doubles
//! all plug in here. Every call is synchronous.

use crate::field::Lane;

/// Yaw source, in degrees, counter-clockwise positive.
pub trait HeadingSource {
    /// Current yaw as reported by the sensor, before any offset is applied.
    fn raw_heading(&mut self) -> f32;

    /// Zero the sensor's own yaw reference.
    fn reset_yaw(&mut self);
}

/// Closed-loop mode of a wheel motor controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ServoMode {
    /// Run to the target position with `|power|` as the speed limit.
    Position,
    /// Track the commanded power as a speed.
    #[default]
    Velocity,
}

/// One wheel motor with an integrated encoder.
pub trait DriveActuator {
    fn set_target_position(&mut self, ticks: i32);

    fn current_position(&mut self) -> i32;

    /// Power in [-1, 1].
    fn set_power(&mut self, power: f32);

    /// `true` while a position move has not arrived.
    fn is_busy(&mut self) -> bool;

    fn set_mode(&mut self, mode: ServoMode);
}

/// One-shot lane detection.
pub trait LaneClassifier {
    fn selection(&mut self) -> Lane;
}

/// Collector door positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CollectorState {
    #[default]
    Closed,
    HalfOpen,
    Open,
}

/// Named arm set points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArmPosition {
    #[default]
    Load,
    Carry,
    Deliver,
}

/// Scoring mechanism.
///
/// `tick` must be called once per control iteration so the mechanism can run
/// its own loops while the drivetrain is busy.
pub trait Mechanism {
    fn tick(&mut self);

    fn set_collector(&mut self, state: CollectorState);

    fn set_arm(&mut self, position: ArmPosition);

    /// Arm encoder reading in ticks.
    fn arm_position(&mut self) -> i32;
}

/// Match state as seen by the robot.
pub trait RunSignal {
    fn is_running(&mut self) -> bool;

    fn is_cancelled(&mut self) -> bool;

    /// Block for `duration_ms`.
    fn wait(&mut self, duration_ms: u32);
}

/// Monotonic time since program start.
pub trait Clock {
    fn now_ms(&self) -> u64;

    fn elapsed_ms(&self, since_ms: u64) -> u64 {
        self.now_ms().saturating_sub(since_ms)
    }
}
