//! Closed-loop heading-hold motions.
//!
//! Each motion is a small state machine: `start` issues the initial
//! commands, `step` does exactly one read, correct, mix, issue, tick pass and
//! `finish` leaves the drive stopped. [`Pilot::run_motion`] drives them to
//! completion; the path runner interleaves them with its own scheduling.

use log::debug;
use num_traits::{clamp, Float};

use crate::controller::drivetrain::{Drive, WheelTicks};
use crate::controller::heading::mirror;
use crate::controller::mixer::{mix, MotionCommand, WheelCommand};
use crate::controller::tuning::seconds_to_ms;
use crate::interfaces::{Clock, HeadingSource, Mechanism, ServoMode};
use crate::motion::pilot::Pilot;
use crate::motion::telemetry::{ControlSample, MotionKind, TelemetrySink};

/// How a blocking motion ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionOutcome {
    Converged,
    Cancelled,
    TimedOut,
}

/// Result of a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionStatus {
    Running,
    Converged,
    TimedOut,
}

pub trait Motion {
    fn kind(&self) -> MotionKind;

    fn step<H, D, M, C>(
        &mut self,
        pilot: &mut Pilot<H, D, M, C>,
        sink: &mut dyn TelemetrySink,
    ) -> MotionStatus
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock;

    /// Stop the wheels. Called exactly once, whatever ended the motion.
    fn finish<H, D, M, C>(&mut self, pilot: &mut Pilot<H, D, M, C>)
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock;
}

/// Start time and optional deadline shared by every motion.
#[derive(Clone, Copy, Debug)]
struct Timing {
    started_ms: u64,
    timeout_ms: Option<u64>,
}

impl Timing {
    fn start<H, D, M, C: Clock>(pilot: &Pilot<H, D, M, C>) -> Self {
        Timing {
            started_ms: pilot.robot.clock.now_ms(),
            timeout_ms: pilot.tuning.timeout_ms(),
        }
    }

    fn elapsed_ms<C: Clock>(&self, clock: &C) -> u64 {
        clock.elapsed_ms(self.started_ms)
    }

    fn expired<C: Clock>(&self, clock: &C) -> bool {
        match self.timeout_ms {
            Some(limit) => self.elapsed_ms(clock) >= limit,
            None => false,
        }
    }
}

/// Turn correction clamped to the motion's speed, shared by turn and hold.
fn turn_pass<H, D, M, C>(
    pilot: &mut Pilot<H, D, M, C>,
    sink: &mut dyn TelemetrySink,
    kind: MotionKind,
    max_turn: f32,
    heading_deg: f32,
) where
    H: HeadingSource,
    D: Drive,
    M: Mechanism,
    C: Clock,
{
    let raw = pilot.robot.imu.raw_heading();
    let state = pilot.heading.state(heading_deg, raw);
    let turn = clamp(
        pilot.heading.correction(heading_deg, raw, pilot.tuning.turn_gain),
        -max_turn,
        max_turn,
    );
    let wheels = mix(0.0, turn);
    pilot.robot.drive.apply(wheels);
    pilot.robot.mechanism.tick();

    sink.record(&ControlSample {
        motion: kind,
        target_heading: heading_deg,
        heading: state,
        command: MotionCommand { drive: 0.0, turn },
        wheels,
        targets: None,
        positions: None,
    });
}

/// Run all four wheels to an encoder target while holding a heading.
#[derive(Clone, Copy, Debug)]
pub struct DriveStraight {
    speed: f32,
    heading_deg: f32,
    reverse: bool,
    targets: WheelTicks,
    timing: Timing,
}

impl DriveStraight {
    pub fn start<H, D, M, C>(
        pilot: &mut Pilot<H, D, M, C>,
        speed: f32,
        distance_in: f32,
        heading_deg: f32,
        mirrored: bool,
    ) -> Self
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        let heading_deg = mirror(heading_deg, pilot.alliance, mirrored);
        let speed = speed.abs();
        let ticks = pilot.converter.ticks(distance_in);

        let drive = &mut pilot.robot.drive;
        let targets = drive.positions().offset(ticks);
        drive.set_targets(&targets);
        drive.set_mode(ServoMode::Position);
        drive.apply(mix(speed, 0.0));

        debug!(
            "drive {:.1} in ({} ticks) at {:.2}, heading {:.1}",
            distance_in, ticks, speed, heading_deg
        );
        DriveStraight {
            speed,
            heading_deg,
            reverse: distance_in < 0.0,
            targets,
            timing: Timing::start(pilot),
        }
    }

    pub fn targets(&self) -> WheelTicks {
        self.targets
    }
}

impl Motion for DriveStraight {
    fn kind(&self) -> MotionKind {
        MotionKind::DriveStraight
    }

    fn step<H, D, M, C>(
        &mut self,
        pilot: &mut Pilot<H, D, M, C>,
        sink: &mut dyn TelemetrySink,
    ) -> MotionStatus
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        if !pilot.robot.drive.is_busy() {
            return MotionStatus::Converged;
        }
        if self.timing.expired(&pilot.robot.clock) {
            return MotionStatus::TimedOut;
        }

        let raw = pilot.robot.imu.raw_heading();
        let state = pilot.heading.state(self.heading_deg, raw);
        let mut turn = pilot
            .heading
            .correction(self.heading_deg, raw, pilot.tuning.drive_gain);
        // driving backwards the same wheel speed difference turns the other way
        if self.reverse {
            turn = -turn;
        }
        let wheels = mix(self.speed, turn);
        pilot.robot.drive.apply(wheels);
        pilot.robot.mechanism.tick();

        let positions = pilot.robot.drive.positions();
        sink.record(&ControlSample {
            motion: MotionKind::DriveStraight,
            target_heading: self.heading_deg,
            heading: state,
            command: MotionCommand {
                drive: self.speed,
                turn,
            },
            wheels,
            targets: Some(self.targets.to_array()),
            positions: Some(positions.to_array()),
        });
        MotionStatus::Running
    }

    fn finish<H, D, M, C>(&mut self, pilot: &mut Pilot<H, D, M, C>)
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        let drive = &mut pilot.robot.drive;
        drive.apply(WheelCommand::STOP);
        drive.set_mode(ServoMode::Velocity);
        debug!(
            "drive done after {} ms",
            self.timing.elapsed_ms(&pilot.robot.clock)
        );
    }
}

/// Spin in place until the heading error is inside the threshold.
#[derive(Clone, Copy, Debug)]
pub struct TurnToHeading {
    speed: f32,
    heading_deg: f32,
    timing: Timing,
}

impl TurnToHeading {
    pub fn start<H, D, M, C>(
        pilot: &mut Pilot<H, D, M, C>,
        speed: f32,
        heading_deg: f32,
        mirrored: bool,
    ) -> Self
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        let heading_deg = mirror(heading_deg, pilot.alliance, mirrored);
        debug!("turn to {:.1} at {:.2}", heading_deg, speed);
        TurnToHeading {
            speed: speed.abs(),
            heading_deg,
            timing: Timing::start(pilot),
        }
    }

    pub fn heading(&self) -> f32 {
        self.heading_deg
    }
}

impl Motion for TurnToHeading {
    fn kind(&self) -> MotionKind {
        MotionKind::TurnToHeading
    }

    fn step<H, D, M, C>(
        &mut self,
        pilot: &mut Pilot<H, D, M, C>,
        sink: &mut dyn TelemetrySink,
    ) -> MotionStatus
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        let raw = pilot.robot.imu.raw_heading();
        let error = pilot.heading.state(self.heading_deg, raw).error;
        if error.abs() <= pilot.tuning.heading_threshold_deg {
            return MotionStatus::Converged;
        }
        if self.timing.expired(&pilot.robot.clock) {
            return MotionStatus::TimedOut;
        }

        turn_pass(pilot, sink, MotionKind::TurnToHeading, self.speed, self.heading_deg);
        MotionStatus::Running
    }

    fn finish<H, D, M, C>(&mut self, pilot: &mut Pilot<H, D, M, C>)
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        pilot.robot.drive.apply(WheelCommand::STOP);
    }
}

/// Steer to a heading for a fixed time, whatever the error.
#[derive(Clone, Copy, Debug)]
pub struct HoldHeading {
    speed: f32,
    heading_deg: f32,
    duration_ms: u64,
    timing: Timing,
}

impl HoldHeading {
    pub fn start<H, D, M, C>(
        pilot: &mut Pilot<H, D, M, C>,
        speed: f32,
        heading_deg: f32,
        duration_s: f32,
        mirrored: bool,
    ) -> Self
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        let heading_deg = mirror(heading_deg, pilot.alliance, mirrored);
        debug!("hold {:.1} for {:.1} s", heading_deg, duration_s);
        HoldHeading {
            speed: speed.abs(),
            heading_deg,
            duration_ms: seconds_to_ms(duration_s),
            timing: Timing::start(pilot),
        }
    }
}

impl Motion for HoldHeading {
    fn kind(&self) -> MotionKind {
        MotionKind::HoldHeading
    }

    fn step<H, D, M, C>(
        &mut self,
        pilot: &mut Pilot<H, D, M, C>,
        sink: &mut dyn TelemetrySink,
    ) -> MotionStatus
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        if self.timing.elapsed_ms(&pilot.robot.clock) >= self.duration_ms {
            return MotionStatus::Converged;
        }
        if self.timing.expired(&pilot.robot.clock) {
            return MotionStatus::TimedOut;
        }

        turn_pass(pilot, sink, MotionKind::HoldHeading, self.speed, self.heading_deg);
        MotionStatus::Running
    }

    fn finish<H, D, M, C>(&mut self, pilot: &mut Pilot<H, D, M, C>)
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        pilot.robot.drive.apply(WheelCommand::STOP);
    }
}

/// Whichever primitive a path step started.
#[derive(Clone, Copy, Debug)]
pub enum ActiveMotion {
    Drive(DriveStraight),
    Turn(TurnToHeading),
    Hold(HoldHeading),
}

impl Motion for ActiveMotion {
    fn kind(&self) -> MotionKind {
        match self {
            ActiveMotion::Drive(m) => m.kind(),
            ActiveMotion::Turn(m) => m.kind(),
            ActiveMotion::Hold(m) => m.kind(),
        }
    }

    fn step<H, D, M, C>(
        &mut self,
        pilot: &mut Pilot<H, D, M, C>,
        sink: &mut dyn TelemetrySink,
    ) -> MotionStatus
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        match self {
            ActiveMotion::Drive(m) => m.step(pilot, sink),
            ActiveMotion::Turn(m) => m.step(pilot, sink),
            ActiveMotion::Hold(m) => m.step(pilot, sink),
        }
    }

    fn finish<H, D, M, C>(&mut self, pilot: &mut Pilot<H, D, M, C>)
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        match self {
            ActiveMotion::Drive(m) => m.finish(pilot),
            ActiveMotion::Turn(m) => m.finish(pilot),
            ActiveMotion::Hold(m) => m.finish(pilot),
        }
    }
}
