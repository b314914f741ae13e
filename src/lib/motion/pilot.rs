use log::{debug, warn};

use crate::controller::distance::{DistanceConverter, DriveGeometry};
use crate::controller::drivetrain::Drive;
use crate::controller::heading::HeadingTracker;
use crate::controller::tuning::MotionTuning;
use crate::error::ConfigError;
use crate::field::Alliance;
use crate::interfaces::{Clock, HeadingSource, Mechanism, RunSignal};
use crate::motion::deliver::{DeliverSequence, DeliverStatus, DeliverTuning};
use crate::motion::primitives::{
    DriveStraight, HoldHeading, Motion, MotionOutcome, MotionStatus, TurnToHeading,
};
use crate::motion::telemetry::TelemetrySink;

/// The devices the core drives.
pub struct Robot<H, D, M, C> {
    pub imu: H,
    pub drive: D,
    pub mechanism: M,
    pub clock: C,
}

/// Static settings, validated once by [`Pilot::new`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PilotSettings {
    pub geometry: DriveGeometry,
    pub tuning: MotionTuning,
    pub deliver: DeliverTuning,
}

/// Owns the robot and everything the primitives share between runs: the
/// heading offset, the distance converter, tuning and the active alliance.
pub struct Pilot<H, D, M, C> {
    pub(crate) robot: Robot<H, D, M, C>,
    pub(crate) heading: HeadingTracker,
    pub(crate) converter: DistanceConverter,
    pub(crate) tuning: MotionTuning,
    pub(crate) deliver: DeliverTuning,
    pub(crate) alliance: Alliance,
}

/// `true` once the match is over or someone pulled the plug.
pub(crate) fn should_stop<R: RunSignal + ?Sized>(signal: &mut R) -> bool {
    !signal.is_running() || signal.is_cancelled()
}

impl<H, D, M, C> Pilot<H, D, M, C>
where
    H: HeadingSource,
    D: Drive,
    M: Mechanism,
    C: Clock,
{
    /// Validate `settings` and take ownership of the robot.
    ///
    /// On rejection the drive is commanded to zero before the error is
    /// returned.
    pub fn new(mut robot: Robot<H, D, M, C>, settings: PilotSettings) -> Result<Self, ConfigError> {
        let checked = settings
            .tuning
            .validate()
            .and_then(|_| DistanceConverter::new(&settings.geometry));

        let converter = match checked {
            Ok(converter) => converter,
            Err(e) => {
                robot.drive.stop();
                warn!("rejected pilot settings: {}", e);
                return Err(e);
            }
        };
        debug!(
            "pilot ready, {:.2} ticks/in, timeout {:?}",
            converter.ticks_per_inch(),
            settings.tuning.timeout_s
        );

        Ok(Pilot {
            robot,
            heading: HeadingTracker::new(),
            converter,
            tuning: settings.tuning,
            deliver: settings.deliver,
            alliance: Alliance::default(),
        })
    }

    /// Zero the IMU and make the current direction heading 0.
    pub fn reset_heading(&mut self) {
        self.robot.imu.reset_yaw();
        let raw = self.robot.imu.raw_heading();
        self.heading.reset(raw);
    }

    pub fn set_alliance(&mut self, alliance: Alliance) {
        self.alliance = alliance;
    }

    pub fn alliance(&self) -> Alliance {
        self.alliance
    }

    pub fn converter(&self) -> &DistanceConverter {
        &self.converter
    }

    pub fn tuning(&self) -> &MotionTuning {
        &self.tuning
    }

    pub fn heading(&self) -> &HeadingTracker {
        &self.heading
    }

    /// Current heading in the robot frame.
    pub fn robot_heading(&mut self) -> f32 {
        let raw = self.robot.imu.raw_heading();
        self.heading.state(0.0, raw).robot_heading
    }

    pub fn robot(&self) -> &Robot<H, D, M, C> {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut Robot<H, D, M, C> {
        &mut self.robot
    }

    pub fn into_robot(self) -> Robot<H, D, M, C> {
        self.robot
    }

    pub fn stop(&mut self) {
        self.robot.drive.stop();
    }

    /// Drive `distance_in` on encoders while steering to `heading_deg`.
    pub fn drive_straight<R, S>(
        &mut self,
        signal: &mut R,
        sink: &mut S,
        speed: f32,
        distance_in: f32,
        heading_deg: f32,
        mirrored: bool,
    ) -> MotionOutcome
    where
        R: RunSignal + ?Sized,
        S: TelemetrySink,
    {
        let motion = DriveStraight::start(self, speed, distance_in, heading_deg, mirrored);
        self.run_motion(signal, sink, motion)
    }

    /// Spin in place until within the heading threshold.
    pub fn turn_to_heading<R, S>(
        &mut self,
        signal: &mut R,
        sink: &mut S,
        speed: f32,
        heading_deg: f32,
        mirrored: bool,
    ) -> MotionOutcome
    where
        R: RunSignal + ?Sized,
        S: TelemetrySink,
    {
        let motion = TurnToHeading::start(self, speed, heading_deg, mirrored);
        self.run_motion(signal, sink, motion)
    }

    /// Keep steering to `heading_deg` for `duration_s` seconds.
    pub fn hold_heading<R, S>(
        &mut self,
        signal: &mut R,
        sink: &mut S,
        speed: f32,
        heading_deg: f32,
        duration_s: f32,
        mirrored: bool,
    ) -> MotionOutcome
    where
        R: RunSignal + ?Sized,
        S: TelemetrySink,
    {
        let motion = HoldHeading::start(self, speed, heading_deg, duration_s, mirrored);
        self.run_motion(signal, sink, motion)
    }

    /// Score the carried pixel. Blocks through the mechanism's pauses.
    pub fn deliver<R>(&mut self, signal: &mut R) -> MotionOutcome
    where
        R: RunSignal + ?Sized,
    {
        let mut sequence = DeliverSequence::start(self);
        loop {
            if should_stop(signal) {
                warn!("delivery cancelled");
                return MotionOutcome::Cancelled;
            }
            match sequence.step(self) {
                DeliverStatus::Running => {}
                DeliverStatus::Pausing => signal.wait(self.tuning.pause_poll_ms),
                DeliverStatus::Done => return MotionOutcome::Converged,
            }
        }
    }

    /// Step `motion` until it ends, checking `signal` once per iteration.
    pub fn run_motion<R, S, Mo>(&mut self, signal: &mut R, sink: &mut S, mut motion: Mo) -> MotionOutcome
    where
        R: RunSignal + ?Sized,
        S: TelemetrySink,
        Mo: Motion,
    {
        loop {
            if should_stop(signal) {
                motion.finish(self);
                warn!("{:?} cancelled", motion.kind());
                return MotionOutcome::Cancelled;
            }
            match motion.step(self, &mut *sink) {
                MotionStatus::Running => {}
                MotionStatus::Converged => {
                    motion.finish(self);
                    return MotionOutcome::Converged;
                }
                MotionStatus::TimedOut => {
                    motion.finish(self);
                    warn!("{:?} timed out", motion.kind());
                    return MotionOutcome::TimedOut;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use num_traits::Float;

    use super::*;
    use crate::controller::mixer::WheelCommand;
    use crate::interfaces::ServoMode;
    use crate::sim::devices::SimPilot;
    use crate::sim::world::{SimParams, SimWorld};

    fn pilot(world: &SimWorld) -> SimPilot<'_> {
        let mut pilot = Pilot::new(world.robot(), PilotSettings::default()).unwrap();
        pilot.reset_heading();
        pilot
    }

    fn all_velocity(world: &SimWorld) -> bool {
        (0..4).all(|i| world.wheel_mode(i) == ServoMode::Velocity)
    }

    #[test]
    fn turn_converges_inside_threshold() {
        let world = SimWorld::new(SimParams::default());
        let mut pilot = pilot(&world);
        let mut signal = world.signal();

        let outcome = pilot.turn_to_heading(&mut signal, &mut (), 0.4, 90.0, false);
        assert_eq!(outcome, MotionOutcome::Converged);
        assert!((pilot.robot_heading() - 90.0).abs() <= 4.0);
        assert!(world.is_stopped());
    }

    #[test]
    fn mirrored_red_turn_matches_negated_blue_turn() {
        let red_world = SimWorld::new(SimParams::default());
        let mut red = pilot(&red_world);
        red.set_alliance(Alliance::Red);
        red.turn_to_heading(&mut red_world.signal(), &mut (), 0.4, 90.0, true);

        let blue_world = SimWorld::new(SimParams::default());
        let mut blue = pilot(&blue_world);
        blue.set_alliance(Alliance::Blue);
        blue.turn_to_heading(&mut blue_world.signal(), &mut (), 0.4, -90.0, true);

        assert_eq!(red_world.yaw_deg(), blue_world.yaw_deg());
        assert_eq!(red_world.now_ms(), blue_world.now_ms());
        assert!(red_world.yaw_deg() < -80.0);
    }

    #[test]
    fn straight_drive_reaches_target_and_restores_velocity_mode() {
        let world = SimWorld::new(SimParams::default());
        let mut pilot = pilot(&world);
        let mut signal = world.signal();

        let expected = pilot.converter().ticks(-26.0);
        let outcome = pilot.drive_straight(&mut signal, &mut (), 0.2, -26.0, 0.0, false);
        assert_eq!(outcome, MotionOutcome::Converged);
        for i in 0..4 {
            assert!((world.wheel_position(i) - expected).abs() <= 10);
        }
        assert!(world.is_stopped());
        assert!(all_velocity(&world));
        assert!(pilot.robot_heading().abs() < 1.0);
    }

    #[test]
    fn straight_drive_steers_out_a_knock() {
        let world = SimWorld::new(SimParams::default());
        let mut pilot = pilot(&world);
        let mut signal = world.signal();

        let mut motion = DriveStraight::start(&mut pilot, 0.2, 26.0, 0.0, false);
        for _ in 0..5 {
            assert_eq!(motion.step(&mut pilot, &mut ()), MotionStatus::Running);
        }
        world.disturb_yaw(5.0);
        let outcome = pilot.run_motion(&mut signal, &mut (), motion);
        assert_eq!(outcome, MotionOutcome::Converged);
        assert!(pilot.robot_heading().abs() < 5.0);
    }

    #[test]
    fn hold_runs_for_its_duration() {
        let world = SimWorld::new(SimParams::default());
        let mut pilot = pilot(&world);
        let mut signal = world.signal();

        let start = world.now_ms();
        let outcome = pilot.hold_heading(&mut signal, &mut (), 0.4, 30.0, 1.5, false);
        assert_eq!(outcome, MotionOutcome::Converged);
        let elapsed = world.now_ms() - start;
        assert!((1500..1600).contains(&elapsed), "{elapsed}");
        assert!((pilot.robot_heading() - 30.0).abs() < 1.0);
        assert!(world.is_stopped());
    }

    #[test]
    fn cancellation_stops_within_one_iteration() {
        let world = SimWorld::new(SimParams::default());
        let mut pilot = pilot(&world);
        let mut signal = world.signal();
        world.cancel_at(200);

        let outcome = pilot.drive_straight(&mut signal, &mut (), 0.2, 26.0, 0.0, false);
        assert_eq!(outcome, MotionOutcome::Cancelled);
        assert_eq!(world.now_ms(), 200);
        assert!(world.is_stopped());
        assert!(all_velocity(&world));
    }

    #[test]
    fn match_end_counts_as_cancellation() {
        let world = SimWorld::new(SimParams::default());
        let mut pilot = pilot(&world);
        world.end_at(100);

        let outcome = pilot.turn_to_heading(&mut world.signal(), &mut (), 0.4, 90.0, false);
        assert_eq!(outcome, MotionOutcome::Cancelled);
        assert!(world.is_stopped());
    }

    #[test]
    fn slow_turn_times_out() {
        let world = SimWorld::new(SimParams::default());
        let settings = PilotSettings {
            tuning: MotionTuning {
                timeout_s: Some(0.5),
                ..MotionTuning::default()
            },
            ..PilotSettings::default()
        };
        let mut pilot = Pilot::new(world.robot(), settings).unwrap();
        pilot.reset_heading();

        let outcome = pilot.turn_to_heading(&mut world.signal(), &mut (), 0.01, 90.0, false);
        assert_eq!(outcome, MotionOutcome::TimedOut);
        assert!(world.now_ms() >= 500 && world.now_ms() < 600);
        assert!(world.is_stopped());
    }

    #[test]
    fn rejected_settings_leave_the_drive_stopped() {
        let world = SimWorld::new(SimParams::default());
        let mut robot = world.robot();
        robot.drive.apply(WheelCommand {
            left: 0.5,
            right: 0.5,
        });
        assert!(!world.is_stopped());

        let settings = PilotSettings {
            geometry: DriveGeometry {
                wheel_diameter_in: 0.0,
                ..DriveGeometry::default()
            },
            ..PilotSettings::default()
        };
        let err = Pilot::new(robot, settings).err();
        assert_eq!(err, Some(ConfigError::WheelDiameter { diameter: 0.0 }));
        assert!(world.is_stopped());
    }

    #[test]
    fn heading_reset_uses_current_direction() {
        let params = SimParams {
            initial_yaw_deg: 135.0,
            ..SimParams::default()
        };
        let world = SimWorld::new(params);
        let mut pilot = pilot(&world);
        assert_eq!(pilot.robot_heading(), 0.0);

        world.disturb_yaw(-20.0);
        assert!((pilot.robot_heading() + 20.0).abs() < 1e-3);
    }
}
