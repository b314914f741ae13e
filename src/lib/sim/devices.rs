//! Device handles onto a [`SimWorld`].

use crate::controller::drivetrain::Drivetrain;
use crate::field::Lane;
use crate::interfaces::{
    ArmPosition, Clock, CollectorState, DriveActuator, HeadingSource, LaneClassifier, Mechanism,
    RunSignal, ServoMode,
};
use crate::motion::pilot::{Pilot, Robot};
use crate::sim::world::SimWorld;

pub struct SimImu<'a>(pub &'a SimWorld);

impl HeadingSource for SimImu<'_> {
    fn raw_heading(&mut self) -> f32 {
        self.0.imu_heading()
    }

    fn reset_yaw(&mut self) {
        self.0.reset_imu();
    }
}

/// One wheel motor, by index: front left, rear left, front right, rear right.
pub struct SimWheel<'a> {
    world: &'a SimWorld,
    index: usize,
}

impl<'a> SimWheel<'a> {
    pub fn new(world: &'a SimWorld, index: usize) -> Self {
        SimWheel { world, index }
    }
}

impl DriveActuator for SimWheel<'_> {
    fn set_target_position(&mut self, ticks: i32) {
        self.world.update_wheel(self.index, |w| w.target = ticks);
    }

    fn current_position(&mut self) -> i32 {
        self.world.wheel_position(self.index)
    }

    fn set_power(&mut self, power: f32) {
        let power = power.clamp(-1.0, 1.0);
        self.world.update_wheel(self.index, |w| w.power = power);
    }

    fn is_busy(&mut self) -> bool {
        self.world.wheel_busy(self.index)
    }

    fn set_mode(&mut self, mode: ServoMode) {
        self.world.update_wheel(self.index, |w| w.mode = mode);
    }
}

pub struct SimMechanism<'a>(pub &'a SimWorld);

impl Mechanism for SimMechanism<'_> {
    fn tick(&mut self) {
        self.0.tick_mechanism();
    }

    fn set_collector(&mut self, state: CollectorState) {
        self.0.set_collector(state);
    }

    fn set_arm(&mut self, position: ArmPosition) {
        self.0.set_arm(position);
    }

    fn arm_position(&mut self) -> i32 {
        self.0.arm_position()
    }
}

pub struct SimClock<'a>(pub &'a SimWorld);

impl Clock for SimClock<'_> {
    fn now_ms(&self) -> u64 {
        self.0.now_ms()
    }
}

/// Match signal. Every `is_running` poll is one physics step.
pub struct SimSignal<'a>(pub &'a SimWorld);

impl RunSignal for SimSignal<'_> {
    fn is_running(&mut self) -> bool {
        self.0.advance();
        self.0.is_running()
    }

    fn is_cancelled(&mut self) -> bool {
        self.0.is_cancelled()
    }

    fn wait(&mut self, duration_ms: u32) {
        self.0.advance_ms(duration_ms as u64);
    }
}

/// Classifier that always sees the same lane.
pub struct SimLane(pub Lane);

impl LaneClassifier for SimLane {
    fn selection(&mut self) -> Lane {
        self.0
    }
}

pub type SimDrivetrain<'a> = Drivetrain<SimWheel<'a>, SimWheel<'a>, SimWheel<'a>, SimWheel<'a>>;
pub type SimRobot<'a> = Robot<SimImu<'a>, SimDrivetrain<'a>, SimMechanism<'a>, SimClock<'a>>;
pub type SimPilot<'a> = Pilot<SimImu<'a>, SimDrivetrain<'a>, SimMechanism<'a>, SimClock<'a>>;

impl SimWorld {
    /// All devices wired to this world, wheels mounted as the world expects.
    pub fn robot(&self) -> SimRobot<'_> {
        Robot {
            imu: SimImu(self),
            drive: Drivetrain::new(
                SimWheel::new(self, 0),
                SimWheel::new(self, 1),
                SimWheel::new(self, 2),
                SimWheel::new(self, 3),
                self.params().directions,
            ),
            mechanism: SimMechanism(self),
            clock: SimClock(self),
        }
    }

    pub fn signal(&self) -> SimSignal<'_> {
        SimSignal(self)
    }
}
