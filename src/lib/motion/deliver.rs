use log::{debug, info};

use crate::config;
use crate::controller::drivetrain::Drive;
use crate::interfaces::{ArmPosition, Clock, CollectorState, HeadingSource, Mechanism};
use crate::motion::pilot::Pilot;

/// Timing of the scoring hand-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliverTuning {
    /// Arm reading at or below which the arm is clear of the backdrop.
    pub arm_clear_ticks: i32,
    /// Let the arm settle before opening the collector.
    pub settle_ms: u32,
    /// Collector open time.
    pub release_ms: u32,
    /// Pause after the arm is sent back to load.
    pub post_delivery_ms: u32,
}

impl Default for DeliverTuning {
    fn default() -> Self {
        DeliverTuning {
            arm_clear_ticks: config::ARM_CLEAR_TICKS,
            settle_ms: config::DELIVER_SETTLE_MS,
            release_ms: config::DELIVER_RELEASE_MS,
            post_delivery_ms: config::POST_DELIVERY_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Raising,
    Settling { until_ms: u64 },
    Releasing { until_ms: u64 },
    Cooling { until_ms: u64 },
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliverStatus {
    /// Still working, call again next iteration.
    Running,
    /// Waiting on a timer, the caller may yield.
    Pausing,
    Done,
}

/// Raise the arm, drop the pixel and bring the arm home.
///
/// The mechanism is ticked on every step so its own loops keep running.
#[derive(Clone, Copy, Debug)]
pub struct DeliverSequence {
    phase: Phase,
    tuning: DeliverTuning,
}

impl DeliverSequence {
    pub fn start<H, D, M, C>(pilot: &mut Pilot<H, D, M, C>) -> Self
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        let mechanism = &mut pilot.robot.mechanism;
        mechanism.set_collector(CollectorState::Closed);
        mechanism.set_arm(ArmPosition::Deliver);
        info!("delivering");
        DeliverSequence {
            phase: Phase::Raising,
            tuning: pilot.deliver,
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn step<H, D, M, C>(&mut self, pilot: &mut Pilot<H, D, M, C>) -> DeliverStatus
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        let robot = &mut pilot.robot;
        let now = robot.clock.now_ms();
        if self.phase != Phase::Done {
            robot.mechanism.tick();
        }

        match self.phase {
            Phase::Raising => {
                let arm = robot.mechanism.arm_position();
                if arm <= self.tuning.arm_clear_ticks {
                    debug!("arm clear at {}", arm);
                    self.phase = Phase::Settling {
                        until_ms: now + self.tuning.settle_ms as u64,
                    };
                }
                DeliverStatus::Running
            }
            Phase::Settling { until_ms } => {
                if now < until_ms {
                    return DeliverStatus::Pausing;
                }
                robot.mechanism.set_collector(CollectorState::Open);
                self.phase = Phase::Releasing {
                    until_ms: now + self.tuning.release_ms as u64,
                };
                DeliverStatus::Running
            }
            Phase::Releasing { until_ms } => {
                if now < until_ms {
                    return DeliverStatus::Pausing;
                }
                robot.mechanism.set_collector(CollectorState::Closed);
                robot.mechanism.set_arm(ArmPosition::Load);
                self.phase = Phase::Cooling {
                    until_ms: now + self.tuning.post_delivery_ms as u64,
                };
                DeliverStatus::Running
            }
            Phase::Cooling { until_ms } => {
                if now < until_ms {
                    return DeliverStatus::Pausing;
                }
                self.phase = Phase::Done;
                debug!("delivery done");
                DeliverStatus::Done
            }
            Phase::Done => DeliverStatus::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::pilot::PilotSettings;
    use crate::motion::primitives::MotionOutcome;
    use crate::sim::world::{SimParams, SimWorld};

    #[test]
    fn collector_opens_only_after_arm_clears() {
        let world = SimWorld::new(SimParams::default());
        let mut pilot = Pilot::new(world.robot(), PilotSettings::default()).unwrap();

        let outcome = pilot.deliver(&mut world.signal());
        assert_eq!(outcome, MotionOutcome::Converged);

        let at_release = world.arm_at_release().unwrap();
        assert!(at_release <= config::ARM_CLEAR_TICKS, "{at_release}");
        assert_eq!(world.collector(), CollectorState::Closed);
        assert!(world.mechanism_ticks() > 0);
        // settle + release + post-delivery pauses, plus the arm travel
        assert!(world.now_ms() >= 3500);
    }

    #[test]
    fn pauses_while_settling() {
        let world = SimWorld::new(SimParams::default());
        let mut pilot = Pilot::new(world.robot(), PilotSettings::default()).unwrap();
        let mut sequence = DeliverSequence::start(&mut pilot);

        while world.arm_position() > config::ARM_CLEAR_TICKS {
            assert_eq!(sequence.step(&mut pilot), DeliverStatus::Running);
        }
        // the step that saw the arm clear scheduled the settle
        assert_eq!(sequence.step(&mut pilot), DeliverStatus::Pausing);
        assert_eq!(world.collector(), CollectorState::Closed);

        world.advance_ms(config::DELIVER_SETTLE_MS as u64);
        assert_eq!(sequence.step(&mut pilot), DeliverStatus::Running);
        assert_eq!(world.collector(), CollectorState::Open);
        assert!(!sequence.is_done());
    }

    #[test]
    fn cancelled_delivery_returns_early() {
        let world = SimWorld::new(SimParams::default());
        let mut pilot = Pilot::new(world.robot(), PilotSettings::default()).unwrap();
        world.cancel_at(1000);

        let outcome = pilot.deliver(&mut world.signal());
        assert_eq!(outcome, MotionOutcome::Cancelled);
        assert_eq!(world.arm_at_release(), None);
    }
}
