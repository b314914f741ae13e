use log::{info, warn};

use crate::controller::drivetrain::Drive;
use crate::controller::tuning::seconds_to_ms;
use crate::error::ConfigError;
use crate::interfaces::{Clock, HeadingSource, LaneClassifier, Mechanism, RunSignal};
use crate::motion::deliver::{DeliverSequence, DeliverStatus};
use crate::motion::pilot::{should_stop, Pilot};
use crate::motion::primitives::{
    ActiveMotion, DriveStraight, HoldHeading, Motion, MotionStatus, TurnToHeading,
};
use crate::motion::telemetry::TelemetrySink;
use crate::sequencer::constants::PathConstants;
use crate::sequencer::path::{build_path, Path, PathStep};
use crate::sequencer::run_config::RunConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// Did control work this iteration.
    Running,
    /// Waiting on a timer; the caller may yield.
    Pausing,
    Finished,
}

#[derive(Clone, Copy, Debug)]
enum Active {
    Motion(ActiveMotion),
    Deliver(DeliverSequence),
    Wait { until_ms: u64 },
}

/// Interprets a [`Path`] one control iteration at a time.
pub struct PathRunner {
    path: Path,
    index: usize,
    active: Option<Active>,
    timed_out: usize,
}

impl PathRunner {
    pub fn new(path: Path) -> Self {
        PathRunner {
            path,
            index: 0,
            active: None,
            timed_out: 0,
        }
    }

    /// Index of the step being executed (or next to start).
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.path.len()
    }

    /// Steps that ended on the motion timeout rather than converging.
    pub fn timed_out(&self) -> usize {
        self.timed_out
    }

    pub fn step<H, D, M, C>(
        &mut self,
        pilot: &mut Pilot<H, D, M, C>,
        sink: &mut dyn TelemetrySink,
    ) -> StepStatus
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        let Some(active) = self.active.as_mut() else {
            let Some(&step) = self.path.get(self.index) else {
                return StepStatus::Finished;
            };
            info!("step {}/{}: {:?}", self.index + 1, self.path.len(), step);
            self.active = Some(start(pilot, step));
            return StepStatus::Running;
        };

        match active {
            Active::Motion(motion) => match motion.step(pilot, sink) {
                MotionStatus::Running => StepStatus::Running,
                MotionStatus::Converged => {
                    motion.finish(pilot);
                    self.advance();
                    StepStatus::Running
                }
                MotionStatus::TimedOut => {
                    motion.finish(pilot);
                    warn!("step {} timed out, moving on", self.index + 1);
                    self.timed_out += 1;
                    self.advance();
                    StepStatus::Running
                }
            },
            Active::Deliver(sequence) => match sequence.step(pilot) {
                DeliverStatus::Running => StepStatus::Running,
                DeliverStatus::Pausing => StepStatus::Pausing,
                DeliverStatus::Done => {
                    self.advance();
                    StepStatus::Running
                }
            },
            Active::Wait { until_ms } => {
                if pilot.robot.clock.now_ms() < *until_ms {
                    return StepStatus::Pausing;
                }
                self.advance();
                StepStatus::Running
            }
        }
    }

    /// Abandon the path and leave the drive stopped.
    pub fn cancel<H, D, M, C>(&mut self, pilot: &mut Pilot<H, D, M, C>)
    where
        H: HeadingSource,
        D: Drive,
        M: Mechanism,
        C: Clock,
    {
        if let Some(Active::Motion(mut motion)) = self.active.take() {
            motion.finish(pilot);
        }
        pilot.stop();
        self.index = self.path.len();
    }

    fn advance(&mut self) {
        self.active = None;
        self.index += 1;
    }
}

fn start<H, D, M, C>(pilot: &mut Pilot<H, D, M, C>, step: PathStep) -> Active
where
    H: HeadingSource,
    D: Drive,
    M: Mechanism,
    C: Clock,
{
    match step {
        PathStep::DriveStraight {
            speed,
            distance_in,
            heading_deg,
            mirror,
        } => Active::Motion(ActiveMotion::Drive(DriveStraight::start(
            pilot,
            speed,
            distance_in,
            heading_deg,
            mirror,
        ))),
        PathStep::TurnTo {
            speed,
            heading_deg,
            mirror,
        } => Active::Motion(ActiveMotion::Turn(TurnToHeading::start(
            pilot,
            speed,
            heading_deg,
            mirror,
        ))),
        PathStep::Hold {
            speed,
            heading_deg,
            duration_s,
            mirror,
        } => Active::Motion(ActiveMotion::Hold(HoldHeading::start(
            pilot,
            speed,
            heading_deg,
            duration_s,
            mirror,
        ))),
        PathStep::Deliver => Active::Deliver(DeliverSequence::start(pilot)),
        PathStep::Wait { duration_s } => Active::Wait {
            until_ms: pilot.robot.clock.now_ms() + seconds_to_ms(duration_s),
        },
    }
}

/// Run the whole autonomous routine.
///
/// Reads the lane once, builds the path for `config` and drives it from
/// `signal` until it finishes or the signal says stop. The drive is left at
/// zero power on every return, including a rejected configuration.
pub fn run_autonomous_program<H, D, M, C, L, R, S>(
    pilot: &mut Pilot<H, D, M, C>,
    classifier: &mut L,
    signal: &mut R,
    sink: &mut S,
    config: RunConfig,
    constants: &PathConstants,
) -> Result<RunOutcome, ConfigError>
where
    H: HeadingSource,
    D: Drive,
    M: Mechanism,
    C: Clock,
    L: LaneClassifier + ?Sized,
    R: RunSignal + ?Sized,
    S: TelemetrySink,
{
    let config = config.with_lane_from(classifier);
    pilot.set_alliance(config.alliance);
    pilot.reset_heading();

    let path = match build_path(&config, constants) {
        Ok(path) => path,
        Err(e) => {
            pilot.stop();
            warn!("cannot build path: {}", e);
            return Err(e);
        }
    };

    let started_ms = pilot.robot.clock.now_ms();
    let mut runner = PathRunner::new(path);
    loop {
        if should_stop(signal) {
            runner.cancel(pilot);
            warn!("autonomous cancelled at step {}", runner.position());
            return Ok(RunOutcome::Cancelled);
        }
        match runner.step(pilot, &mut *sink) {
            StepStatus::Running => {}
            StepStatus::Pausing => signal.wait(pilot.tuning.pause_poll_ms),
            StepStatus::Finished => {
                pilot.stop();
                info!(
                    "autonomous complete in {} ms, {} steps timed out",
                    pilot.robot.clock.elapsed_ms(started_ms),
                    runner.timed_out()
                );
                return Ok(RunOutcome::Completed);
            }
        }
    }
}
