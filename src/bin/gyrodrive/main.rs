//! Runs one autonomous routine against the simulated robot and logs it.

mod config {
    pub mod sys_config;
    pub mod tuning;
}
mod logger;

use std::process::ExitCode;

use config::{sys_config, tuning};
use gyrodrive::controller::tuning::MotionTuning;
use gyrodrive::motion::telemetry::LogTelemetry;
use gyrodrive::sequencer::constants::PathConstants;
use gyrodrive::sim::devices::SimLane;
use gyrodrive::sim::world::{SimParams, SimWorld};
use gyrodrive::{run_autonomous_program, Pilot, PilotSettings, RunConfig, RunOutcome};
use log::{error, info, warn};

fn main() -> ExitCode {
    logger::init(tuning::LOG_LEVEL).expect("logger installed twice");

    let world = SimWorld::new(SimParams {
        dt_ms: sys_config::SIM_DT_MS,
        max_ticks_per_s: sys_config::SIM_MAX_TICKS_PER_S,
        track_width_in: sys_config::SIM_TRACK_WIDTH_IN,
        directions: sys_config::MOTOR_DIRECTIONS,
        initial_yaw_deg: sys_config::SIM_INITIAL_YAW_DEG,
        ..SimParams::default()
    });
    world.end_at(sys_config::MATCH_LENGTH_MS);

    let settings = PilotSettings {
        tuning: MotionTuning {
            timeout_s: tuning::MOTION_TIMEOUT_S,
            ..MotionTuning::default()
        },
        ..PilotSettings::default()
    };
    let mut pilot = match Pilot::new(world.robot(), settings) {
        Ok(pilot) => pilot,
        Err(e) => {
            error!("rejected settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // scoring last, it overrides the corner park like the init menu does
    let config = RunConfig::new(tuning::ALLIANCE, sys_config::SIM_LANE)
        .far(tuning::IS_FAR)
        .stalled(tuning::IS_STALLED)
        .corner_park(tuning::PARK_IN_CORNER)
        .scoring(tuning::SCORE_YELLOW_PIXEL);

    let outcome = run_autonomous_program(
        &mut pilot,
        &mut SimLane(sys_config::SIM_LANE),
        &mut world.signal(),
        &mut LogTelemetry,
        config,
        &PathConstants::default(),
    );

    let code = match outcome {
        Ok(RunOutcome::Completed) => {
            info!(
                "parked at {:.1} deg after {} ms of match time",
                world.yaw_deg(),
                world.now_ms()
            );
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Cancelled) => {
            warn!("match ended at {} ms before the routine finished", world.now_ms());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("routine rejected: {}", e);
            ExitCode::FAILURE
        }
    };
    log::logger().flush();
    code
}
