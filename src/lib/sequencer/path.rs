//! The autonomous routine as data.
//!
//! [`build_path`] turns a [`RunConfig`] into a flat list of [`PathStep`]s,
//! one phase at a time. Nothing here touches hardware; the runner interprets
//! the list.

use heapless::Vec;
use log::info;
use snafu::OptionExt;

use crate::error::{ConfigError, PathTooLongSnafu};
use crate::sequencer::constants::PathConstants;
use crate::sequencer::run_config::RunConfig;

pub const MAX_PATH_STEPS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathStep {
    DriveStraight {
        speed: f32,
        distance_in: f32,
        heading_deg: f32,
        mirror: bool,
    },
    TurnTo {
        speed: f32,
        heading_deg: f32,
        mirror: bool,
    },
    Hold {
        speed: f32,
        heading_deg: f32,
        duration_s: f32,
        mirror: bool,
    },
    Deliver,
    Wait {
        duration_s: f32,
    },
}

pub type Path = Vec<PathStep, MAX_PATH_STEPS>;

fn push(path: &mut Path, step: PathStep) -> Result<(), ConfigError> {
    path.push(step).ok().context(PathTooLongSnafu {
        capacity: MAX_PATH_STEPS,
    })
}

fn drive(path: &mut Path, speed: f32, distance_in: f32, heading_deg: f32) -> Result<(), ConfigError> {
    push(
        path,
        PathStep::DriveStraight {
            speed,
            distance_in,
            heading_deg,
            mirror: false,
        },
    )
}

fn turn(path: &mut Path, speed: f32, heading_deg: f32, mirror: bool) -> Result<(), ConfigError> {
    push(
        path,
        PathStep::TurnTo {
            speed,
            heading_deg,
            mirror,
        },
    )
}

/// Push the purple pixel onto the spike mark and, on a side lane, nudge it.
pub fn lane_phase(path: &mut Path, config: &RunConfig, c: &PathConstants) -> Result<(), ConfigError> {
    let lane = c.lane(config.lane);
    drive(path, c.drive_speed, lane.push_in, 0.0)?;
    if let Some(nudge) = lane.nudge {
        turn(path, c.turn_speed, nudge.heading_deg, false)?;
        drive(path, c.nudge_speed, nudge.out_in, 0.0)?;
        drive(path, c.nudge_speed, nudge.back_in, 0.0)?;
        turn(path, c.turn_speed, 0.0, false)?;
    }
    Ok(())
}

/// Wait on the spike mark while the partner uses the shared lane.
pub fn stall_phase(path: &mut Path, config: &RunConfig, c: &PathConstants) -> Result<(), ConfigError> {
    if config.is_stalled {
        push(
            path,
            PathStep::Wait {
                duration_s: c.stall_s(config.park_in_corner),
            },
        )?;
    }
    Ok(())
}

/// Back off the spike mark.
pub fn recovery_phase(path: &mut Path, config: &RunConfig, c: &PathConstants) -> Result<(), ConfigError> {
    drive(path, c.drive_speed, c.lane(config.lane).recovery_in, 0.0)
}

/// Cross to the backdrop side. Only when a crossing is configured.
pub fn crossing_phase(path: &mut Path, config: &RunConfig, c: &PathConstants) -> Result<(), ConfigError> {
    let Some(crossing) = c.crossing else {
        return Ok(());
    };
    let (heading_deg, distance_in) = crossing.leg(config.is_far, config.park_in_corner);
    turn(path, c.turn_speed, crossing.heading_deg, true)?;
    push(
        path,
        PathStep::DriveStraight {
            speed: c.drive_speed,
            distance_in,
            heading_deg,
            mirror: true,
        },
    )
}

/// Line up on the lane's AprilTag column and, if asked, score the yellow
/// pixel.
pub fn scoring_phase(path: &mut Path, config: &RunConfig, c: &PathConstants) -> Result<(), ConfigError> {
    turn(path, c.turn_speed, 0.0, true)?;
    if config.score_yellow_pixel {
        let offset = c.scoring_offset(config.lane, config.alliance);
        drive(path, c.drive_speed, offset, 0.0)?;
        turn(path, c.turn_speed, c.scoring_heading_deg, true)?;
        drive(path, c.drive_speed, c.backdrop_approach_in, 0.0)?;
        push(path, PathStep::Deliver)?;
        drive(path, c.drive_speed, -c.backdrop_approach_in, 0.0)?;
    }
    Ok(())
}

/// Run along the wall and back into the triangle. Skipped for a corner park.
pub fn park_phase(path: &mut Path, config: &RunConfig, c: &PathConstants) -> Result<(), ConfigError> {
    if config.park_in_corner {
        return Ok(());
    }
    // the scoring column was only driven to when scoring
    let offset = if config.score_yellow_pixel {
        c.scoring_offset(config.lane, config.alliance)
    } else {
        0.0
    };
    turn(path, c.turn_speed, 0.0, true)?;
    drive(path, c.drive_speed, c.wall_to_park(offset), 0.0)?;
    turn(path, c.turn_speed, c.park_heading_deg, true)?;
    drive(path, c.park_speed, c.triangle_park_in, c.park_heading_deg)
}

/// The whole routine for one run.
pub fn build_path(config: &RunConfig, constants: &PathConstants) -> Result<Path, ConfigError> {
    constants.validate()?;

    let mut path = Path::new();
    lane_phase(&mut path, config, constants)?;
    stall_phase(&mut path, config, constants)?;
    recovery_phase(&mut path, config, constants)?;
    crossing_phase(&mut path, config, constants)?;
    scoring_phase(&mut path, config, constants)?;
    park_phase(&mut path, config, constants)?;

    info!(
        "{:?} {:?} path: {} steps (stalled {}, corner {}, score {})",
        config.alliance,
        config.lane,
        path.len(),
        config.is_stalled,
        config.park_in_corner,
        config.score_yellow_pixel
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Alliance, Lane};
    use crate::sequencer::constants::Crossing;

    fn d(speed: f32, distance_in: f32, heading_deg: f32) -> PathStep {
        PathStep::DriveStraight {
            speed,
            distance_in,
            heading_deg,
            mirror: false,
        }
    }

    fn t(heading_deg: f32, mirror: bool) -> PathStep {
        PathStep::TurnTo {
            speed: 0.4,
            heading_deg,
            mirror,
        }
    }

    #[test]
    fn middle_lane_scores_and_parks_in_triangle() {
        let config = RunConfig::new(Alliance::Blue, Lane::Middle).scoring(true);
        let path = build_path(&config, &PathConstants::default()).unwrap();

        let expected = [
            d(0.2, -26.0, 0.0),
            d(0.2, 23.0, 0.0),
            t(0.0, true),
            d(0.2, -24.0, 0.0),
            t(90.0, true),
            d(0.2, -15.0, 0.0),
            PathStep::Deliver,
            d(0.2, 15.0, 0.0),
            t(0.0, true),
            d(0.2, -25.0, 0.0),
            t(90.0, true),
            d(0.8, -20.0, 90.0),
        ];
        assert_eq!(path.as_slice(), &expected[..]);
    }

    #[test]
    fn side_lane_nudges_before_recovery() {
        let config = RunConfig::new(Alliance::Red, Lane::Right);
        let path = build_path(&config, &PathConstants::default()).unwrap();

        assert_eq!(
            &path[..6],
            &[
                d(0.2, -14.0, 0.0),
                t(-45.0, false),
                d(0.5, -9.5, 0.0),
                d(0.5, 9.5, 0.0),
                t(0.0, false),
                d(0.2, 13.0, 0.0),
            ][..]
        );
        // not scoring, so the wall leg starts from the lane: -44 - 5
        assert!(path.contains(&d(0.2, -49.0, 0.0)));
        assert!(!path.contains(&PathStep::Deliver));

        let scoring = build_path(&config.scoring(true), &PathConstants::default()).unwrap();
        // red right scores on the near column: -44 + 20 - 5
        assert!(scoring.contains(&d(0.2, -29.0, 0.0)));
    }

    #[test]
    fn stall_wait_depends_on_park_choice() {
        let c = PathConstants::default();

        let corner = RunConfig::new(Alliance::Blue, Lane::Middle)
            .stalled(true)
            .corner_park(true);
        let path = build_path(&corner, &c).unwrap();
        assert_eq!(path[1], PathStep::Wait { duration_s: 8.0 });
        assert_eq!(path[2], d(0.2, 23.0, 0.0));

        let triangle = RunConfig::new(Alliance::Blue, Lane::Left).stalled(true);
        let path = build_path(&triangle, &c).unwrap();
        assert_eq!(path[5], PathStep::Wait { duration_s: 7.5 });
        assert_eq!(path[6], d(0.2, 13.0, 0.0));
    }

    #[test]
    fn middle_lane_without_scoring_parks_from_the_lane() {
        let config = RunConfig::new(Alliance::Blue, Lane::Middle);
        let path = build_path(&config, &PathConstants::default()).unwrap();

        let expected = [
            d(0.2, -26.0, 0.0),
            d(0.2, 23.0, 0.0),
            t(0.0, true),
            t(0.0, true),
            d(0.2, -49.0, 0.0),
            t(90.0, true),
            d(0.8, -20.0, 90.0),
        ];
        assert_eq!(path.as_slice(), &expected[..]);
    }

    #[test]
    fn corner_park_stops_after_scoring_phase() {
        let config = RunConfig::new(Alliance::Blue, Lane::Middle).corner_park(true);
        let path = build_path(&config, &PathConstants::default()).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[2], t(0.0, true));
    }

    #[test]
    fn crossing_leg_is_opt_in() {
        let c = PathConstants {
            crossing: Some(Crossing::default()),
            ..PathConstants::default()
        };
        let config = RunConfig::new(Alliance::Red, Lane::Middle).far(true);
        let path = build_path(&config, &c).unwrap();
        assert_eq!(path[2], t(90.0, true));
        assert_eq!(
            path[3],
            PathStep::DriveStraight {
                speed: 0.2,
                distance_in: -74.0,
                heading_deg: 89.0,
                mirror: true,
            }
        );
    }

    #[test]
    fn overfull_path_is_rejected() {
        let mut path = Path::new();
        for _ in 0..MAX_PATH_STEPS {
            push(&mut path, PathStep::Deliver).unwrap();
        }
        assert_eq!(
            push(&mut path, PathStep::Deliver),
            Err(ConfigError::PathTooLong {
                capacity: MAX_PATH_STEPS
            })
        );
    }
}
