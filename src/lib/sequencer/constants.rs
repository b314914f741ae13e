use snafu::ensure;

use crate::config;
use crate::error::{CalibrationSnafu, ConfigError};
use crate::field::{Alliance, Lane};

/// Which AprilTag column a lane scores against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagDistance {
    Near,
    Mid,
    Far,
}

impl TagDistance {
    const fn index(self) -> usize {
        match self {
            TagDistance::Near => 0,
            TagDistance::Mid => 1,
            TagDistance::Far => 2,
        }
    }
}

/// Out-and-back wiggle that knocks the purple pixel onto a side spike mark.
///
/// The robot turns to `heading_deg` first, but the out and back legs hold
/// heading 0. The heading correction then cancels one side's power, that
/// wheel never reaches its target, and the legs only end on
/// `MotionTuning::timeout_s`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nudge {
    pub heading_deg: f32,
    pub out_in: f32,
    pub back_in: f32,
}

/// Everything the robot does on its spike mark lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneManeuver {
    pub push_in: f32,
    pub nudge: Option<Nudge>,
    pub recovery_in: f32,
}

/// Trip across the field when starting away from the backdrop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    pub heading_deg: f32,
    pub far_heading_deg: f32,
    pub far_corner_in: f32,
    pub far_triangle_in: f32,
    pub near_corner_in: f32,
    pub near_triangle_in: f32,
}

impl Default for Crossing {
    fn default() -> Self {
        Crossing {
            heading_deg: config::CROSSING_HEADING_DEG,
            far_heading_deg: config::CROSSING_FAR_HEADING_DEG,
            far_corner_in: config::CROSSING_FAR_CORNER_IN,
            far_triangle_in: config::CROSSING_FAR_TRIANGLE_IN,
            near_corner_in: config::CROSSING_NEAR_CORNER_IN,
            near_triangle_in: config::CROSSING_NEAR_TRIANGLE_IN,
        }
    }
}

impl Crossing {
    /// (heading, distance) for the crossing leg.
    pub fn leg(&self, is_far: bool, park_in_corner: bool) -> (f32, f32) {
        match (is_far, park_in_corner) {
            (true, true) => (self.far_heading_deg, self.far_corner_in),
            (true, false) => (self.far_heading_deg, self.far_triangle_in),
            (false, true) => (self.heading_deg, self.near_corner_in),
            (false, false) => (self.heading_deg, self.near_triangle_in),
        }
    }
}

/// Field measurements and speeds for the autonomous path. Inches, degrees,
/// seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathConstants {
    pub drive_speed: f32,
    pub nudge_speed: f32,
    pub turn_speed: f32,
    pub park_speed: f32,

    /// Indexed left, middle, right.
    pub lanes: [LaneManeuver; 3],
    pub stall_corner_s: f32,
    pub stall_triangle_s: f32,

    /// Indexed near, mid, far.
    pub tag_distances_in: [f32; 3],
    /// `[lane][alliance]`, red first.
    pub tag_table: [[TagDistance; 2]; 3],

    pub scoring_heading_deg: f32,
    pub backdrop_approach_in: f32,
    pub wall_base_in: f32,
    pub wall_margin_in: f32,
    pub park_heading_deg: f32,
    pub triangle_park_in: f32,

    pub crossing: Option<Crossing>,
}

impl Default for PathConstants {
    fn default() -> Self {
        let side = LaneManeuver {
            push_in: config::SIDE_PUSH_IN,
            nudge: Some(Nudge {
                heading_deg: config::SIDE_NUDGE_HEADING_DEG,
                out_in: config::SIDE_NUDGE_OUT_IN,
                back_in: config::SIDE_NUDGE_BACK_IN,
            }),
            recovery_in: config::SIDE_RECOVERY_IN,
        };
        let right = LaneManeuver {
            nudge: side.nudge.map(|n| Nudge {
                heading_deg: -n.heading_deg,
                ..n
            }),
            ..side
        };
        let middle = LaneManeuver {
            push_in: config::MIDDLE_PUSH_IN,
            nudge: None,
            recovery_in: config::MIDDLE_RECOVERY_IN,
        };

        use TagDistance::*;
        PathConstants {
            drive_speed: config::DRIVE_SPEED,
            nudge_speed: config::NUDGE_SPEED,
            turn_speed: config::TURN_SPEED,
            park_speed: config::PARK_SPEED,
            lanes: [side, middle, right],
            stall_corner_s: config::STALL_CORNER_S,
            stall_triangle_s: config::STALL_TRIANGLE_S,
            tag_distances_in: [config::TAG_NEAR_IN, config::TAG_MID_IN, config::TAG_FAR_IN],
            tag_table: [[Far, Near], [Mid, Mid], [Near, Far]],
            scoring_heading_deg: config::SCORING_HEADING_DEG,
            backdrop_approach_in: config::BACKDROP_APPROACH_IN,
            wall_base_in: config::WALL_BASE_IN,
            wall_margin_in: config::WALL_MARGIN_IN,
            park_heading_deg: config::SCORING_HEADING_DEG,
            triangle_park_in: config::TRIANGLE_PARK_IN,
            crossing: None,
        }
    }
}

impl PathConstants {
    pub fn lane(&self, lane: Lane) -> &LaneManeuver {
        &self.lanes[lane.index()]
    }

    /// Signed distance from the lane to the scoring column. Negative, the
    /// robot backs into it.
    pub fn scoring_offset(&self, lane: Lane, alliance: Alliance) -> f32 {
        let tag = self.tag_table[lane.index()][alliance.index()];
        -self.tag_distances_in[tag.index()]
    }

    /// Distance from the scoring column back along the wall to the park turn.
    pub fn wall_to_park(&self, scoring_offset: f32) -> f32 {
        self.wall_base_in - scoring_offset - self.wall_margin_in
    }

    pub fn stall_s(&self, park_in_corner: bool) -> f32 {
        if park_in_corner {
            self.stall_corner_s
        } else {
            self.stall_triangle_s
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, speed) in [
            ("drive_speed", self.drive_speed),
            ("nudge_speed", self.nudge_speed),
            ("turn_speed", self.turn_speed),
            ("park_speed", self.park_speed),
        ] {
            ensure!(
                speed.is_finite() && speed > 0.0 && speed <= 1.0,
                CalibrationSnafu { name }
            );
        }
        for (name, seconds) in [
            ("stall_corner_s", self.stall_corner_s),
            ("stall_triangle_s", self.stall_triangle_s),
        ] {
            ensure!(seconds.is_finite() && seconds >= 0.0, CalibrationSnafu { name });
        }

        for lane in &self.lanes {
            let nudge_ok = lane.nudge.map_or(true, |n| {
                n.heading_deg.is_finite() && n.out_in.is_finite() && n.back_in.is_finite()
            });
            ensure!(
                lane.push_in.is_finite() && lane.recovery_in.is_finite() && nudge_ok,
                CalibrationSnafu { name: "lanes" }
            );
        }
        ensure!(
            self.tag_distances_in.iter().all(|d| d.is_finite()),
            CalibrationSnafu {
                name: "tag_distances_in"
            }
        );

        let legs = [
            self.scoring_heading_deg,
            self.backdrop_approach_in,
            self.wall_base_in,
            self.wall_margin_in,
            self.park_heading_deg,
            self.triangle_park_in,
        ];
        ensure!(
            legs.iter().all(|l| l.is_finite()),
            CalibrationSnafu { name: "backdrop" }
        );
        if let Some(crossing) = self.crossing {
            let legs = [
                crossing.heading_deg,
                crossing.far_heading_deg,
                crossing.far_corner_in,
                crossing.far_triangle_in,
                crossing.near_corner_in,
                crossing.near_triangle_in,
            ];
            ensure!(
                legs.iter().all(|l| l.is_finite()),
                CalibrationSnafu { name: "crossing" }
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_offset_table() {
        let c = PathConstants::default();
        assert_eq!(c.scoring_offset(Lane::Middle, Alliance::Red), -24.0);
        assert_eq!(c.scoring_offset(Lane::Middle, Alliance::Blue), -24.0);
        assert_eq!(c.scoring_offset(Lane::Left, Alliance::Red), -28.0);
        assert_eq!(c.scoring_offset(Lane::Left, Alliance::Blue), -20.0);
        assert_eq!(c.scoring_offset(Lane::Right, Alliance::Red), -20.0);
        assert_eq!(c.scoring_offset(Lane::Right, Alliance::Blue), -28.0);
    }

    #[test]
    fn wall_distance_tracks_scoring_column() {
        let c = PathConstants::default();
        assert_eq!(c.wall_to_park(-24.0), -25.0);
        assert_eq!(c.wall_to_park(-20.0), -29.0);
        assert_eq!(c.wall_to_park(-28.0), -21.0);
    }

    #[test]
    fn side_lanes_nudge_opposite_ways() {
        let c = PathConstants::default();
        let left = c.lane(Lane::Left).nudge.unwrap();
        let right = c.lane(Lane::Right).nudge.unwrap();
        assert_eq!(left.heading_deg, 45.0);
        assert_eq!(right.heading_deg, -45.0);
        assert_eq!(c.lane(Lane::Middle).nudge, None);
    }

    #[test]
    fn crossing_leg_choice() {
        let crossing = Crossing::default();
        assert_eq!(crossing.leg(true, true), (89.0, -94.0));
        assert_eq!(crossing.leg(true, false), (89.0, -74.0));
        assert_eq!(crossing.leg(false, true), (90.0, -44.0));
        assert_eq!(crossing.leg(false, false), (90.0, -24.0));
    }

    #[test]
    fn rejects_zero_speed() {
        let c = PathConstants {
            turn_speed: 0.0,
            ..PathConstants::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::Calibration { name: "turn_speed" }));
        assert_eq!(PathConstants::default().validate(), Ok(()));
    }
}
