use gyrodrive::controller::drivetrain::{Direction, MotorDirections};
use gyrodrive::Lane;

pub const MOTOR_DIRECTIONS: MotorDirections = MotorDirections {
    f_left: Direction::Forward,
    r_left: Direction::Forward,
    f_right: Direction::Backward,
    r_right: Direction::Backward,
};

// simulated robot
pub const SIM_DT_MS: u64 = 10;
pub const SIM_MAX_TICKS_PER_S: f32 = 1000.0;
pub const SIM_TRACK_WIDTH_IN: f32 = 14.0;
pub const SIM_INITIAL_YAW_DEG: f32 = 0.0;
// what the camera would see on the field
pub const SIM_LANE: Lane = Lane::Middle;

pub const MATCH_LENGTH_MS: u64 = 30_000;
