//! Calibrated defaults for the competition robot.
//!
//! These are the values the robot was tuned with on the field. Anything built
//! from them is still validated at construction, so a bad edit here shows up as
//! a [`ConfigError`](crate::error::ConfigError) rather than a runaway motor.

// drivetrain geometry
pub const WHEEL_DIAMETER_MM: f32 = 75.0;
pub const MM_PER_INCH: f32 = 25.4;
pub const TICKS_PER_MOTOR_REV: f32 = 28.0;
/// (driven, driving) teeth, motor side first.
pub const GEAR_STAGES: [(u16, u16); 2] = [(84, 29), (76, 21)];
pub const SLIP_COMPENSATION: f32 = 1.7;
pub const FIXED_OFFSET_IN: f32 = 0.56;

// heading control
pub const TURN_GAIN: f32 = 0.02;
pub const DRIVE_GAIN: f32 = 0.03;
pub const HEADING_THRESHOLD_DEG: f32 = 4.0;
pub const PAUSE_POLL_MS: u32 = 20;

// speeds, as a fraction of full power
pub const DRIVE_SPEED: f32 = 0.2;
pub const NUDGE_SPEED: f32 = 0.5;
pub const TURN_SPEED: f32 = 0.4;
pub const PARK_SPEED: f32 = 0.8;

// spike mark lanes, inches
pub const MIDDLE_PUSH_IN: f32 = -26.0;
pub const MIDDLE_RECOVERY_IN: f32 = 23.0;
pub const SIDE_PUSH_IN: f32 = -14.0;
pub const SIDE_NUDGE_HEADING_DEG: f32 = 45.0;
pub const SIDE_NUDGE_OUT_IN: f32 = -9.5;
pub const SIDE_NUDGE_BACK_IN: f32 = 9.5;
pub const SIDE_RECOVERY_IN: f32 = 13.0;

// stall wait for the alliance partner, seconds, by park choice
pub const STALL_CORNER_S: f32 = 8.0;
pub const STALL_TRIANGLE_S: f32 = 7.5;

// backdrop
pub const TAG_NEAR_IN: f32 = 20.0;
pub const TAG_MID_IN: f32 = 24.0;
pub const TAG_FAR_IN: f32 = 28.0;
pub const BACKDROP_APPROACH_IN: f32 = -15.0;
pub const SCORING_HEADING_DEG: f32 = 90.0;
pub const WALL_BASE_IN: f32 = -44.0;
pub const WALL_MARGIN_IN: f32 = 5.0;
pub const TRIANGLE_PARK_IN: f32 = -20.0;

// field crossing when starting away from the backdrop
pub const CROSSING_HEADING_DEG: f32 = 90.0;
pub const CROSSING_FAR_HEADING_DEG: f32 = 89.0;
pub const CROSSING_FAR_CORNER_IN: f32 = -94.0;
pub const CROSSING_FAR_TRIANGLE_IN: f32 = -74.0;
pub const CROSSING_NEAR_CORNER_IN: f32 = -44.0;
pub const CROSSING_NEAR_TRIANGLE_IN: f32 = -24.0;

// pixel delivery
pub const ARM_CLEAR_TICKS: i32 = 1500;
pub const DELIVER_SETTLE_MS: u32 = 2000;
pub const DELIVER_RELEASE_MS: u32 = 500;
pub const POST_DELIVERY_MS: u32 = 1000;

// wheel position servo
pub const SERVO_KP: f32 = 0.005;
pub const SERVO_KI: f32 = 0.0;
pub const SERVO_KD: f32 = 0.0;
pub const SERVO_OUT_LIM: f32 = 1.0;
pub const SERVO_P_LIM: f32 = SERVO_OUT_LIM;
pub const SERVO_I_LIM: f32 = SERVO_OUT_LIM;
pub const SERVO_D_LIM: f32 = SERVO_OUT_LIM;
pub const SERVO_TOLERANCE_TICKS: i32 = 10;
