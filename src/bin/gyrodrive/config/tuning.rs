use gyrodrive::Alliance;
use log::LevelFilter;

pub const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// init menu
pub const ALLIANCE: Alliance = Alliance::Blue;
pub const IS_FAR: bool = false;
pub const PARK_IN_CORNER: bool = false;
pub const IS_STALLED: bool = false;
pub const SCORE_YELLOW_PIXEL: bool = true;

// the side lanes' nudge legs can stall against their own heading hold
pub const MOTION_TIMEOUT_S: Option<f32> = Some(8.0);
