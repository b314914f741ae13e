use core::ops::Mul;

use crate::controller::mixer::WheelCommand;
use crate::interfaces::{DriveActuator, ServoMode};

/// What the motion primitives need from a skid-steer base.
pub trait Drive {
    fn set_mode(&mut self, mode: ServoMode);

    fn positions(&mut self) -> WheelTicks;

    fn set_targets(&mut self, targets: &WheelTicks);

    /// Left command to both left wheels, right command to both right wheels.
    fn apply(&mut self, command: WheelCommand);

    /// `true` while any wheel is still running to its target.
    fn is_busy(&mut self) -> bool;

    fn stop(&mut self) {
        self.apply(WheelCommand::STOP);
    }
}

/// Four wheel motors grouped by side, with per-wheel mounting direction.
pub struct Drivetrain<M1, M2, M3, M4> {
    f_left: M1,
    r_left: M2,
    f_right: M3,
    r_right: M4,
    directions: MotorDirections,
}

impl<M1, M2, M3, M4> Drivetrain<M1, M2, M3, M4>
where
    M1: DriveActuator,
    M2: DriveActuator,
    M3: DriveActuator,
    M4: DriveActuator,
{
    pub fn new(
        f_left: M1,
        r_left: M2,
        f_right: M3,
        r_right: M4,
        directions: MotorDirections,
    ) -> Drivetrain<M1, M2, M3, M4> {
        let mut drivetrain = Drivetrain {
            f_left,
            r_left,
            f_right,
            r_right,
            directions,
        };
        drivetrain.set_mode(ServoMode::Velocity);
        drivetrain.stop();
        return drivetrain;
    }

    pub fn release(self) -> (M1, M2, M3, M4) {
        (self.f_left, self.r_left, self.f_right, self.r_right)
    }
}

impl<M1, M2, M3, M4> Drive for Drivetrain<M1, M2, M3, M4>
where
    M1: DriveActuator,
    M2: DriveActuator,
    M3: DriveActuator,
    M4: DriveActuator,
{
    fn set_mode(&mut self, mode: ServoMode) {
        self.f_left.set_mode(mode);
        self.r_left.set_mode(mode);
        self.f_right.set_mode(mode);
        self.r_right.set_mode(mode);
    }

    fn positions(&mut self) -> WheelTicks {
        WheelTicks {
            f_left: self.directions.f_left * self.f_left.current_position(),
            r_left: self.directions.r_left * self.r_left.current_position(),
            f_right: self.directions.f_right * self.f_right.current_position(),
            r_right: self.directions.r_right * self.r_right.current_position(),
        }
    }

    fn set_targets(&mut self, targets: &WheelTicks) {
        self.f_left
            .set_target_position(self.directions.f_left * targets.f_left);
        self.r_left
            .set_target_position(self.directions.r_left * targets.r_left);
        self.f_right
            .set_target_position(self.directions.f_right * targets.f_right);
        self.r_right
            .set_target_position(self.directions.r_right * targets.r_right);
    }

    fn apply(&mut self, command: WheelCommand) {
        self.f_left.set_power(self.directions.f_left * command.left);
        self.r_left.set_power(self.directions.r_left * command.left);
        self.f_right.set_power(self.directions.f_right * command.right);
        self.r_right.set_power(self.directions.r_right * command.right);
    }

    fn is_busy(&mut self) -> bool {
        // poll every wheel, servo loops may advance on the query
        let busy = [
            self.f_left.is_busy(),
            self.r_left.is_busy(),
            self.f_right.is_busy(),
            self.r_right.is_busy(),
        ];
        busy.into_iter().any(|b| b)
    }
}

/// Encoder positions (or targets) for the four wheels, robot frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WheelTicks {
    pub f_left: i32,
    pub r_left: i32,
    pub f_right: i32,
    pub r_right: i32,
}

impl WheelTicks {
    /// Same displacement on every wheel.
    pub fn offset(&self, ticks: i32) -> WheelTicks {
        WheelTicks {
            f_left: self.f_left + ticks,
            r_left: self.r_left + ticks,
            f_right: self.f_right + ticks,
            r_right: self.r_right + ticks,
        }
    }

    pub fn to_array(self) -> [i32; 4] {
        [self.f_left, self.r_left, self.f_right, self.r_right]
    }
}

impl IntoIterator for WheelTicks {
    type Item = i32;
    type IntoIter = core::array::IntoIter<i32, 4>;
    fn into_iter(self) -> Self::IntoIter {
        self.to_array().into_iter()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Backward = -1,
    Forward = 1,
}
impl Mul<f32> for Direction {
    type Output = f32;
    fn mul(self, rhs: f32) -> Self::Output {
        self as i32 as f32 * rhs
    }
}
impl Mul<i32> for Direction {
    type Output = i32;
    fn mul(self, rhs: i32) -> Self::Output {
        self as i32 * rhs
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotorDirections {
    pub f_left: Direction,
    pub r_left: Direction,
    pub f_right: Direction,
    pub r_right: Direction,
}

impl Default for MotorDirections {
    fn default() -> MotorDirections {
        MotorDirections {
            f_left: Direction::Forward,
            r_left: Direction::Forward,
            f_right: Direction::Forward,
            r_right: Direction::Forward,
        }
    }
}
