//! Lockstep kinematic model of the robot.
//!
//! One [`SimWorld`] holds the whole state in `Cell`s so several device
//! handles can borrow it at once. Time only moves when the run signal is
//! polled or asked to wait, which keeps every run deterministic.

use core::cell::Cell;

use libm::{fabsf, roundf};
use num_traits::Float;

use crate::config;
use crate::controller::drivetrain::{Direction, MotorDirections};
use crate::controller::heading::normalize;
use crate::interfaces::{ArmPosition, CollectorState, ServoMode};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimParams {
    pub dt_ms: u64,
    /// Wheel speed at full power.
    pub max_ticks_per_s: f32,
    /// A position move counts as arrived within this many ticks.
    pub tolerance_ticks: f32,
    pub ticks_per_inch: f32,
    pub track_width_in: f32,
    pub directions: MotorDirections,
    /// IMU reading before the first reset.
    pub initial_yaw_deg: f32,
    pub arm_load_ticks: f32,
    pub arm_carry_ticks: f32,
    pub arm_deliver_ticks: f32,
    /// Arm travel per mechanism tick.
    pub arm_ticks_per_tick: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        // truncated 2 * 3 gearbox on the 28 count motor encoder, 75 mm wheel
        let circumference_in = config::WHEEL_DIAMETER_MM / config::MM_PER_INCH * core::f32::consts::PI;
        SimParams {
            dt_ms: 10,
            max_ticks_per_s: 1000.0,
            tolerance_ticks: config::SERVO_TOLERANCE_TICKS as f32,
            ticks_per_inch: 6.0 * config::TICKS_PER_MOTOR_REV / circumference_in,
            track_width_in: 14.0,
            directions: MotorDirections::default(),
            initial_yaw_deg: 0.0,
            arm_load_ticks: 3000.0,
            arm_carry_ticks: 2200.0,
            arm_deliver_ticks: 1000.0,
            arm_ticks_per_tick: 25.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct WheelState {
    mode: ServoMode,
    power: f32,
    target: i32,
    position: f32,
}

/// Shared simulation state.
pub struct SimWorld {
    params: SimParams,
    time_ms: Cell<u64>,
    yaw_deg: Cell<f32>,
    yaw_zero_deg: Cell<f32>,
    wheels: [Cell<WheelState>; 4],
    arm_position: Cell<f32>,
    arm_target: Cell<f32>,
    collector: Cell<CollectorState>,
    mechanism_ticks: Cell<u32>,
    arm_at_release: Cell<Option<i32>>,
    cancel_at_ms: Cell<Option<u64>>,
    end_at_ms: Cell<Option<u64>>,
}

impl SimWorld {
    pub fn new(params: SimParams) -> Self {
        SimWorld {
            params,
            time_ms: Cell::new(0),
            yaw_deg: Cell::new(params.initial_yaw_deg),
            yaw_zero_deg: Cell::new(0.0),
            wheels: Default::default(),
            arm_position: Cell::new(params.arm_load_ticks),
            arm_target: Cell::new(params.arm_load_ticks),
            collector: Cell::new(CollectorState::Closed),
            mechanism_ticks: Cell::new(0),
            arm_at_release: Cell::new(None),
            cancel_at_ms: Cell::new(None),
            end_at_ms: Cell::new(None),
        }
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn now_ms(&self) -> u64 {
        self.time_ms.get()
    }

    /// Advance physics by one `dt`.
    pub fn advance(&self) {
        let p = &self.params;
        let dt_s = p.dt_ms as f32 / 1000.0;
        let max_step = p.max_ticks_per_s * dt_s;

        // robot-frame travel per wheel this tick
        let mut travel = [0.0f32; 4];
        for (i, cell) in self.wheels.iter().enumerate() {
            let mut wheel = cell.get();
            let before = wheel.position;
            match wheel.mode {
                ServoMode::Velocity => wheel.position += wheel.power * max_step,
                ServoMode::Position => {
                    let remaining = wheel.target as f32 - wheel.position;
                    let step = fabsf(wheel.power) * max_step;
                    if fabsf(remaining) <= step {
                        wheel.position = wheel.target as f32;
                    } else {
                        wheel.position += step * remaining.signum();
                    }
                }
            }
            travel[i] = self.direction(i) * (wheel.position - before);
            cell.set(wheel);
        }

        let left_in = (travel[0] + travel[1]) / 2.0 / p.ticks_per_inch;
        let right_in = (travel[2] + travel[3]) / 2.0 / p.ticks_per_inch;
        let dyaw_deg = ((right_in - left_in) / p.track_width_in).to_degrees();
        self.yaw_deg.set(normalize(self.yaw_deg.get() + dyaw_deg));

        self.time_ms.set(self.time_ms.get() + p.dt_ms);
    }

    /// Advance by at least `ms`, in whole physics steps.
    pub fn advance_ms(&self, ms: u64) {
        let steps = ms.div_ceil(self.params.dt_ms);
        for _ in 0..steps {
            self.advance();
        }
    }

    fn direction(&self, index: usize) -> Direction {
        let d = &self.params.directions;
        match index {
            0 => d.f_left,
            1 => d.r_left,
            2 => d.f_right,
            _ => d.r_right,
        }
    }

    // IMU

    pub fn yaw_deg(&self) -> f32 {
        self.yaw_deg.get()
    }

    /// Yaw as the IMU reports it, relative to its last reset.
    pub fn imu_heading(&self) -> f32 {
        normalize(self.yaw_deg.get() - self.yaw_zero_deg.get())
    }

    pub fn reset_imu(&self) {
        self.yaw_zero_deg.set(self.yaw_deg.get());
    }

    /// Knock the robot by `deg`, as a collision would.
    pub fn disturb_yaw(&self, deg: f32) {
        self.yaw_deg.set(normalize(self.yaw_deg.get() + deg));
    }

    // wheels

    pub(crate) fn update_wheel(&self, index: usize, f: impl FnOnce(&mut WheelStateView)) {
        let cell = &self.wheels[index];
        let mut wheel = cell.get();
        let mut view = WheelStateView {
            mode: wheel.mode,
            power: wheel.power,
            target: wheel.target,
        };
        f(&mut view);
        if view.mode != wheel.mode {
            // switching mode drops any pending power, like the motor hubs do
            wheel.power = 0.0;
        } else {
            wheel.power = view.power;
        }
        wheel.mode = view.mode;
        wheel.target = view.target;
        cell.set(wheel);
    }

    pub fn wheel_position(&self, index: usize) -> i32 {
        roundf(self.wheels[index].get().position) as i32
    }

    pub fn wheel_power(&self, index: usize) -> f32 {
        self.wheels[index].get().power
    }

    pub fn wheel_mode(&self, index: usize) -> ServoMode {
        self.wheels[index].get().mode
    }

    pub fn wheel_busy(&self, index: usize) -> bool {
        let wheel = self.wheels[index].get();
        wheel.mode == ServoMode::Position
            && fabsf(wheel.target as f32 - wheel.position) > self.params.tolerance_ticks
    }

    /// `true` when no wheel has power on it.
    pub fn is_stopped(&self) -> bool {
        self.wheels.iter().all(|w| w.get().power == 0.0)
    }

    // mechanism

    pub fn tick_mechanism(&self) {
        let target = self.arm_target.get();
        let position = self.arm_position.get();
        let step = self.params.arm_ticks_per_tick;
        let next = if fabsf(target - position) <= step {
            target
        } else {
            position + step * (target - position).signum()
        };
        self.arm_position.set(next);
        self.mechanism_ticks.set(self.mechanism_ticks.get() + 1);
    }

    pub fn set_arm(&self, position: ArmPosition) {
        let p = &self.params;
        self.arm_target.set(match position {
            ArmPosition::Load => p.arm_load_ticks,
            ArmPosition::Carry => p.arm_carry_ticks,
            ArmPosition::Deliver => p.arm_deliver_ticks,
        });
    }

    pub fn arm_position(&self) -> i32 {
        roundf(self.arm_position.get()) as i32
    }

    pub fn set_collector(&self, state: CollectorState) {
        if state == CollectorState::Open && self.collector.get() != CollectorState::Open {
            self.arm_at_release.set(Some(self.arm_position()));
        }
        self.collector.set(state);
    }

    pub fn collector(&self) -> CollectorState {
        self.collector.get()
    }

    /// Arm reading the last time the collector opened.
    pub fn arm_at_release(&self) -> Option<i32> {
        self.arm_at_release.get()
    }

    pub fn mechanism_ticks(&self) -> u32 {
        self.mechanism_ticks.get()
    }

    // match control

    /// Raise the cancel flag once the clock reaches `ms`.
    pub fn cancel_at(&self, ms: u64) {
        self.cancel_at_ms.set(Some(ms));
    }

    /// End the match (stop running) once the clock reaches `ms`.
    pub fn end_at(&self, ms: u64) {
        self.end_at_ms.set(Some(ms));
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_at_ms.get().is_some_and(|t| self.now_ms() >= t)
    }

    pub fn is_running(&self) -> bool {
        self.end_at_ms.get().map_or(true, |t| self.now_ms() < t)
    }
}

/// What a wheel handle may change.
pub struct WheelStateView {
    pub mode: ServoMode,
    pub power: f32,
    pub target: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32, tol: f32) -> bool {
        fabsf(a - b) < tol
    }

    #[test]
    fn position_mode_stops_on_target() {
        let world = SimWorld::new(SimParams::default());
        world.update_wheel(0, |w| {
            w.mode = ServoMode::Position;
            w.target = 25;
        });
        world.update_wheel(0, |w| w.power = 0.5);
        // 5 ticks per step at half power
        world.advance();
        assert_eq!(world.wheel_position(0), 5);
        assert!(world.wheel_busy(0));
        world.advance_ms(100);
        assert_eq!(world.wheel_position(0), 25);
        assert!(!world.wheel_busy(0));
    }

    #[test]
    fn opposite_sides_spin_counter_clockwise() {
        let world = SimWorld::new(SimParams::default());
        for i in 0..4 {
            let power = if i < 2 { -0.5 } else { 0.5 };
            world.update_wheel(i, |w| w.power = power);
        }
        world.advance_ms(100);
        assert!(world.yaw_deg() > 0.0);
        assert_eq!(world.now_ms(), 100);
    }

    #[test]
    fn straight_travel_keeps_heading() {
        let world = SimWorld::new(SimParams::default());
        for i in 0..4 {
            world.update_wheel(i, |w| w.power = 1.0);
        }
        world.advance_ms(1000);
        assert!(close(world.yaw_deg(), 0.0, 1e-4));
        assert_eq!(world.wheel_position(2), 1000);
    }

    #[test]
    fn imu_reset_rezeroes_heading() {
        let params = SimParams {
            initial_yaw_deg: 30.0,
            ..SimParams::default()
        };
        let world = SimWorld::new(params);
        assert!(close(world.imu_heading(), 30.0, 1e-4));
        world.reset_imu();
        assert!(close(world.imu_heading(), 0.0, 1e-4));
        world.disturb_yaw(-10.0);
        assert!(close(world.imu_heading(), -10.0, 1e-4));
    }

    #[test]
    fn arm_moves_only_when_ticked() {
        let world = SimWorld::new(SimParams::default());
        world.set_arm(ArmPosition::Deliver);
        world.advance_ms(1000);
        assert_eq!(world.arm_position(), 3000);
        world.tick_mechanism();
        assert_eq!(world.arm_position(), 2975);

        world.set_collector(CollectorState::Open);
        assert_eq!(world.arm_at_release(), Some(2975));
    }

    #[test]
    fn mode_switch_drops_power() {
        let world = SimWorld::new(SimParams::default());
        world.update_wheel(1, |w| w.power = 0.7);
        world.update_wheel(1, |w| w.mode = ServoMode::Position);
        assert_eq!(world.wheel_power(1), 0.0);
        assert!(world.is_stopped());
    }
}
