use embedded_hal::{PwmPin, Qei};
use num_traits::{clamp, Float};
use pid::Pid;

use crate::config;
use crate::drivers::encoder::n20::QeiWrapper;
use crate::drivers::motor::mdd3a::MDD3A;
use crate::interfaces::{DriveActuator, ServoMode};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServoTuning {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub p_lim: f32,
    pub i_lim: f32,
    pub d_lim: f32,
    pub out_lim: f32,
    /// A position move counts as arrived within this many ticks.
    pub tolerance_ticks: i32,
}

impl Default for ServoTuning {
    fn default() -> ServoTuning {
        ServoTuning {
            kp: config::SERVO_KP,
            ki: config::SERVO_KI,
            kd: config::SERVO_KD,
            p_lim: config::SERVO_P_LIM,
            i_lim: config::SERVO_I_LIM,
            d_lim: config::SERVO_D_LIM,
            out_lim: config::SERVO_OUT_LIM,
            tolerance_ticks: config::SERVO_TOLERANCE_TICKS,
        }
    }
}

/// A brushed wheel motor behind an MDD3A bridge, closed in software on a
/// quadrature counter.
///
/// In position mode the commanded power is the speed limit of the move and
/// the PID loop is stepped on every `set_power` and `is_busy` call, so the
/// owner's control loop is also the servo loop. In velocity mode power goes
/// straight to the bridge.
pub struct ServoWheel<X, Y, Q> {
    bridge: MDD3A<X, Y>,
    encoder: QeiWrapper<Q>,
    pid: Pid<f32>,
    mode: ServoMode,
    speed_limit: f32,
    target: i32,
    tolerance: i32,
}

impl<X, Y, Q> ServoWheel<X, Y, Q>
where
    X: PwmPin<Duty = u16>,
    Y: PwmPin<Duty = u16>,
    Q: Qei<Count = u16>,
{
    pub fn new(bridge: MDD3A<X, Y>, encoder: QeiWrapper<Q>, t: ServoTuning) -> Self {
        let mut wheel = ServoWheel {
            bridge,
            encoder,
            pid: Pid::new(t.kp, t.ki, t.kd, t.p_lim, t.i_lim, t.d_lim, t.out_lim, 0.0),
            mode: ServoMode::Velocity,
            speed_limit: 0.0,
            target: 0,
            tolerance: t.tolerance_ticks,
        };
        wheel.bridge.start();
        wheel.bridge.set_power(0.0);
        return wheel;
    }

    pub fn mode(&self) -> ServoMode {
        self.mode
    }

    fn servo_step(&mut self) -> i32 {
        let position = self.encoder.position();
        let output = self.pid.next_control_output(position as f32).output;
        self.bridge
            .set_power(clamp(output, -self.speed_limit, self.speed_limit));
        return position;
    }

    pub fn release(self) -> (MDD3A<X, Y>, QeiWrapper<Q>) {
        (self.bridge, self.encoder)
    }
}

impl<X, Y, Q> DriveActuator for ServoWheel<X, Y, Q>
where
    X: PwmPin<Duty = u16>,
    Y: PwmPin<Duty = u16>,
    Q: Qei<Count = u16>,
{
    fn set_target_position(&mut self, ticks: i32) {
        self.target = ticks;
        self.pid.setpoint = ticks as f32;
    }

    fn current_position(&mut self) -> i32 {
        self.encoder.position()
    }

    fn set_power(&mut self, power: f32) {
        match self.mode {
            ServoMode::Velocity => self.bridge.set_power(power),
            ServoMode::Position => {
                self.speed_limit = clamp(power.abs(), 0.0, 1.0);
                self.servo_step();
            }
        }
    }

    fn is_busy(&mut self) -> bool {
        if self.mode != ServoMode::Position {
            return false;
        }
        let position = self.servo_step();
        (self.target - position).abs() > self.tolerance
    }

    fn set_mode(&mut self, mode: ServoMode) {
        if mode != self.mode {
            self.pid.reset_integral_term();
            self.bridge.set_power(0.0);
        }
        self.mode = mode;
    }
}
