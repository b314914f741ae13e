use embedded_hal::PwmPin;
use num_traits::{clamp, Float};

/*
Helper Function
input: -1.0 <= power <= 1.0, anything outside is clamped
out: (duty, 0) forward or (0, duty) reverse, duty <= max_duty
Description: one input of the bridge is driven while the other is held low,
the sign of power picks which one
*/
pub fn convert_power_to_duty(power: f32, max_duty: u16) -> (u16, u16) {
    let power = clamp(power, -1.0, 1.0);
    let duty = (power.abs() * max_duty as f32) as u16; //truncate

    if power < 0.0 {
        return (0, duty);
    } else {
        return (duty, 0);
    }
}

/// Dual-input brushed motor bridge (Cytron MDD3A and friends).
pub struct MDD3A<X, Y> {
    pwm: (X, Y),
}

impl<X, Y> MDD3A<X, Y>
where
    X: PwmPin<Duty = u16>,
    Y: PwmPin<Duty = u16>,
{
    pub fn new(in1: (X, Y)) -> Self {
        Self { pwm: in1 }
    }

    pub fn start(&mut self) {
        self.pwm.0.enable();
        self.pwm.1.enable();
    }

    /// Signed power in [-1, 1].
    pub fn set_power(&mut self, power: f32) {
        let (x, y) = convert_power_to_duty(power, self.max_duty());
        self.pwm.0.set_duty(x);
        self.pwm.1.set_duty(y);
    }

    pub fn max_duty(&self) -> u16 {
        // both channels share a timer on the boards this was wired to
        self.pwm.0.get_max_duty().min(self.pwm.1.get_max_duty())
    }

    pub fn duty(&self) -> (u16, u16) {
        (self.pwm.0.get_duty(), self.pwm.1.get_duty())
    }

    pub fn release(self) -> (X, Y) {
        self.pwm
    }
}
