use num_traits::Float;

/// Drive and turn demand before saturation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionCommand {
    pub drive: f32,
    pub turn: f32,
}

/// Per-side power, each in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelCommand {
    pub left: f32,
    pub right: f32,
}

impl WheelCommand {
    pub const STOP: WheelCommand = WheelCommand {
        left: 0.0,
        right: 0.0,
    };
}

/// Differential mix. Positive turn is counter-clockwise.
///
/// If either side would exceed full power both are scaled down by the larger
/// magnitude, which keeps the left/right ratio and therefore the arc.
pub fn mix(drive: f32, turn: f32) -> WheelCommand {
    let mut left = drive - turn;
    let mut right = drive + turn;

    let max = left.abs().max(right.abs());
    if max > 1.0 {
        left /= max;
        right /= max;
    }

    WheelCommand { left, right }
}

impl From<MotionCommand> for WheelCommand {
    fn from(command: MotionCommand) -> Self {
        mix(command.drive, command.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn saturated_mix_keeps_ratio() {
        let out = mix(0.9, 0.3);
        assert!(close(out.left, 0.5));
        assert!(close(out.right, 1.0));
    }

    #[test]
    fn unsaturated_mix_is_untouched() {
        let out = mix(0.2, 0.1);
        assert!(close(out.left, 0.1));
        assert!(close(out.right, 0.3));
        assert_eq!(mix(0.0, 0.0), WheelCommand::STOP);
    }

    #[test]
    fn outputs_stay_in_range() {
        let demands = [-3.0, -1.0, -0.4, 0.0, 0.7, 1.0, 2.5];
        for drive in demands {
            for turn in demands {
                let out = mix(drive, turn);
                assert!(out.left.abs() <= 1.0 + 1e-6);
                assert!(out.right.abs() <= 1.0 + 1e-6);
            }
        }
    }

    #[test]
    fn from_motion_command() {
        let out: WheelCommand = MotionCommand { drive: 0.0, turn: 0.25 }.into();
        assert!(close(out.left, -0.25));
        assert!(close(out.right, 0.25));
    }
}
