use snafu::Snafu;

/// Static configuration rejected at construction time.
///
/// Nothing in the control loops produces errors; every value that could make
/// them misbehave is checked once, before the first motor command.
#[derive(Debug, Clone, Copy, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    /// Wheel diameter is zero, negative or not finite.
    #[snafu(display("wheel diameter must be positive and finite, got {diameter} in"))]
    WheelDiameter {
        /// The rejected diameter in inches.
        diameter: f32,
    },

    /// Encoder resolution is zero, negative or not finite.
    #[snafu(display("encoder ticks per motor revolution must be positive, got {ticks}"))]
    TicksPerRev {
        /// The rejected tick count.
        ticks: f32,
    },

    /// No gear stages were configured.
    #[snafu(display("gear train has no stages"))]
    EmptyGearTrain,

    /// A gear stage has a zero tooth count.
    #[snafu(display("gear stage {index} has a zero tooth count"))]
    GearStage {
        /// Position of the stage in the train.
        index: usize,
    },

    /// The compound ratio came out as zero (or worse).
    #[snafu(display("compound gear ratio must be positive, got {ratio}"))]
    GearRatio {
        /// The computed compound ratio.
        ratio: f32,
    },

    /// A field calibration constant is out of range.
    #[snafu(display("calibration value `{name}` is out of range"))]
    Calibration {
        /// Name of the offending setting.
        name: &'static str,
    },

    /// A controller gain, threshold or timing value is out of range.
    #[snafu(display("motion tuning value `{name}` is out of range"))]
    Tuning {
        /// Name of the offending setting.
        name: &'static str,
    },

    /// The routine does not fit in the fixed-capacity path buffer.
    #[snafu(display("path exceeds {capacity} steps"))]
    PathTooLong {
        /// Capacity of the path buffer.
        capacity: usize,
    },
}
