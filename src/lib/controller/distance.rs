use core::f32::consts::PI;

use heapless::Vec;
use libm::roundf;
use snafu::ensure;

use crate::config;
use crate::error::{
    CalibrationSnafu, ConfigError, EmptyGearTrainSnafu, GearRatioSnafu, GearStageSnafu,
    TicksPerRevSnafu, WheelDiameterSnafu,
};

pub const MAX_GEAR_STAGES: usize = 4;

// the default train must fit, `Default` relies on it
const _: () = assert!(config::GEAR_STAGES.len() <= MAX_GEAR_STAGES);

/// How a stage's tooth counts become a ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StageRatio {
    /// `driven / driving` as a float.
    Exact,
    /// Integer division per stage. The field calibration below was tuned
    /// against this, so it stays the default.
    #[default]
    Truncated,
}

/// One reduction stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GearStage {
    pub driven_teeth: u16,
    pub driving_teeth: u16,
}

impl GearStage {
    pub const fn new(driven_teeth: u16, driving_teeth: u16) -> Self {
        Self {
            driven_teeth,
            driving_teeth,
        }
    }

    pub fn ratio(&self, mode: StageRatio) -> f32 {
        match mode {
            StageRatio::Exact => self.driven_teeth as f32 / self.driving_teeth as f32,
            StageRatio::Truncated => (self.driven_teeth / self.driving_teeth) as f32,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DriveGeometry {
    pub wheel_diameter_in: f32,
    pub ticks_per_motor_rev: f32,
    pub gear_stages: Vec<GearStage, MAX_GEAR_STAGES>,
    pub stage_ratio: StageRatio,
    /// Multiplies every commanded distance to make up for wheel slip.
    pub slip_compensation: f32,
    /// Subtracted after slip compensation.
    pub fixed_offset_in: f32,
}

impl DriveGeometry {
    pub fn with_wheel_diameter_mm(mut self, diameter_mm: f32) -> Self {
        self.wheel_diameter_in = diameter_mm / config::MM_PER_INCH;
        self
    }
}

impl Default for DriveGeometry {
    fn default() -> Self {
        let mut gear_stages = Vec::new();
        for (driven, driving) in config::GEAR_STAGES {
            // cannot fail, checked at compile time above
            let _ = gear_stages.push(GearStage::new(driven, driving));
        }

        Self {
            wheel_diameter_in: config::WHEEL_DIAMETER_MM / config::MM_PER_INCH,
            ticks_per_motor_rev: config::TICKS_PER_MOTOR_REV,
            gear_stages,
            stage_ratio: StageRatio::default(),
            slip_compensation: config::SLIP_COMPENSATION,
            fixed_offset_in: config::FIXED_OFFSET_IN,
        }
    }
}

/// Linear distance to wheel encoder ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceConverter {
    ticks_per_inch: f32,
    slip_compensation: f32,
    fixed_offset_in: f32,
}

impl DistanceConverter {
    pub fn new(geometry: &DriveGeometry) -> Result<Self, ConfigError> {
        let diameter = geometry.wheel_diameter_in;
        ensure!(
            diameter.is_finite() && diameter > 0.0,
            WheelDiameterSnafu { diameter }
        );

        let ticks = geometry.ticks_per_motor_rev;
        ensure!(ticks.is_finite() && ticks > 0.0, TicksPerRevSnafu { ticks });

        ensure!(!geometry.gear_stages.is_empty(), EmptyGearTrainSnafu);
        let mut ratio = 1.0;
        for (index, stage) in geometry.gear_stages.iter().enumerate() {
            ensure!(
                stage.driven_teeth != 0 && stage.driving_teeth != 0,
                GearStageSnafu { index }
            );
            ratio *= stage.ratio(geometry.stage_ratio);
        }
        ensure!(ratio > 0.0, GearRatioSnafu { ratio });

        // a non-positive factor would make ticks() non-monotonic
        ensure!(
            geometry.slip_compensation.is_finite() && geometry.slip_compensation > 0.0,
            CalibrationSnafu {
                name: "slip_compensation"
            }
        );
        ensure!(
            geometry.fixed_offset_in.is_finite(),
            CalibrationSnafu {
                name: "fixed_offset_in"
            }
        );

        let circumference = diameter * PI;
        Ok(Self {
            ticks_per_inch: (ratio * ticks) / circumference,
            slip_compensation: geometry.slip_compensation,
            fixed_offset_in: geometry.fixed_offset_in,
        })
    }

    pub fn ticks_per_inch(&self) -> f32 {
        self.ticks_per_inch
    }

    pub fn inches_per_tick(&self) -> f32 {
        1.0 / self.ticks_per_inch
    }

    /// Encoder ticks to command for `distance_in` inches of travel.
    pub fn ticks(&self, distance_in: f32) -> i32 {
        let corrected = distance_in * self.slip_compensation - self.fixed_offset_in;
        return roundf(corrected / self.inches_per_tick()) as i32;
    }
}

#[cfg(test)]
mod tests {
    use num_traits::Float;

    use super::*;

    fn converter() -> DistanceConverter {
        DistanceConverter::new(&DriveGeometry::default()).unwrap()
    }

    #[test]
    fn default_geometry_keeps_every_configured_stage() {
        let geometry = DriveGeometry::default();
        assert_eq!(geometry.gear_stages.len(), config::GEAR_STAGES.len());
        for (stage, (driven, driving)) in geometry.gear_stages.iter().zip(config::GEAR_STAGES) {
            assert_eq!(*stage, GearStage::new(driven, driving));
        }
    }

    #[test]
    fn default_geometry_uses_truncated_stages() {
        // 84/29 -> 2, 76/21 -> 3
        let tpi = converter().ticks_per_inch();
        let expected = 6.0 * 28.0 / (75.0 / 25.4 * PI);
        assert!((tpi - expected).abs() < 1e-3);
        assert!((tpi - 18.11).abs() < 0.01);
    }

    #[test]
    fn exact_stages_are_opt_in() {
        let geometry = DriveGeometry {
            stage_ratio: StageRatio::Exact,
            ..DriveGeometry::default()
        };
        let tpi = DistanceConverter::new(&geometry).unwrap().ticks_per_inch();
        let ratio = (84.0 / 29.0) * (76.0 / 21.0);
        let expected = ratio * 28.0 / (75.0 / 25.4 * PI);
        assert!((tpi - expected).abs() < 1e-2);
    }

    #[test]
    fn ticks_for_calibrated_distances() {
        let c = converter();
        assert_eq!(c.ticks(-26.0), -811);
        assert_eq!(c.ticks(0.0), -10);
        assert_eq!(c.ticks(23.0), 698);
    }

    #[test]
    fn ticks_are_monotonic() {
        let c = converter();
        let mut last = c.ticks(-100.0);
        let mut d = -100.0;
        while d <= 100.0 {
            let t = c.ticks(d);
            assert!(t >= last);
            last = t;
            d += 0.25;
        }
    }

    #[test]
    fn metric_wheel_diameter() {
        let geometry = DriveGeometry::default().with_wheel_diameter_mm(25.4 * 3.0);
        assert!((geometry.wheel_diameter_in - 3.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_geometry() {
        let zero_wheel = DriveGeometry {
            wheel_diameter_in: 0.0,
            ..DriveGeometry::default()
        };
        assert_eq!(
            DistanceConverter::new(&zero_wheel),
            Err(ConfigError::WheelDiameter { diameter: 0.0 })
        );

        let no_gears = DriveGeometry {
            gear_stages: Vec::new(),
            ..DriveGeometry::default()
        };
        assert_eq!(
            DistanceConverter::new(&no_gears),
            Err(ConfigError::EmptyGearTrain)
        );

        let mut stripped = DriveGeometry::default();
        stripped.gear_stages[1] = GearStage::new(76, 0);
        assert_eq!(
            DistanceConverter::new(&stripped),
            Err(ConfigError::GearStage { index: 1 })
        );

        // 20/29 truncates to zero
        let mut overdrive = DriveGeometry::default();
        overdrive.gear_stages[0] = GearStage::new(20, 29);
        assert_eq!(
            DistanceConverter::new(&overdrive),
            Err(ConfigError::GearRatio { ratio: 0.0 })
        );

        let no_slip = DriveGeometry {
            slip_compensation: 0.0,
            ..DriveGeometry::default()
        };
        assert_eq!(
            DistanceConverter::new(&no_slip),
            Err(ConfigError::Calibration {
                name: "slip_compensation"
            })
        );
    }
}
