//! Heading-hold motion control for a four-wheel skid-steer robot.
//!
//! The crate is split the same way the robot is wired:
//!
//! - [`controller`]: the pure pieces. Heading error and steering correction,
//!   encoder distance conversion, drive/turn mixing and the four-wheel
//!   drivetrain grouping.
//! - [`motion`]: the closed-loop primitives (drive straight, turn to heading,
//!   hold heading) and the scoring hand-off, each as a single-step state
//!   machine plus a blocking wrapper on [`motion::pilot::Pilot`].
//! - [`sequencer`]: builds the autonomous routine from a [`RunConfig`] and
//!   executes it one control iteration at a time.
//! - [`drivers`]: a position-servo wheel for dual-PWM bridges with a
//!   quadrature counter.
//! - [`sim`]: a lockstep simulation of the drivetrain, IMU and arm so the whole
//!   routine runs on a host.
//!
//! Everything in here is `no_std` and allocation free. Devices are injected
//! through the traits in [`interfaces`].

#![no_std]

pub mod config;
pub mod error;
pub mod field;
pub mod interfaces;

pub mod controller {
    pub mod distance;
    pub mod drivetrain;
    pub mod heading;
    pub mod mixer;
    pub mod tuning;
}

pub mod drivers {
    pub mod encoder {
        pub mod n20;
    }
    pub mod motor {
        pub mod mdd3a;
        pub mod servo_wheel;
    }
}

pub mod motion {
    pub mod deliver;
    pub mod pilot;
    pub mod primitives;
    pub mod telemetry;
}

pub mod sequencer {
    pub mod constants;
    pub mod path;
    pub mod run_config;
    pub mod runner;
}

pub mod sim {
    pub mod devices;
    pub mod world;
}

pub use controller::heading::{correction, mirror, normalize};
pub use controller::mixer::mix;
pub use error::ConfigError;
pub use field::{Alliance, Lane};
pub use motion::pilot::{Pilot, PilotSettings, Robot};
pub use motion::primitives::MotionOutcome;
pub use sequencer::run_config::RunConfig;
pub use sequencer::runner::{run_autonomous_program, RunOutcome};
