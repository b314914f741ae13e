//! Console logger for simulated runs.
//!
//! Each line carries the level, the time since the logger was installed and
//! the target:
//!
//! ```text
//! INFO [1s 2ms] gyrodrive::sequencer::runner - step 3/12: TurnTo { .. }
//! ```

use std::sync::OnceLock;
use std::time::Instant;

use humantime::{format_duration, FormattedDuration};
use log::{LevelFilter, Metadata, Record, SetLoggerError};

pub struct ConsoleLogger {
    started: Instant,
}

impl ConsoleLogger {
    fn uptime(&self) -> FormattedDuration {
        // whole milliseconds, humantime would otherwise print down to the ns
        let elapsed = self.started.elapsed();
        format_duration(std::time::Duration::from_millis(elapsed.as_millis() as u64))
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!(
                "{} [{}] {} - {}",
                record.level(),
                self.uptime(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

/// Install the console logger. Fails if a logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| ConsoleLogger {
        started: Instant::now(),
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

#[cfg(test)]
mod tests {
    use log::{debug, LevelFilter};

    #[test]
    fn installs_once() {
        super::init(LevelFilter::Debug).unwrap();
        debug!("logger up");
        assert!(super::init(LevelFilter::Info).is_err());
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }
}
