//! Run configuration.
//!
//! Durations are counted in abstract *time units*; [`Config::time_unit`]
//! converts them into wall-clock time.
use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mailbox::Capacity;
use crate::register_file::MAX_WIDTH;

/// Default number of bits in each register.
pub const WIDTH: u32 = 8;
/// Default number of registers in the file.
pub const DEPTH: usize = 8;
/// Default number of transactions issued by the producer.
pub const TRANSACTION_COUNT: usize = 5;
/// Default number of time units the producer waits after each transaction.
pub const PACING_INTERVAL: u64 = 10;
/// Default number of time units the consumer is given to catch up once the
/// producer is done.
pub const SHUTDOWN_GRACE: u64 = 50;
/// Default number of time units after which a run is stopped regardless of
/// progress.
pub const DEADLINE: u64 = 150;
/// Default length of a time unit.
pub const TIME_UNIT: Duration = Duration::from_millis(1);

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct Config {
    /// Number of bits in each register.
    pub width: u32,
    /// Number of registers in the file.
    pub depth: usize,
    /// Number of transactions issued by a random producer.
    pub transaction_count: usize,
    /// Time units the producer waits after publishing each transaction.
    pub pacing_interval: u64,
    /// Time units the consumer waits after verifying each transaction.
    /// Defaults to `pacing_interval` when unset.
    pub consumer_pacing_interval: Option<u64>,
    /// Time units between the producer finishing and the consumer being
    /// stopped.
    pub shutdown_grace: u64,
    /// Time units, counted from the start of the run, after which both the
    /// producer and the consumer are stopped.
    pub deadline: u64,
    /// Maximum number of queued transactions, or `None` for no limit.
    pub mailbox_capacity: Option<usize>,
    /// Seed for the random producer. A fresh seed is drawn when unset.
    pub seed: Option<u64>,
    /// Wall-clock length of a single time unit.
    pub time_unit: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: WIDTH,
            depth: DEPTH,
            transaction_count: TRANSACTION_COUNT,
            pacing_interval: PACING_INTERVAL,
            consumer_pacing_interval: None,
            shutdown_grace: SHUTDOWN_GRACE,
            deadline: DEADLINE,
            mailbox_capacity: None,
            seed: None,
            time_unit: TIME_UNIT,
        }
    }
}

impl Config {
    /// Checks that a register file and mailbox can be built from this
    /// configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_WIDTH).contains(&self.width) {
            return Err(ConfigError::WidthOutOfRange(self.width));
        }
        if self.depth == 0 {
            return Err(ConfigError::EmptyRegisterFile);
        }
        if self.mailbox_capacity == Some(0) {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.deadline == 0 {
            return Err(ConfigError::ZeroDeadline);
        }
        if self.time_unit.is_zero() {
            return Err(ConfigError::ZeroTimeUnit);
        }
        let intervals = [
            self.pacing_interval,
            self.consumer_pacing_interval.unwrap_or(self.pacing_interval),
            self.shutdown_grace,
            self.deadline,
        ];
        for units in intervals {
            if self.checked_units(units).is_none() {
                return Err(ConfigError::DurationOverflow(units));
            }
        }
        Ok(())
    }

    /// Returns the capacity of the mailbox.
    pub fn capacity(&self) -> Capacity {
        match self.mailbox_capacity.and_then(NonZeroUsize::new) {
            Some(size) => Capacity::Bounded(size),
            None => Capacity::Unbounded,
        }
    }

    /// Converts a number of time units into wall-clock time.
    ///
    /// Saturates at [`Duration::MAX`], which a validated configuration never
    /// reaches.
    pub fn units(&self, units: u64) -> Duration {
        self.checked_units(units).unwrap_or(Duration::MAX)
    }

    fn checked_units(&self, units: u64) -> Option<Duration> {
        const NANOS_PER_SEC: u128 = 1_000_000_000;
        let nanos = self.time_unit.as_nanos().checked_mul(u128::from(units))?;
        let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
        // The remainder is below one second.
        Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
    }

    pub fn producer_pacing(&self) -> Duration {
        self.units(self.pacing_interval)
    }

    pub fn consumer_pacing(&self) -> Duration {
        self.units(
            self.consumer_pacing_interval
                .unwrap_or(self.pacing_interval),
        )
    }

    pub fn grace(&self) -> Duration {
        self.units(self.shutdown_grace)
    }

    pub fn deadline(&self) -> Duration {
        self.units(self.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod validate {
        use super::*;

        #[test]
        fn accepts_defaults() {
            assert_eq!(Config::default().validate(), Ok(()));
        }

        #[test]
        fn rejects_zero_width() {
            let config = Config {
                width: 0,
                ..Config::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::WidthOutOfRange(0)));
        }

        #[test]
        fn rejects_zero_depth() {
            let config = Config {
                depth: 0,
                ..Config::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::EmptyRegisterFile));
        }

        #[test]
        fn rejects_zero_capacity() {
            let config = Config {
                mailbox_capacity: Some(0),
                ..Config::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
        }

        #[test]
        fn rejects_zero_deadline() {
            let config = Config {
                deadline: 0,
                ..Config::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::ZeroDeadline));
        }

        #[test]
        fn rejects_zero_time_unit() {
            let config = Config {
                time_unit: Duration::ZERO,
                ..Config::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::ZeroTimeUnit));
        }

        #[test]
        fn rejects_intervals_too_long_for_a_duration() {
            let config = Config {
                time_unit: Duration::from_secs(2),
                shutdown_grace: u64::MAX,
                ..Config::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::DurationOverflow(u64::MAX))
            );
        }
    }

    mod durations {
        use super::*;

        #[test]
        fn scale_by_time_unit() {
            let config = Config {
                time_unit: Duration::from_micros(100),
                ..Config::default()
            };
            assert_eq!(config.producer_pacing(), Duration::from_millis(1));
            assert_eq!(config.grace(), Duration::from_millis(5));
            assert_eq!(config.deadline(), Duration::from_millis(15));
        }

        #[test]
        fn do_not_saturate_past_u32_units() {
            let units = u64::from(u32::MAX) + 1;
            let config = Config {
                time_unit: Duration::from_nanos(1),
                deadline: units,
                ..Config::default()
            };
            assert_eq!(config.validate(), Ok(()));
            assert_eq!(config.deadline(), Duration::from_nanos(units));
        }

        #[test]
        fn consumer_pacing_follows_producer_unless_set() {
            let mut config = Config::default();
            assert_eq!(config.consumer_pacing(), config.producer_pacing());

            config.consumer_pacing_interval = Some(0);
            assert_eq!(config.consumer_pacing(), Duration::ZERO);
        }
    }

    #[test]
    fn deserializes_partial_json_over_defaults() {
        let config: Config = serde_json::from_str(r#"{"depth": 16, "seed": 3}"#).unwrap();
        assert_eq!(config.depth, 16);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.width, WIDTH);
    }
}
