use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use regbox::{Config, Transaction};

pub const NUM_RUNS: u64 = 16;
pub const NUM_TRANSACTIONS: usize = 20;

/// The default configuration with a fixed seed.
pub fn config() -> Config {
    Config {
        seed: Some(0),
        ..Config::default()
    }
}

/// A configuration in which neither side ever waits, so the producer runs
/// through its whole script before the consumer gets a turn.
pub fn unpaced() -> Config {
    Config {
        pacing_interval: 0,
        consumer_pacing_interval: Some(0),
        ..config()
    }
}

/// A random script of valid transactions, allowing repeated addresses.
pub fn random_script(seed: u64, len: usize) -> Vec<Transaction> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len)
        .map(|_| Transaction::new(rng.gen_range(0..8), rng.gen_range(0..=0xff)))
        .collect()
}
