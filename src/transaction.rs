//! Values exchanged between the producer and the consumer.
use std::fmt;

use serde::{Deserialize, Serialize};

/// An intent to store `data` in the register at `address`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash, Serialize)]
pub struct Transaction {
    pub address: usize,
    pub data: u64,
}

impl Transaction {
    pub fn new(address: usize, data: u64) -> Self {
        Self { address, data }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addr={} data={:#04x}", self.address, self.data)
    }
}

/// The outcome of re-reading the register named by a [`Transaction`].
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub address: usize,
    /// The value the producer claims to have written.
    pub expected: u64,
    /// The value the consumer actually read.
    pub actual: u64,
    pub matched: bool,
}

impl MatchResult {
    /// Compares the value read back from `transaction.address` against
    /// `transaction.data`.
    pub fn compare(transaction: &Transaction, actual: u64) -> Self {
        Self {
            address: transaction.address,
            expected: transaction.data,
            actual,
            matched: transaction.data == actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod display {
        use super::*;

        #[test]
        fn formats_data_as_hex() {
            let transaction = Transaction::new(3, 0x5a);
            assert_eq!(transaction.to_string(), "addr=3 data=0x5a");
        }
    }

    mod compare {
        use super::*;

        #[test]
        fn matches_equal_values() {
            let result = MatchResult::compare(&Transaction::new(7, 0xff), 0xff);
            assert!(result.matched);
            assert_eq!(result.address, 7);
        }

        #[test]
        fn records_both_values_on_mismatch() {
            let result = MatchResult::compare(&Transaction::new(2, 0x10), 0x20);
            assert!(!result.matched);
            assert_eq!(result.expected, 0x10);
            assert_eq!(result.actual, 0x20);
        }
    }
}
