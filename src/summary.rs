//! The outcome of a run.
use std::fmt;

use serde::Serialize;

use crate::consumer::ConsumerReport;
use crate::error::{Failure, InvalidAddress};
use crate::producer::ProducerReport;
use crate::transaction::{MatchResult, Transaction};

/// Why a run was stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The producer finished and the grace period elapsed.
    GraceElapsed,
    /// The hard deadline was reached first.
    Deadline,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub produced: usize,
    pub consumed: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub dropped: usize,
    pub invalid: usize,
}

/// Everything the producer and the consumer reported during a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub counts: Counts,
    pub termination: Termination,
    pub producer_completed: bool,
    /// Transactions the producer was asked to issue.
    pub expected: usize,
    /// Transactions the producer took from its source.
    pub issued: usize,
    /// Transactions put into the mailbox, in order.
    pub published: Vec<Transaction>,
    /// Verification results, in the order the consumer received them.
    pub results: Vec<MatchResult>,
    /// Transactions left in the mailbox at shutdown.
    pub dropped: Vec<Transaction>,
    /// Writes rejected by the register file. These were never published.
    pub rejected_writes: Vec<InvalidAddress>,
    /// Reads of published transactions rejected by the register file.
    pub rejected_reads: Vec<InvalidAddress>,
    /// A transaction written but not put because the producer was stopped.
    pub unpublished: Option<Transaction>,
    /// Contents of the register file at shutdown.
    pub registers: Vec<u64>,
}

impl Summary {
    pub fn new(
        producer: ProducerReport,
        consumer: ConsumerReport,
        registers: Vec<u64>,
        termination: Termination,
    ) -> Self {
        let matched = consumer.results.iter().filter(|r| r.matched).count();
        let counts = Counts {
            produced: producer.published.len(),
            consumed: consumer.results.len(),
            matched,
            mismatched: consumer.results.len() - matched,
            dropped: consumer.dropped.len(),
            invalid: producer.invalid.len() + consumer.invalid.len(),
        };

        Self {
            counts,
            termination,
            producer_completed: producer.completed,
            expected: producer.expected,
            issued: producer.issued,
            published: producer.published,
            results: consumer.results,
            dropped: consumer.dropped,
            rejected_writes: producer.invalid,
            rejected_reads: consumer.invalid,
            unpublished: producer.unpublished,
            registers,
        }
    }

    pub fn produced(&self) -> usize {
        self.counts.produced
    }

    pub fn consumed(&self) -> usize {
        self.counts.consumed
    }

    pub fn matched(&self) -> usize {
        self.counts.matched
    }

    pub fn mismatched(&self) -> usize {
        self.counts.mismatched
    }

    /// Returns every reason this run failed verification.
    ///
    /// A run passes only if every published transaction was consumed and
    /// matched, no access was rejected, and the producer issued all of its
    /// transactions.
    pub fn failures(&self) -> Vec<Failure> {
        let Counts {
            produced,
            consumed,
            mismatched,
            dropped,
            invalid,
            ..
        } = self.counts;

        let mut failures = Vec::new();
        if mismatched > 0 {
            failures.push(Failure::Mismatched { count: mismatched });
        }
        if invalid > 0 {
            failures.push(Failure::InvalidAddress { count: invalid });
        }
        if dropped > 0 {
            failures.push(Failure::Dropped { count: dropped });
        }
        if !self.producer_completed {
            failures.push(Failure::ProducerIncomplete {
                issued: self.issued,
                expected: self.expected,
            });
        }
        let accounted = consumed + dropped + self.rejected_reads.len();
        if accounted != produced {
            failures.push(Failure::Inconsistent {
                produced,
                consumed,
                dropped,
            });
        }
        failures
    }

    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Counts {
            produced,
            consumed,
            matched,
            mismatched,
            dropped,
            invalid,
        } = self.counts;
        write!(
            f,
            "SUMMARY produced={produced} consumed={consumed} matched={matched} \
             mismatched={mismatched} dropped={dropped} invalid={invalid}"
        )
    }
}
