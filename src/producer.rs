//! The writing side of the protocol.
//!
//! A [`Producer`] takes transactions from a source, writes each one into the
//! register file, and only then puts a copy into the mailbox. Because the
//! write always completes before the transaction can be received, a consumer
//! that reads the same address after receiving it sees the written value
//! unless a later transaction overwrote it in the meantime.
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{error, info, trace};

use crate::error::{InvalidAddress, MailboxClosed};
use crate::mailbox::Outbox;
use crate::register::{MutexRegister, Register};
use crate::register_file::{mask, RegisterFile};
use crate::stop::StopSignal;
use crate::transaction::Transaction;

/// An endless source of random transactions that are valid for a register
/// file.
///
/// Addresses are drawn uniformly from `0..depth` and data uniformly from
/// `0..2^width`, so every generated transaction can be written.
///
/// # Examples
///
/// ```
/// use regbox::producer::RandomTransactions;
///
/// let transactions: Vec<_> = RandomTransactions::new(8, 8, 42).take(100).collect();
/// assert!(transactions.iter().all(|t| t.address < 8 && t.data <= 0xff));
///
/// // The same seed produces the same transactions.
/// let again: Vec<_> = RandomTransactions::new(8, 8, 42).take(100).collect();
/// assert_eq!(transactions, again);
/// ```
#[derive(Clone, Debug)]
pub struct RandomTransactions {
    rng: StdRng,
    depth: usize,
    max_value: u64,
}

impl RandomTransactions {
    /// Creates a source for a file of `depth` registers of `width` bits.
    ///
    /// `depth` must be non-zero and `width` in `1..=64`; a validated
    /// [`Config`](crate::Config) guarantees both.
    pub fn new(width: u32, depth: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            depth,
            max_value: mask(width),
        }
    }
}

impl Iterator for RandomTransactions {
    type Item = Transaction;

    fn next(&mut self) -> Option<Transaction> {
        let address = self.rng.gen_range(0..self.depth);
        let data = self.rng.gen_range(0..=self.max_value);
        Some(Transaction::new(address, data))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProducerState {
    Idle,
    Generating,
    Writing,
    Publishing,
    Pacing,
    Done,
}

/// What a producer did before it finished or was stopped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProducerReport {
    /// Number of transactions the producer was asked to issue.
    pub expected: usize,
    /// Number of transactions taken from the source.
    pub issued: usize,
    /// Transactions put into the mailbox, in order.
    pub published: Vec<Transaction>,
    /// Writes rejected by the register file. These were never published.
    pub invalid: Vec<InvalidAddress>,
    /// A transaction that was written but could not be put before the
    /// producer was stopped.
    pub unpublished: Option<Transaction>,
    /// Whether all `expected` transactions were issued.
    pub completed: bool,
}

enum Publish {
    Sent,
    Stopped,
    Closed(MailboxClosed),
}

pub struct Producer<I, R: Register = MutexRegister> {
    registers: Arc<RegisterFile<R>>,
    outbox: Outbox,
    transactions: I,
    count: usize,
    pacing: Duration,
    stop: StopSignal,
    state: ProducerState,
}

impl<I, R> Producer<I, R>
where
    I: Iterator<Item = Transaction>,
    R: Register,
{
    /// Creates a producer that issues `count` transactions from
    /// `transactions`, waiting `pacing` after each one.
    pub fn new(
        registers: Arc<RegisterFile<R>>,
        outbox: Outbox,
        transactions: impl IntoIterator<IntoIter = I>,
        count: usize,
        pacing: Duration,
        stop: StopSignal,
    ) -> Self {
        Self {
            registers,
            outbox,
            transactions: transactions.into_iter(),
            count,
            pacing,
            stop,
            state: ProducerState::Idle,
        }
    }

    /// Issues transactions until `count` have been issued, the source runs
    /// dry, or the producer is stopped.
    ///
    /// The mailbox is closed when this returns.
    pub async fn run(mut self) -> ProducerReport {
        let mut report = ProducerReport {
            expected: self.count,
            ..ProducerReport::default()
        };

        while report.issued < self.count {
            self.enter(ProducerState::Generating);
            let Some(transaction) = self.transactions.next() else {
                error!(
                    issued = report.issued,
                    expected = self.count,
                    "PRODUCER SOURCE EXHAUSTED"
                );
                break;
            };
            report.issued += 1;

            self.enter(ProducerState::Writing);
            match self.registers.write(transaction.address, transaction.data) {
                Ok(()) => {
                    self.enter(ProducerState::Publishing);
                    info!("PRODUCER SEND {transaction}");
                    match self.publish(transaction).await {
                        Publish::Sent => report.published.push(transaction),
                        Publish::Stopped => {
                            report.unpublished = Some(transaction);
                            return self.finish(report);
                        }
                        Publish::Closed(error) => {
                            error!(%error, "PRODUCER SEND FAILED");
                            report.unpublished = Some(transaction);
                            return self.finish(report);
                        }
                    }
                }
                // Unreachable for generated transactions. An aborted
                // iteration is neither published nor paced.
                Err(error) => {
                    error!(%error, "PRODUCER ABORT {transaction}");
                    report.invalid.push(error);
                    if self.stop.is_stopped() {
                        return self.finish(report);
                    }
                    continue;
                }
            }

            self.enter(ProducerState::Pacing);
            if !self.pace().await {
                return self.finish(report);
            }
        }

        report.completed = report.issued == self.count;
        self.finish(report)
    }

    async fn publish(&mut self, transaction: Transaction) -> Publish {
        tokio::select! {
            biased;
            sent = self.outbox.put(transaction) => match sent {
                Ok(()) => Publish::Sent,
                Err(error) => Publish::Closed(error),
            },
            _ = self.stop.stopped() => Publish::Stopped,
        }
    }

    /// Waits for the pacing interval, returning `false` if stopped first.
    async fn pace(&mut self) -> bool {
        if self.pacing.is_zero() {
            return !self.stop.is_stopped();
        }
        tokio::select! {
            biased;
            _ = self.stop.stopped() => false,
            _ = sleep(self.pacing) => true,
        }
    }

    fn finish(&mut self, report: ProducerReport) -> ProducerReport {
        self.enter(ProducerState::Done);
        info!(
            issued = report.issued,
            published = report.published.len(),
            completed = report.completed,
            "PRODUCER DONE"
        );
        report
    }

    fn enter(&mut self, state: ProducerState) {
        trace!(from = ?self.state, to = ?state, "producer");
        self.state = state;
    }
}
