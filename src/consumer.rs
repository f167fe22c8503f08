//! The verifying side of the protocol.
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use crate::error::InvalidAddress;
use crate::mailbox::Inbox;
use crate::register::{MutexRegister, Register};
use crate::register_file::RegisterFile;
use crate::stop::StopSignal;
use crate::transaction::{MatchResult, Transaction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConsumerState {
    Idle,
    Waiting,
    Verifying,
    Reporting,
    Stopped,
}

/// What a consumer observed before it was stopped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerReport {
    /// One result per verified transaction, in the order they were received.
    pub results: Vec<MatchResult>,
    /// Reads rejected by the register file.
    pub invalid: Vec<InvalidAddress>,
    /// Transactions still in the mailbox when the consumer was stopped.
    pub dropped: Vec<Transaction>,
}

/// Receives transactions and checks them against the register file.
///
/// A consumer has no natural end: it keeps waiting for transactions, even
/// after the mailbox is closed, until its [`StopSignal`] is raised. A
/// transaction that has been received is always verified before the consumer
/// stops; transactions still queued at that point are reported as dropped.
pub struct Consumer<R: Register = MutexRegister> {
    registers: Arc<RegisterFile<R>>,
    inbox: Inbox,
    pacing: Duration,
    stop: StopSignal,
    state: ConsumerState,
}

impl<R: Register> Consumer<R> {
    pub fn new(
        registers: Arc<RegisterFile<R>>,
        inbox: Inbox,
        pacing: Duration,
        stop: StopSignal,
    ) -> Self {
        Self {
            registers,
            inbox,
            pacing,
            stop,
            state: ConsumerState::Idle,
        }
    }

    pub async fn run(mut self) -> ConsumerReport {
        let mut report = ConsumerReport::default();

        loop {
            self.enter(ConsumerState::Waiting);
            let received = tokio::select! {
                biased;
                _ = self.stop.stopped() => break,
                received = self.inbox.get() => received,
            };
            let Some(transaction) = received else {
                debug!("mailbox closed, waiting to be stopped");
                self.stop.stopped().await;
                break;
            };

            self.enter(ConsumerState::Verifying);
            self.verify(transaction, &mut report);

            if !self.pace().await {
                break;
            }
        }

        self.enter(ConsumerState::Stopped);
        report.dropped = self.inbox.drain();
        for transaction in &report.dropped {
            warn!("CONSUMER DROP {transaction}");
        }
        info!(
            consumed = report.results.len(),
            dropped = report.dropped.len(),
            "CONSUMER STOPPED"
        );
        report
    }

    fn verify(&mut self, transaction: Transaction, report: &mut ConsumerReport) {
        let read = self.registers.read(transaction.address);

        self.enter(ConsumerState::Reporting);
        match read {
            Ok(actual) => {
                let result = MatchResult::compare(&transaction, actual);
                if result.matched {
                    info!("CONSUMER MATCH addr={}", result.address);
                } else {
                    warn!(
                        "CONSUMER MISMATCH addr={} expected={:#04x} actual={:#04x}",
                        result.address, result.expected, result.actual
                    );
                }
                report.results.push(result);
            }
            Err(error) => {
                error!(%error, "CONSUMER INVALID {transaction}");
                report.invalid.push(error);
            }
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

    fn enter(&mut self, state: ConsumerState) {
        trace!(from = ?self.state, to = ?state, "consumer");
        self.state = state;
    }
}
