//! Errors and verification failures.
use serde::Serialize;
use thiserror::Error;

use crate::transaction::Transaction;

/// An access to an address outside of a register file.
///
/// The access is a no-op: the register file is left unchanged.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Serialize)]
#[error("address {address} is outside of the register file [0, {depth})")]
pub struct InvalidAddress {
    /// The rejected address.
    pub address: usize,
    /// The number of registers in the file that rejected it.
    pub depth: usize,
}

/// A configuration that cannot be run.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("register width must be between 1 and 64 bits, got {0}")]
    WidthOutOfRange(u32),
    #[error("register file must contain at least one register")]
    EmptyRegisterFile,
    #[error("a bounded mailbox must have room for at least one transaction")]
    ZeroCapacity,
    #[error("the shutdown deadline must be at least one time unit")]
    ZeroDeadline,
    #[error("a time unit must be longer than zero")]
    ZeroTimeUnit,
    #[error("{0} time units do not fit in a duration")]
    DurationOverflow(u64),
}

/// The reading end of a mailbox was dropped before a transaction could be put.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("mailbox closed before {0} was delivered")]
pub struct MailboxClosed(pub Transaction);

/// An error that prevented a run from producing a [`Summary`](crate::Summary).
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("task did not run to completion: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A reason that a completed run failed verification.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    #[error("{count} transaction(s) read back a different value than was written")]
    Mismatched { count: usize },
    #[error("{count} access(es) to an invalid address")]
    InvalidAddress { count: usize },
    #[error("{count} transaction(s) were still queued at shutdown")]
    Dropped { count: usize },
    #[error("producer issued {issued} of {expected} transaction(s) before it was stopped")]
    ProducerIncomplete { issued: usize, expected: usize },
    #[error("counts are inconsistent: produced {produced}, consumed {consumed}, dropped {dropped}")]
    Inconsistent {
        produced: usize,
        consumed: usize,
        dropped: usize,
    },
}
