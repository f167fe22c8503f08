//! A FIFO hand-off channel with exactly one writing end and one reading end.
//!
//! A mailbox is created as a pair: an [`Outbox`] that the producer [puts]
//! transactions into and an [`Inbox`] that the consumer [gets] them from.
//! Transactions are delivered exactly once, in the order they were put.
//!
//! [puts]: Outbox::put
//! [gets]: Inbox::get
//!
//! # Examples
//!
//! ```
//! use regbox::mailbox::{mailbox, Capacity};
//! use regbox::Transaction;
//!
//! # tokio_test::block_on(async {
//! let (outbox, mut inbox) = mailbox(Capacity::Unbounded);
//!
//! outbox.put(Transaction::new(3, 0x5a)).await.unwrap();
//! outbox.put(Transaction::new(7, 0xff)).await.unwrap();
//!
//! assert_eq!(inbox.get().await, Some(Transaction::new(3, 0x5a)));
//! assert_eq!(inbox.try_get(), Some(Transaction::new(7, 0xff)));
//! assert_eq!(inbox.try_get(), None);
//! # })
//! ```
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::MailboxClosed;
use crate::transaction::Transaction;

/// How many transactions a mailbox can hold before `put` suspends.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    /// `put` never suspends.
    #[default]
    Unbounded,
    /// `put` suspends while the mailbox holds this many transactions.
    Bounded(NonZeroUsize),
}

/// Creates a mailbox, returning its writing and reading ends.
pub fn mailbox(capacity: Capacity) -> (Outbox, Inbox) {
    match capacity {
        Capacity::Unbounded => {
            let (sender, receiver) = mpsc::unbounded_channel();
            (
                Outbox(Sender::Unbounded(sender)),
                Inbox(Receiver::Unbounded(receiver)),
            )
        }
        Capacity::Bounded(size) => {
            let (sender, receiver) = mpsc::channel(size.get());
            (
                Outbox(Sender::Bounded(sender)),
                Inbox(Receiver::Bounded(receiver)),
            )
        }
    }
}

#[derive(Debug)]
enum Sender {
    Bounded(mpsc::Sender<Transaction>),
    Unbounded(mpsc::UnboundedSender<Transaction>),
}

#[derive(Debug)]
enum Receiver {
    Bounded(mpsc::Receiver<Transaction>),
    Unbounded(mpsc::UnboundedReceiver<Transaction>),
}

/// The writing end of a mailbox.
///
/// Dropping the outbox closes the mailbox: once the transactions already in
/// it have been taken, [`Inbox::get`] returns `None`.
#[derive(Debug)]
pub struct Outbox(Sender);

impl Outbox {
    /// Puts a transaction into the mailbox, suspending while a bounded
    /// mailbox is full.
    ///
    /// Fails only if the [`Inbox`] has been dropped, in which case the
    /// transaction is handed back inside the error.
    ///
    /// Cancelling a suspended `put` discards the transaction without
    /// delivering it.
    pub async fn put(&self, transaction: Transaction) -> Result<(), MailboxClosed> {
        let sent = match &self.0 {
            Sender::Bounded(sender) => sender.send(transaction).await,
            Sender::Unbounded(sender) => sender.send(transaction),
        };
        sent.map_err(|error| MailboxClosed(error.0))
    }
}

/// The reading end of a mailbox.
#[derive(Debug)]
pub struct Inbox(Receiver);

impl Inbox {
    /// Takes the oldest transaction, suspending while the mailbox is empty.
    ///
    /// Returns `None` once the [`Outbox`] has been dropped and every
    /// transaction has been taken. Cancelling a suspended `get` never loses
    /// a transaction.
    pub async fn get(&mut self) -> Option<Transaction> {
        match &mut self.0 {
            Receiver::Bounded(receiver) => receiver.recv().await,
            Receiver::Unbounded(receiver) => receiver.recv().await,
        }
    }

    /// Takes the oldest transaction if there is one, without suspending.
    pub fn try_get(&mut self) -> Option<Transaction> {
        match &mut self.0 {
            Receiver::Bounded(receiver) => receiver.try_recv().ok(),
            Receiver::Unbounded(receiver) => receiver.try_recv().ok(),
        }
    }

    /// Takes every transaction currently in the mailbox, oldest first.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::iter::from_fn(|| self.try_get()).collect()
    }
}
