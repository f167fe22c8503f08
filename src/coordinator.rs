//! Runs a producer and a consumer against a shared register file.
//!
//! # Termination
//!
//! A run stops as soon as either
//!
//! * the producer has issued all of its transactions **and** the grace period
//!   has elapsed since it did, or
//! * the hard deadline, counted from the start of the run, is reached.
//!
//! The producer is always stopped and joined before the consumer is stopped.
//! Once the producer is gone nothing more can be put into the mailbox, so
//! whatever the consumer finds queued when it stops is exactly what was
//! dropped.
//!
//! Each run gets its own zeroed register file and mailbox. Nothing carries
//! over from one run to the next.
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::consumer::Consumer;
use crate::error::{ConfigError, RunError};
use crate::mailbox::mailbox;
use crate::producer::{Producer, RandomTransactions};
use crate::register::{MutexRegister, Register};
use crate::register_file::RegisterFile;
use crate::stop;
use crate::summary::{Summary, Termination};
use crate::transaction::Transaction;

pub struct Coordinator<R: Register = MutexRegister> {
    config: Config,
    backend: PhantomData<fn() -> R>,
}

impl Coordinator<MutexRegister> {
    /// Creates a coordinator whose register file is locked per register.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_backend(config)
    }
}

impl<R: Register + 'static> Coordinator<R> {
    /// Creates a coordinator whose register files are made of `R`s.
    pub fn with_backend(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            backend: PhantomData,
        })
    }

    /// Runs a producer that issues `transaction_count` random transactions.
    pub async fn run(&self) -> Result<Summary, RunError> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!(seed, "generating random transactions");
        let transactions = RandomTransactions::new(self.config.width, self.config.depth, seed);
        self.execute(transactions, self.config.transaction_count).await
    }

    /// Runs a producer that issues exactly the transactions in `script`, in
    /// order.
    ///
    /// Unlike generated transactions, scripted ones may name invalid
    /// addresses.
    pub async fn run_script(&self, script: Vec<Transaction>) -> Result<Summary, RunError> {
        let count = script.len();
        self.execute(script.into_iter(), count).await
    }

    async fn execute<I>(&self, transactions: I, count: usize) -> Result<Summary, RunError>
    where
        I: Iterator<Item = Transaction> + Send + 'static,
    {
        let registers = Arc::new(RegisterFile::<R>::with_backend(
            self.config.width,
            self.config.depth,
        )?);
        let deadline = sleep(self.config.deadline());
        tokio::pin!(deadline);

        let (outbox, inbox) = mailbox(self.config.capacity());
        let (stop_producer, producer_signal) = stop::signal();
        let (stop_consumer, consumer_signal) = stop::signal();

        let producer = Producer::new(
            registers.clone(),
            outbox,
            transactions,
            count,
            self.config.producer_pacing(),
            producer_signal,
        );
        let consumer = Consumer::new(
            registers.clone(),
            inbox,
            self.config.consumer_pacing(),
            consumer_signal,
        );

        let mut producer = tokio::spawn(producer.run());
        let consumer = tokio::spawn(consumer.run());

        let (producer_report, termination) = tokio::select! {
            report = &mut producer => {
                let report = report?;
                tokio::select! {
                    _ = sleep(self.config.grace()) => (report, Termination::GraceElapsed),
                    _ = &mut deadline => (report, Termination::Deadline),
                }
            }
            _ = &mut deadline => {
                warn!("deadline reached before the producer finished");
                stop_producer.stop();
                (producer.await?, Termination::Deadline)
            }
        };

        info!(?termination, "stopping consumer");
        stop_consumer.stop();
        let consumer_report = consumer.await?;

        let summary = Summary::new(
            producer_report,
            consumer_report,
            registers.snapshot(),
            termination,
        );
        info!("{summary}");
        for failure in summary.failures() {
            warn!(%failure, "verification failed");
        }
        Ok(summary)
    }
}
