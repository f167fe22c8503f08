//! A shared register file verified by a producer and a consumer that are
//! synchronized through a mailbox.
//!
//! The [`Producer`](producer::Producer) writes randomly addressed values into a
//! [`RegisterFile`](register_file::RegisterFile) and forwards a copy of each
//! [`Transaction`](transaction::Transaction) through a
//! [`mailbox`]. The [`Consumer`](consumer::Consumer) re-reads every address it
//! receives and checks that it sees the value the producer claims to have
//! written. A [`Coordinator`](coordinator::Coordinator) runs both as tokio
//! tasks and decides when to stop them.
//!
//! # Examples
//!
//! ```
//! use regbox::config::Config;
//! use regbox::coordinator::Coordinator;
//!
//! # tokio_test::block_on(async {
//! let config = Config {
//!     seed: Some(7),
//!     ..Config::default()
//! };
//! let summary = Coordinator::new(config).unwrap().run().await.unwrap();
//!
//! assert_eq!(summary.produced(), 5);
//! assert!(summary.is_success());
//! # })
//! ```
pub mod config;
pub mod consumer;
pub mod coordinator;
pub mod error;
pub mod mailbox;
pub mod producer;
pub mod register;
pub mod register_file;
pub mod stop;
pub mod summary;
pub(crate) mod sync;
pub mod transaction;

pub use config::Config;
pub use coordinator::Coordinator;
pub use error::{ConfigError, Failure, InvalidAddress, RunError};
pub use summary::Summary;
pub use transaction::{MatchResult, Transaction};
