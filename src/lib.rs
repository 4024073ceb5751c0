//! Purchase path evaluation over a keyed event stream joined with broadcast channel configuration.
//!
//! # Overview
//!
//! The crate revolves around a [`PurchasePathEvaluator`] that consumes two input streams:
//!
//! - the configuration stream, carrying one [`Config`] per channel (last write wins);
//! - the event stream, carrying user [`Event`]s tagged with an [`EventType`].
//!
//! Events are buffered per channel and user. When a [`EventType::Purchase`] event arrives, the
//! user's buffered purchase path is evaluated against the channel's current config and, if it
//! qualifies, an [`EvaluatedResult`] counting events per type is emitted. The buffer is cleared
//! after every purchase whether or not a result was emitted. Channels without a config fall back
//! to a default one (see [`Config::default`]).
//!
//! A [`ResultSink`] should be provided to forward results to your storage or alerting.
//!
//! [`StreamDriver`] feeds both streams from a pool of worker threads, partitioned by channel. The
//! [`adapter`] module decodes JSON-lines input and writes JSON-lines output.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum. They only occur at the edges: malformed input,
//! configs without a channel, or a stopped driver. A purchase path that does not qualify is not an
//! error; evaluation returns `None` instead.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging
//! messages under the `purchase_path` target. Consider integrating a `log`-compatible logger
//! implementation for better visibility into evaluator operations.
//!
//! # Examples
//!
//! Examples can be found in the `demos` directory of the crate repository.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapter;
mod buffer_store;
mod config;
mod config_table;
mod driver;
mod error;
mod eval;
mod evaluator;
mod model;
mod partitioner;
mod result_sink;

pub use buffer_store::{BufferKey, EventBufferStore, UserEventBuffer};
pub use config::EvaluatorConfig;
pub use config_table::ConfigTable;
pub use driver::StreamDriver;
pub use error::{Error, Result};
pub use eval::HISTORY_PURCHASE_TIMES_LIMIT;
pub use evaluator::PurchasePathEvaluator;
pub use model::{Config, EvaluatedResult, Event, EventType, StreamItem};
pub use partitioner::{Md5Partitioner, Partitioner};
pub use result_sink::ResultSink;
