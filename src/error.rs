use std::sync::Arc;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("unknown event type: {0:?}")]
    UnknownEventType(String),
    #[error("config channel must not be empty")]
    EmptyChannel,
    #[error("error parsing stream item")]
    Parse(#[source] Arc<serde_json::Error>),
    #[error("stream driver needs at least one worker")]
    InvalidWorkerCount,
    #[error("stream driver is stopped")]
    DriverStopped,
    #[error("stream driver thread panicked")]
    DriverThreadPanicked,
    // std::io::Error is not clonable, so we're wrapping it in an Arc.
    #[error(transparent)]
    Io(Arc<std::io::Error>),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(Arc::new(value))
    }
}
