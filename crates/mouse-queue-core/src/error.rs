//! Error types for mouse-queue-core.

use thiserror::Error;

/// Errors raised by the host byte writer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("buffer overflow: writing {needed} bytes, {remaining} remaining")]
    Overflow { needed: usize, remaining: usize },
}

/// Errors raised by the queue, the coalescer and the hook slot.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("out of memory growing queue to {requested} points")]
    OutOfMemory { requested: usize },
    #[error("destination too small: {needed} points buffered, room for {provided}")]
    DestinationTooSmall { needed: usize, provided: usize },
    #[error("window procedure swap returned no previous handler")]
    HookInstallationFailure,
    #[error("hook already installed on window {window:#x}")]
    AlreadyInstalled { window: usize },
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type QueueResult<T> = Result<T, QueueError>;
