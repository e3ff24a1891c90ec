//! Common error types for mouse-queue-platform.

use mouse_queue_core::QueueError;
use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("window procedure hooks are not supported on this platform")]
    NotSupported,
    #[error("null window handle")]
    NullWindow,
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
