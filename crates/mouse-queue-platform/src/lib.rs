//! mouse-queue-platform: platform-specific I/O boundary for window-mouse-queue.
//!
//! This crate provides:
//! - Window procedure interception for a single host window
//! - Movement history harvesting on each mouse move message
//! - The process-wide movement queue and its polling accessors
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `hook` - Window procedure hook, history query and queue accessors

mod error;
mod hook;

// Re-export error types
pub use error::{PlatformError, PlatformResult};

// Re-export hook and queue accessors
pub use hook::{
    clear, client_point_from_lparam, drain, drain_into, install, is_installed, queue_len,
    with_queue,
};

pub use mouse_queue_core::{InstallOutcome, MousePoint, QueueConfig, ResolutionMode};
