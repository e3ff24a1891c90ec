//! mouse-queue-core: movement coalescing and point queue.
//!
//! Design goal: keep this crate free of any windowing API so the hook,
//! filter and queue logic can be tested without a real window.
//! Platform specific I/O (handler swap, history query) lives in
//! `mouse-queue-platform`.

mod coalescer;
mod config;
mod error;
mod hook;
mod point;
mod queue;
pub mod wire;

pub use coalescer::{HookState, MouseQueueContext, MoveHistory, MoveMessage};
pub use config::{QueueConfig, MAX_HISTORY_DEPTH};
pub use error::{QueueError, QueueResult, WireError};
pub use hook::{HookSlot, InstallOutcome, Trampoline};
pub use point::{
    mask_coord, scale_high_res_coord, unpack_display_coord, HistoryPoint, MousePoint,
    ResolutionMode, VirtualScreen,
};
pub use queue::{MovementQueue, DEFAULT_INITIAL_CAPACITY, MAX_QUEUE_CAPACITY};
