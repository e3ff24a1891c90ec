//! Window procedure hook and the process-wide movement queue.
//!
//! The host callback convention gives the window procedure no context
//! pointer, so the single [`HookSlot`] lives in a static here. Everything
//! below this boundary takes the context explicitly.
//!
//! Platform implementations:
//! - Windows: subclasses the window via `SetWindowLongPtrW` and harvests
//!   `GetMouseMovePointsEx` history (`windows.rs`)
//! - Other platforms: installation reports `NotSupported`

use crate::error::{PlatformError, PlatformResult};
use mouse_queue_core::{HookSlot, InstallOutcome, MousePoint, MovementQueue, QueueConfig};
use std::sync::{Mutex, MutexGuard};

#[cfg(windows)]
mod windows;

/// The active hook. The saved handler is stored as the raw pointer value
/// returned by the platform swap call.
static HOOK: Mutex<HookSlot<isize>> = Mutex::new(HookSlot::new());

fn lock_slot() -> MutexGuard<'static, HookSlot<isize>> {
    HOOK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Decode the client-area position packed into a mouse message `lParam`.
pub fn client_point_from_lparam(lparam: isize) -> MousePoint {
    MousePoint {
        x: (lparam & 0xFFFF) as u16 as i16 as i32,
        y: ((lparam >> 16) & 0xFFFF) as u16 as i16 as i32,
    }
}

/// Hook the window procedure of `window` (a raw window handle).
///
/// Calling again for the same window resets the filter state and the queue.
/// A different window is refused while a hook is active.
pub fn install(window: usize, config: QueueConfig) -> PlatformResult<InstallOutcome> {
    if window == 0 {
        return Err(PlatformError::NullWindow);
    }

    #[cfg(windows)]
    {
        windows::install(window, config)
    }
    #[cfg(not(windows))]
    {
        let _ = config;
        Err(PlatformError::NotSupported)
    }
}

/// Whether a window is currently hooked.
pub fn is_installed() -> bool {
    lock_slot().is_installed()
}

/// Run `f` against the live queue, or return `None` when nothing is hooked.
pub fn with_queue<R>(f: impl FnOnce(&mut MovementQueue) -> R) -> Option<R> {
    lock_slot().context_mut().map(|ctx| f(ctx.queue_mut()))
}

/// Number of buffered points.
pub fn queue_len() -> usize {
    with_queue(|queue| queue.len()).unwrap_or(0)
}

/// Copy buffered points into `dst` and clear the queue.
pub fn drain_into(dst: &mut [MousePoint]) -> PlatformResult<usize> {
    let drained = with_queue(|queue| queue.drain_into(dst)).unwrap_or(Ok(0))?;
    Ok(drained)
}

/// Take buffered points as an owned vector and clear the queue.
pub fn drain() -> Vec<MousePoint> {
    with_queue(|queue| queue.drain()).unwrap_or_default()
}

/// Discard buffered points.
pub fn clear() {
    with_queue(|queue| queue.clear());
}
