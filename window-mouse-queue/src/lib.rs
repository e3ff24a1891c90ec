//! window-mouse-queue: C ABI surface loaded by the host runtime.
//!
//! Every export returns `f64`, the host's only numeric type. Failures are
//! logged and reported as `0` (installation) or `-1` (drain contract).

mod logging;

use mouse_queue_core::wire::ByteWriter;
use mouse_queue_core::{MousePoint, QueueConfig, QueueResult};
use mouse_queue_platform::{PlatformError, PlatformResult};
use std::ffi::{c_char, c_void, CStr};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info, warn};

/// Count last handed out by [`window_mouse_queue_get_1`]; the size the
/// caller allocated for [`window_mouse_queue_get_2`].
static REPORTED_COUNT: AtomicUsize = AtomicUsize::new(0);

const OK: f64 = 1.0;
const FAILED: f64 = 0.0;
const CONTRACT_VIOLATION: f64 = -1.0;

fn install(hwnd: *mut c_void, config: QueueConfig) -> f64 {
    logging::init();
    match mouse_queue_platform::install(hwnd as usize, config) {
        Ok(outcome) => {
            info!(?outcome, "window_mouse_queue ready");
            REPORTED_COUNT.store(0, Ordering::SeqCst);
            OK
        }
        Err(e) => {
            error!(error = %e, "window_mouse_queue install failed");
            FAILED
        }
    }
}

fn drain_result(result: PlatformResult<usize>) -> f64 {
    match result {
        Ok(count) => count as f64,
        Err(e) => {
            warn!(error = %e, "Drain rejected, points kept");
            CONTRACT_VIOLATION
        }
    }
}

/// Convert a host-supplied element count for a buffer of `T`, treating NaN
/// and negatives as zero. Counts no slice of `T` can span are rejected.
fn host_len<T>(value: f64) -> Option<usize> {
    if value.is_nan() || value <= 0.0 {
        return Some(0);
    }
    let max = isize::MAX as usize / std::mem::size_of::<T>().max(1);
    let len = value as usize;
    (len <= max).then_some(len)
}

/// Hook `hwnd` with the default configuration.
#[no_mangle]
pub extern "C" fn window_mouse_queue_init_raw(hwnd: *mut c_void) -> f64 {
    install(hwnd, QueueConfig::default())
}

/// Hook `hwnd` with a JSON [`QueueConfig`].
///
/// # Safety
/// `json` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn window_mouse_queue_init_json(
    hwnd: *mut c_void,
    json: *const c_char,
) -> f64 {
    logging::init();
    if json.is_null() {
        return install(hwnd, QueueConfig::default());
    }
    let config = CStr::from_ptr(json)
        .to_str()
        .map_err(|e| e.to_string())
        .and_then(|s| QueueConfig::from_json(s).map_err(|e| e.to_string()));
    match config {
        Ok(config) => install(hwnd, config),
        Err(e) => {
            error!(error = %e, "Invalid window_mouse_queue config");
            FAILED
        }
    }
}

/// Number of buffered points. The caller sizes the `get_2` buffer from this.
#[no_mangle]
pub extern "C" fn window_mouse_queue_get_1() -> f64 {
    let count = mouse_queue_platform::queue_len();
    REPORTED_COUNT.store(count, Ordering::SeqCst);
    count as f64
}

/// Copy buffered points into `dst`, sized from the preceding `get_1`, and
/// clear the queue. Returns `-1` and keeps the points if more arrived in
/// between than `dst` was sized for.
///
/// # Safety
/// `dst` must be valid for writes of the count returned by the last `get_1`.
#[no_mangle]
pub unsafe extern "C" fn window_mouse_queue_get_2(dst: *mut MousePoint) -> f64 {
    if dst.is_null() {
        warn!("window_mouse_queue_get_2 called with null buffer");
        return CONTRACT_VIOLATION;
    }
    let capacity = REPORTED_COUNT.swap(0, Ordering::SeqCst);
    let dst = std::slice::from_raw_parts_mut(dst, capacity);
    drain_result(mouse_queue_platform::drain_into(dst))
}

/// Copy buffered points into `dst` holding `capacity` points.
///
/// # Safety
/// `dst` must be valid for writes of `capacity` points.
#[no_mangle]
pub unsafe extern "C" fn window_mouse_queue_drain_checked(
    dst: *mut MousePoint,
    capacity: f64,
) -> f64 {
    let Some(capacity) = host_len::<MousePoint>(capacity) else {
        warn!("window_mouse_queue_drain_checked capacity out of range");
        return CONTRACT_VIOLATION;
    };
    if dst.is_null() && capacity > 0 {
        return CONTRACT_VIOLATION;
    }
    let dst: &mut [MousePoint] = if capacity == 0 {
        &mut []
    } else {
        std::slice::from_raw_parts_mut(dst, capacity)
    };
    drain_result(mouse_queue_platform::drain_into(dst))
}

/// Write buffered points into a host byte buffer as a `u32`-counted list of
/// `(i32, i32)` pairs and clear the queue.
///
/// # Safety
/// `buf` must be valid for writes of `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn window_mouse_queue_drain_buffer(buf: *mut u8, size: f64) -> f64 {
    let Some(size) = host_len::<u8>(size) else {
        warn!("window_mouse_queue_drain_buffer size out of range");
        return CONTRACT_VIOLATION;
    };
    if buf.is_null() {
        return CONTRACT_VIOLATION;
    }
    let mut writer = ByteWriter::new(std::slice::from_raw_parts_mut(buf, size));
    let result = mouse_queue_platform::with_queue(|queue| -> QueueResult<usize> {
        writer.write_points(queue.as_slice())?;
        let count = queue.len();
        queue.clear();
        Ok(count)
    })
    .unwrap_or_else(|| -> QueueResult<usize> {
        writer.write_points(&[])?;
        Ok(0)
    });
    drain_result(result.map_err(PlatformError::from))
}

/// Discard buffered points.
#[no_mangle]
pub extern "C" fn window_mouse_queue_clear() -> f64 {
    mouse_queue_platform::clear();
    OK
}
