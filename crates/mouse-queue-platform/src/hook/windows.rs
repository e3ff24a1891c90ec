//! Windows implementation: window subclassing and `GetMouseMovePointsEx`.

use super::{client_point_from_lparam, lock_slot};
use crate::error::PlatformResult;
use mouse_queue_core::{
    HistoryPoint, InstallOutcome, MousePoint, MouseQueueContext, MoveHistory, MoveMessage,
    QueueConfig, ResolutionMode, VirtualScreen,
};
use tracing::{debug, error, trace};
use windows_sys::Win32::Foundation::{GetLastError, HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows_sys::Win32::Graphics::Gdi::ClientToScreen;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{GetMouseMovePointsEx, MOUSEMOVEPOINT};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CallWindowProcW, DefWindowProcW, GetMessageTime, GetSystemMetrics, GWLP_WNDPROC,
    SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN, WM_MOUSEMOVE,
    WNDPROC,
};

#[cfg(target_pointer_width = "64")]
unsafe fn set_window_proc(hwnd: HWND, proc_ptr: isize) -> isize {
    windows_sys::Win32::UI::WindowsAndMessaging::SetWindowLongPtrW(hwnd, GWLP_WNDPROC, proc_ptr)
}

#[cfg(target_pointer_width = "32")]
unsafe fn set_window_proc(hwnd: HWND, proc_ptr: isize) -> isize {
    windows_sys::Win32::UI::WindowsAndMessaging::SetWindowLongW(
        hwnd,
        GWLP_WNDPROC,
        proc_ptr as i32,
    ) as isize
}

/// Swap the window procedure of `window` for [`wnd_proc_hook`].
pub fn install(window: usize, config: QueueConfig) -> PlatformResult<InstallOutcome> {
    let hwnd = window as HWND;
    let replacement = wnd_proc_hook as usize as isize;

    let outcome = lock_slot().install(window, replacement, config, || {
        let previous = unsafe { set_window_proc(hwnd, replacement) };
        if previous == 0 {
            let code = unsafe { GetLastError() };
            error!(window, code, "SetWindowLongPtrW(GWLP_WNDPROC) failed");
            None
        } else {
            debug!(window, previous, "Window procedure swapped");
            Some(previous)
        }
    })?;
    Ok(outcome)
}

/// Movement history backed by `GetMouseMovePointsEx`.
struct WindowsHistory;

impl MoveHistory for WindowsHistory {
    fn query(
        &self,
        reference: &HistoryPoint,
        mode: ResolutionMode,
        out: &mut [HistoryPoint],
    ) -> usize {
        let input = MOUSEMOVEPOINT {
            x: reference.x,
            y: reference.y,
            time: reference.time,
            dwExtraInfo: reference.extra_info,
        };
        let mut points: [MOUSEMOVEPOINT; mouse_queue_core::MAX_HISTORY_DEPTH] =
            unsafe { std::mem::zeroed() };
        let capacity = out.len().min(points.len());

        let count = unsafe {
            GetMouseMovePointsEx(
                std::mem::size_of::<MOUSEMOVEPOINT>() as u32,
                &input,
                points.as_mut_ptr(),
                capacity as i32,
                mode.as_raw(),
            )
        };
        if count < 0 {
            // ERROR_POINT_NOT_FOUND is routine when the cursor has not moved
            trace!(code = unsafe { GetLastError() }, "GetMouseMovePointsEx failed");
            return 0;
        }

        let count = (count as usize).min(capacity);
        for (dst, src) in out.iter_mut().zip(&points[..count]) {
            *dst = HistoryPoint {
                x: src.x,
                y: src.y,
                time: src.time,
                extra_info: src.dwExtraInfo,
            };
        }
        count
    }

    fn virtual_screen(&self) -> VirtualScreen {
        unsafe {
            VirtualScreen {
                left: GetSystemMetrics(SM_XVIRTUALSCREEN),
                top: GetSystemMetrics(SM_YVIRTUALSCREEN),
                width: GetSystemMetrics(SM_CXVIRTUALSCREEN),
                height: GetSystemMetrics(SM_CYVIRTUALSCREEN),
            }
        }
    }
}

/// Queue history points for one `WM_MOUSEMOVE`.
fn coalesce(ctx: &mut MouseQueueContext, hwnd: HWND, lparam: LPARAM) {
    let client = client_point_from_lparam(lparam);
    let mut screen = POINT {
        x: client.x,
        y: client.y,
    };
    unsafe { ClientToScreen(hwnd, &mut screen) };
    let time = unsafe { GetMessageTime() } as u32;

    let message = MoveMessage {
        screen: MousePoint::new(screen.x, screen.y),
        time,
    };
    if let Err(e) = ctx.on_mouse_move(message, &WindowsHistory) {
        error!(error = %e, "Failed to queue mouse movement");
    }
}

/// Replacement window procedure.
///
/// The slot lock is released before forwarding: the original procedure may
/// re-enter through `SendMessage`.
unsafe extern "system" fn wnd_proc_hook(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let trampoline = lock_slot().observe(&msg, |ctx, &msg| {
        if msg == WM_MOUSEMOVE {
            coalesce(ctx, hwnd, lparam);
        }
    });

    match trampoline {
        Some(trampoline) => trampoline.forward(
            (hwnd, msg, wparam, lparam),
            |original, (hwnd, msg, wparam, lparam)| {
                let original = std::mem::transmute::<isize, WNDPROC>(original);
                CallWindowProcW(original, hwnd, msg, wparam, lparam)
            },
        ),
        None => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
