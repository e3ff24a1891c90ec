//! Hook slot: the single active window-procedure interception.
//!
//! The slot pairs a [`Trampoline`] (saved original handler plus the
//! replacement installed in its place) with the [`MouseQueueContext`] the
//! replacement feeds. Only one window can be hooked per slot; there is no
//! teardown, so the hook stays active for the life of the process.

use crate::coalescer::MouseQueueContext;
use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use tracing::{debug, info, warn};

/// Saved forwarding target for an intercepted window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trampoline<P> {
    window: usize,
    original: P,
    replacement: P,
}

impl<P: Copy> Trampoline<P> {
    pub fn new(window: usize, original: P, replacement: P) -> Self {
        Self {
            window,
            original,
            replacement,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn original(&self) -> P {
        self.original
    }

    pub fn replacement(&self) -> P {
        self.replacement
    }

    /// Hand `message` to the original handler.
    pub fn forward<M, R>(&self, message: M, call: impl FnOnce(P, M) -> R) -> R {
        call(self.original, message)
    }
}

/// Outcome of a successful [`HookSlot::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The handler was swapped for the first time.
    Installed,
    /// The window was already hooked; state and queue were reset.
    Reinitialized,
}

#[derive(Debug)]
struct ActiveHook<P> {
    trampoline: Trampoline<P>,
    context: MouseQueueContext,
}

/// Process-wide holder of the active hook.
#[derive(Debug)]
pub struct HookSlot<P> {
    active: Option<ActiveHook<P>>,
}

impl<P: Copy> HookSlot<P> {
    pub const fn new() -> Self {
        Self { active: None }
    }

    pub fn is_installed(&self) -> bool {
        self.active.is_some()
    }

    /// Hook `window`.
    ///
    /// `swap` installs `replacement` and returns the previous handler, or
    /// `None` when the platform refused. Nothing becomes active unless the
    /// swap succeeds. Hooking the same window again applies `config` and
    /// resets its context without swapping; hooking a different window is
    /// refused.
    pub fn install(
        &mut self,
        window: usize,
        replacement: P,
        config: QueueConfig,
        swap: impl FnOnce() -> Option<P>,
    ) -> QueueResult<InstallOutcome> {
        if let Some(active) = self.active.as_mut() {
            if active.trampoline.window != window {
                warn!(
                    hooked = active.trampoline.window,
                    requested = window,
                    "Refusing to hook a second window"
                );
                return Err(QueueError::AlreadyInstalled {
                    window: active.trampoline.window,
                });
            }
            active.context.reconfigure(config)?;
            debug!(window, "Hook reinitialized");
            return Ok(InstallOutcome::Reinitialized);
        }

        // A routed window must always have a context behind it.
        let context = MouseQueueContext::new(config)?;
        let original = swap().ok_or(QueueError::HookInstallationFailure)?;
        self.active = Some(ActiveHook {
            trampoline: Trampoline::new(window, original, replacement),
            context,
        });
        info!(window, "Window procedure hooked");
        Ok(InstallOutcome::Installed)
    }

    pub fn trampoline(&self) -> Option<Trampoline<P>> {
        self.active.as_ref().map(|a| a.trampoline)
    }

    pub fn context(&self) -> Option<&MouseQueueContext> {
        self.active.as_ref().map(|a| &a.context)
    }

    pub fn context_mut(&mut self) -> Option<&mut MouseQueueContext> {
        self.active.as_mut().map(|a| &mut a.context)
    }

    /// Run `observe` against the context and return the forwarding target.
    ///
    /// Callers holding a lock around the slot should release it before
    /// forwarding, since the original handler may re-enter.
    pub fn observe<M>(
        &mut self,
        message: &M,
        observe: impl FnOnce(&mut MouseQueueContext, &M),
    ) -> Option<Trampoline<P>> {
        let active = self.active.as_mut()?;
        observe(&mut active.context, message);
        Some(active.trampoline)
    }
}

impl<P: Copy> Default for HookSlot<P> {
    fn default() -> Self {
        Self::new()
    }
}
