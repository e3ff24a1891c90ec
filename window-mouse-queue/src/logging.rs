//! Logging setup for the extension.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a `tracing` subscriber once per process.
///
/// The host may already own a global subscriber; `try_init` leaves it alone.
pub fn init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    "window_mouse_queue=info,mouse_queue_platform=info,mouse_queue_core=info"
                        .into()
                }),
            )
            .with_target(true)
            .try_init();
    });
}
