//! Log output for a run.
//!
//! The subscriber is built from the configured [`LogLevel`] and installed as
//! the default for the current thread only. The returned guard keeps it
//! active; the runtime is single-threaded, so that covers every task.

use std::io::IsTerminal;

use proofread_core::LogLevel;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Install a stderr subscriber filtered at `level` until the guard drops.
pub fn init(level: LogLevel) -> DefaultGuard {
    let filter = EnvFilter::new(level.directive());
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false),
    );
    tracing::subscriber::set_default(subscriber)
}
