//! Process-wide log output for the writer's `tracing` events.
//!
//! Only compiled with the `logging` feature. Hosts that already install a
//! subscriber can skip this module entirely; the writer only emits events.

use std::sync::Once;

use tracing_log::log::LevelFilter as LogLevelFilter;
use tracing_subscriber::EnvFilter;

/// Default directive when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Install a compact `fmt` subscriber filtered by `RUST_LOG`, and bridge `log` records into it.
///
/// Safe to call many times and from many threads; only the first call does anything,
/// and it backs off when a global subscriber is already set.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_log::LogTracer::builder()
            .with_max_level(LogLevelFilter::Trace)
            .init();

        if tracing::dispatcher::has_been_set() {
            return;
        }

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        if let Err(error) = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .try_init()
        {
            tracing::debug!("tracing subscriber already initialized: {error:?}");
        }
    });
}
