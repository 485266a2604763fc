use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,tessera=debug,tessera_batch=debug,tessera_sort=debug";

/// Install the global `tracing` subscriber.
///
/// Safe to call more than once; later calls are ignored, which keeps test
/// binaries that initialise logging in every test happy.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
