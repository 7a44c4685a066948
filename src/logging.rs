use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "aquamark=info";

/// Installs the fmt subscriber. `RUST_LOG` overrides the default filter;
/// repeated calls are ignored.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
