//! Logging setup

/// Initialize the logging system
///
/// Installs `env_logger` with an `info` default filter. `RUST_LOG` overrides
/// the filter as usual. Calling this more than once is harmless; only the
/// first call installs a logger.
pub fn init() {
    init_with_filter("info");
}

/// Initialize the logging system with a custom default filter
pub fn init_with_filter(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("logger already initialized");
    }
}
