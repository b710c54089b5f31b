//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    // Ignored: a logger installed by the host stays in charge.
    let _ = env_logger::try_init();
}

/// Initialize the logging system, falling back to `default_filter` when `RUST_LOG` is unset
pub fn init_with_filter(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init_with_filter("debug");
        init_with_filter("info");
        init();
        info!("logging initialized twice without panicking");
    }
}
