//! Process-wide `tracing` initialization.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global `tracing` subscriber.
///
/// `BEES_LOG` takes priority over `RUST_LOG`; both fall back to
/// `default_filter` (typically [`crate::config::RuntimeConfig::log_filter`])
/// when unset or malformed.
pub fn init_logging(default_filter: &str) {
    let filter = std::env::var("BEES_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| EnvFilter::new(default_filter.to_owned()),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(default_filter.to_owned())),
        );

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging("info");
        init_logging("info");
    }
}
