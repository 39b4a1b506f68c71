//! Logging setup utilities.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for the given targets.
///
/// Every target gets the same level, e.g. `sajiki_server=debug,sajiki_server_bin=debug`.
/// Hyphens are replaced because tracing targets use the crate's module path.
pub fn default_directive(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// Logging is enabled for the server library, `tower_http` request traces and
/// the binary itself. The level can be overridden with `RUST_LOG`.
///
/// # Examples
///
/// ```no_run
/// use sajiki_shared::logger::setup_logger;
///
/// setup_logger("sajiki-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        default_directive(
            &["sajiki_server", "tower_http", binary_name],
            default_log_level,
        )
        .into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Logger initialized for '{}'", binary_name);
}
