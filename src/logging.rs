//! Logging and tracing configuration
//!
//! Structured logging through `tracing`. Search code logs with the usual
//! macros; audit events go to the `forensic_audit` target.
//!
//! # Environment Variable Control
//!
//! ```bash
//! RUST_LOG=debug ffx-correlate ...                        # All debug logs
//! RUST_LOG=ffx_correlate_lib::commonattr=trace ffx-correlate ...
//! RUST_LOG=warn,forensic_audit=info ffx-correlate ...     # Audit trail only
//! FFX_LOG_VERBOSE=1 ffx-correlate ...                     # file:line, thread ids
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Set to any value to switch to the verbose format
pub const VERBOSE_ENV: &str = "FFX_LOG_VERBOSE";

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Default: info in release, debug in debug builds
        if cfg!(debug_assertions) {
            EnvFilter::new("ffx_correlate=debug,ffx_correlate_lib=debug,forensic_audit=info")
        } else {
            EnvFilter::new("ffx_correlate=info,ffx_correlate_lib=info,forensic_audit=info")
        }
    })
}

/// Initialize the logging/tracing system. Logs go to stderr so stdout stays
/// free for the JSON report.
pub fn init() {
    if std::env::var_os(VERBOSE_ENV).is_some() {
        init_verbose();
        return;
    }

    let subscriber = tracing_subscriber::registry()
        .with(default_filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );

    // Ignore error if already set
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Initialize logging with file:line and thread ids
pub fn init_verbose() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        );

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init();
        tracing::info!(target: "forensic_audit", operation = "test", "Audit message");
    }
}
