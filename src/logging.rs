//! Logging setup.
//!
//! Logs go to stdout through a `tracing_subscriber` fmt layer. The default
//! filter is `info`; set `DEBUG_LOGGING=1` for debug output from this crate.
//! `RUST_LOG` takes precedence over both.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Filter directive used when `RUST_LOG` is not set
pub fn default_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,pitchside=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug_logging)));

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    // A subscriber installed by an embedding host wins
    if tracing_subscriber::registry()
        .with(stdout_layer)
        .with(filter)
        .try_init()
        .is_err()
    {
        return;
    }

    tracing::info!(debug_logging, "pitchside logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "info");
        assert_eq!(default_directive(true), "info,pitchside=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init();
    }
}
