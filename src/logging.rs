//! Logging and tracing infrastructure for glaurung-nav.
//!
//! The frame logs view switches, cache hits and rejected navigations
//! through `tracing`. Hosts with their own subscriber need nothing from
//! this module; the initialisers here are for tools and tests that run the
//! controller standalone.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the standalone subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event, with the enclosing `switch_to` span.
    Json,
}

/// Install a subscriber writing navigation events to stderr.
///
/// `RUST_LOG` wins over `default_filter`; `glaurung_nav=debug` shows every
/// cache hit and miss. Only the first call in a process installs anything,
/// and an already-installed global subscriber is left in place.
pub fn init_tracing_with(format: LogFormat, default_filter: &str) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let registry = tracing_subscriber::registry().with(env_filter);
        let installed = match format {
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_target(true),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_target(true)
                        .with_current_span(true),
                )
                .try_init(),
        };
        if installed.is_ok() {
            info!(?format, "glaurung-nav tracing initialized");
        }
    });
}

/// Human-readable navigation log at `info`.
pub fn init_tracing() {
    init_tracing_with(LogFormat::Pretty, DEFAULT_FILTER);
}

/// JSON navigation log at `info`.
pub fn init_tracing_json() {
    init_tracing_with(LogFormat::Json, DEFAULT_FILTER);
}

/// Span wrapping one view switch or history replay
#[macro_export]
macro_rules! span_trace {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Log a failed navigation step at `warn` and hand the error back
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let e = $err;
        tracing::warn!(error = %e, "navigation step failed");
        e
    }};
    ($err:expr, $step:expr) => {{
        let e = $err;
        tracing::warn!(error = %e, step = $step, "navigation step failed");
        e
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NavError;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        init_tracing_json();
        init_tracing_with(LogFormat::Json, "glaurung_nav=trace");
    }

    #[test]
    fn test_span_and_error_macros() {
        init_tracing();
        let span = span_trace!("switch_to", view_type = "graph", offset = 0x2000u64);
        let _guard = span.enter();
        let err = log_error!(NavError::EmptyHistory, "back");
        assert!(err.is_no_op());

        let err = log_error!(NavError::NavigationRejected {
            view_type: "hex".into(),
            offset: 0x10,
        });
        assert!(!err.is_no_op());
    }
}
