//! Test logging for every shed crate.
//!
//! The backend's unit tests install it through a `ctor` hook; integration
//! suites (backend and ws-player) call [`init`] from their own hooks.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Filter used when neither `TEST_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_TEST_FILTER: &str = "warn";

/// Picks the filter directive: `TEST_LOG`, then `RUST_LOG`, then
/// [`DEFAULT_TEST_FILTER`]. Blank values are skipped.
pub fn filter_directive<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["TEST_LOG", "RUST_LOG"]
        .into_iter()
        .filter_map(&lookup)
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_FILTER.to_string())
}

/// Installs a test-writer subscriber once per process; later calls are no-ops.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let directive = filter_directive(|key| std::env::var(key).ok());
        let filter =
            EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
