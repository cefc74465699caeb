use std::sync::Once;

use tracing_subscriber::filter::EnvFilter;

pub mod memory;

pub use memory::{ExecutedStatement, MemoryConnectionProvider, MemorySession};

/// Filter used when `RUST_LOG` is unset or unparsable: the workspace crates at
/// INFO, everything else at WARN.
pub const DEFAULT_TEST_FILTER: &str =
    "warn,cstar=info,cstar_types=info,cstar_plan=info,cstar_executor=info";

static INIT: Once = Once::new();

/// Install a test-captured fmt subscriber once per test binary.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));
        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_tracing_for_tests();
        init_tracing_for_tests();
        assert!(INIT.is_completed());
    }

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_TEST_FILTER).is_ok());
    }
}
