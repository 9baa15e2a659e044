use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::Silmaril;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Builds the reference hierarchy used across tests:
///
/// ```text
/// LEVEL 0: [1]
/// LEVEL 1: [2, 3, 4, 21, 22, 23, 24, 111]
/// LEVEL 2: [5, 6, 7, 8, 9, 10, 11, 12, 13]
/// ```
///
/// `5..=7` hang below `2`, `8..=10` below `3` and `11..=13` below `4`.
pub fn reference_silmaril() -> Silmaril<i32> {
    let mut silmaril = Silmaril::new();
    silmaril.add_nodes([1, 2, 3, 4], None);
    silmaril.add_nodes([5, 6, 7], Some((1, 0)));
    silmaril.add_nodes([8, 9, 10], Some((1, 1)));
    silmaril.add_nodes([11, 12, 13], Some((1, 2)));
    silmaril.add_nodes([21, 22, 23, 24], None);
    silmaril.add_node(111, Some((0, 0)));
    silmaril
}
