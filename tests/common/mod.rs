use std::sync::Once;

use chrono::{DateTime, Utc};

static INIT: Once = Once::new();

/// Initialize test environment with RUST_LOG=WARN
pub fn init_test_env() {
    INIT.call_once(|| {
        std::env::set_var("RUST_LOG", "warn");
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn epoch() -> DateTime<Utc> {
    "2024-01-01T00:00:00Z".parse().unwrap()
}
