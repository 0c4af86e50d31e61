#![allow(dead_code)]

use relata_core::Relation;
use relata_types::Field;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per binary; `RUST_LOG` controls verbosity
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub type Friends = (Field<String>, Field<String>);

pub fn friends() -> Relation<Friends> {
    Relation::new((Field::named("person"), Field::named("friend")))
}

pub fn pair(left: &str, right: &str) -> (String, String) {
    (left.to_string(), right.to_string())
}
