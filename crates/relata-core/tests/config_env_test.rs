//! Environment-driven relation configuration

use relata_core::constants::env;
use relata_core::{FactError, Relation, RelationConfig};
use relata_types::Field;
use serial_test::serial;

fn clear_env() {
    // SAFETY: every test touching these variables runs under `#[serial]`
    unsafe {
        std::env::remove_var(env::INITIAL_CAPACITY);
        std::env::remove_var(env::INDEX_CAPACITY);
        std::env::remove_var(env::SHARD_AMOUNT);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    assert_eq!(RelationConfig::from_env().unwrap(), RelationConfig::default());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    // SAFETY: serialised with the other env tests
    unsafe {
        std::env::set_var(env::INITIAL_CAPACITY, "4096");
        std::env::set_var(env::SHARD_AMOUNT, "32");
    }

    let config = RelationConfig::from_env().unwrap();
    assert_eq!(config.initial_capacity, 4096);
    assert_eq!(config.shard_amount, Some(32));

    let relation: Relation<(Field<u64>, Field<u64>)> =
        Relation::with_config(Default::default(), config).unwrap();
    relation.add((1, 2));
    assert!(relation.query(&(1, 2)));
    clear_env();
}

#[test]
#[serial]
fn test_from_env_rejects_garbage() {
    clear_env();
    // SAFETY: serialised with the other env tests
    unsafe {
        std::env::set_var(env::INDEX_CAPACITY, "lots");
    }
    let err = RelationConfig::from_env().unwrap_err();
    match err {
        FactError::Configuration { setting, .. } => {
            assert_eq!(setting.as_deref(), Some(env::INDEX_CAPACITY));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    clear_env();
    // SAFETY: serialised with the other env tests
    unsafe {
        std::env::set_var(env::SHARD_AMOUNT, "6");
    }
    assert!(RelationConfig::from_env().is_err());
    clear_env();
}
