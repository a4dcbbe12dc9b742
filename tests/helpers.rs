// Shared test helpers for store setup and request construction.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hotel_search::storage::{
    init_memory_pool, run_migrations, seed_store, SeedData, SqliteStore,
};
use hotel_search::Config;

/// Path of the sample seed shipped with the crate.
#[allow(dead_code)] // Used by other test files
pub fn sample_seed_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("seed.json")
}

/// Creates an in-memory store with migrations applied and `seed` loaded.
#[allow(dead_code)]
pub async fn create_test_store(seed: &SeedData) -> Arc<SqliteStore> {
    let pool = init_memory_pool()
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    seed_store(&pool, seed).await.expect("Failed to seed store");
    Arc::new(SqliteStore::new(pool))
}

/// Creates an in-memory store loaded with the shipped sample seed.
#[allow(dead_code)]
pub async fn create_sample_store() -> Arc<SqliteStore> {
    let seed = hotel_search::storage::load_seed_file(&sample_seed_path())
        .expect("Failed to load sample seed");
    create_test_store(&seed).await
}

/// The three-hotel scenario: two co-located hotels near (1, 1) and one far away.
#[allow(dead_code)]
pub fn scenario_seed() -> SeedData {
    SeedData::from_json(
        r#"{
            "geo": [
                {"hotelId": "h1", "lat": 1.0, "lon": 1.0},
                {"hotelId": "h2", "lat": 1.0, "lon": 1.0},
                {"hotelId": "h3", "lat": 50.0, "lon": 50.0}
            ],
            "rates": [
                {"hotelId": "h1", "code": "A", "roomType": {"totalRate": 100.0}},
                {"hotelId": "h2", "code": "B", "roomType": {"totalRate": 150.0}},
                {"hotelId": "h3", "code": "C", "roomType": {"totalRate": 999.0}}
            ],
            "profiles": [
                {"id": "h1", "name": "Hotel One", "address": {"lat": 1.0, "lon": 1.0}},
                {"id": "h2", "name": "Hotel Two", "address": {"lat": 1.0, "lon": 1.0}},
                {"id": "h3", "name": "Hotel Three", "address": {"lat": 50.0, "lon": 50.0}}
            ]
        }"#,
    )
    .expect("scenario seed is valid")
}

/// Config for tests: short timeout, default cache.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        request_timeout_secs: 5,
        ..Default::default()
    }
}

/// Builds a query-parameter map.
#[allow(dead_code)]
pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
