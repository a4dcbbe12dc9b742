// storage/mod.rs
// Primary store: SQLite pool, schema, readers and seed loading

pub mod insert;
pub mod migrations;
pub mod pool;
pub mod seed;
pub mod store;

// Re-export commonly used items
pub use insert::{
    insert_geo_point, insert_hotel_meta, insert_profile, insert_rate_plan, insert_reservation,
    insert_room_capacity,
};
pub use migrations::run_migrations;
pub use pool::{init_db_pool_with_path, init_memory_pool};
pub use seed::{load_seed_file, seed_store, SeedData};
pub use store::SqliteStore;
