//! hotel_search library: nearby-hotel search, pricing and recommendations
//!
//! The core pipeline finds hotels near a point with a spatial index, prices
//! them through a cache-aside rate store and ranks recommendations by distance,
//! rating or price. Around it sit a SQLite primary store, an in-memory rate
//! cache, a query-validating frontend and an axum HTTP server.
//!
//! # Example
//!
//! ```no_run
//! use hotel_search::{run_server, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     seed: Some("data/seed.json".into()),
//!     ..Default::default()
//! };
//!
//! let shutdown = CancellationToken::new();
//! run_server(config, shutdown).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error_handling;
pub mod frontend;
pub mod geo;
pub mod initialization;
pub mod profile;
pub mod rate;
pub mod recommendation;
pub mod reservation;
pub mod search;
pub mod server;
pub mod storage;

// Re-export public API
pub use backend::RequestContext;
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::SearchError;
pub use initialization::{init_search_stack, SearchStack};
pub use run::{open_store, run_server};

// Startup sequence shared by the binary and integration tests
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::info;
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    use crate::config::Config;
    use crate::initialization::init_search_stack;
    use crate::server::{self, AppState};
    use crate::storage::{
        init_db_pool_with_path, load_seed_file, run_migrations, seed_store, SqliteStore,
    };

    /// Opens the configured database, creates the schema and loads the seed
    /// file if one is configured.
    pub async fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .context("Failed to initialize database pool")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        if let Some(seed_path) = &config.seed {
            let seed = load_seed_file(seed_path).context("Failed to load seed file")?;
            let records = seed_store(&pool, &seed)
                .await
                .context("Failed to write seed data")?;
            info!("Loaded {} records from {}", records, seed_path.display());
        }

        Ok(Arc::new(SqliteStore::new(pool)))
    }

    /// Opens the store, wires the services and serves HTTP until `shutdown`
    /// is cancelled.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or migrated, the seed file is
    /// unreadable, or the listen address cannot be bound.
    pub async fn run_server(config: Config, shutdown: CancellationToken) -> Result<()> {
        let store = open_store(&config).await?;
        let stack = init_search_stack(store, &config);

        let listener = TcpListener::bind(config.listen)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen))?;

        server::serve(listener, AppState::new(stack.clone()), shutdown).await?;

        stack.stats.log_summary();
        Ok(())
    }
}
