//! # verdant-db
//!
//! PostgreSQL database layer for verdant.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for species, identifications, plants, journal
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdant_db::Database;
//! use verdant_core::SpeciesRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/verdant").await?;
//!     let pothos = db.species.find_by_scientific_name("Epipremnum aureum").await?;
//!     println!("{:?}", pothos);
//!     Ok(())
//! }
//! ```

pub mod identifications;
pub mod journal;
pub mod plants;
pub mod pool;
pub mod species;

// Re-export core types
pub use verdant_core::*;

// Re-export repository implementations
pub use identifications::PgIdentificationRepository;
pub use journal::{clamp_page_size, PgJournalRepository, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
pub use plants::PgPlantRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use species::PgSpeciesRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Species repository keyed by scientific name.
    pub species: PgSpeciesRepository,
    /// Identification audit repository.
    pub identifications: PgIdentificationRepository,
    /// Owned-plant repository.
    pub plants: PgPlantRepository,
    /// Journal entry repository.
    pub journal: PgJournalRepository,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            species: PgSpeciesRepository::new(pool.clone()),
            identifications: PgIdentificationRepository::new(pool.clone()),
            plants: PgPlantRepository::new(pool.clone()),
            journal: PgJournalRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations (feature `migrations`).
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}
