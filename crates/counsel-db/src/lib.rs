//! # counsel-db
//!
//! Storage layer implementing the counsel-core repository traits.
//!
//! Two backends are provided:
//!
//! - PostgreSQL via SQLx: pool management, migrations, row models and
//!   entity mappers, and the `Pg*` repositories
//! - [`memory::MemoryStore`]: a process-local store with the same
//!   atomicity guarantees, used by tests and `STORAGE_BACKEND=memory`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use counsel_db::{create_pool, run_migrations, PgConsultationRepository, PoolConfig};
//!
//! async fn example(config: &counsel_common::DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::from(config)).await?;
//!     run_migrations(&pool).await?;
//!     let consultations = PgConsultationRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgConsultationRepository, PgMessageRepository, PgParticipantRepository, PgReadiness,
};
