//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the fee ledger. The crate reads fee structures,
//! payments and class rosters with SQLx and exposes them through the
//! `domain_fees` ports.
//!
//! # Architecture
//!
//! - [`repositories`] holds the SQL and the database row types
//! - [`adapters`] implements the domain ports on top of the repositories
//!
//! Amounts are stored as `NUMERIC` and terms as the text the school entered;
//! converting them to domain values is the domain's job, not the database's.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresFeeAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/school_fees")).await?;
//! let adapter = PostgresFeeAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PostgresFeeAdapter;
pub use error::DatabaseError;
pub use pool::{create_pool, DatabaseConfig, DatabasePool};
pub use repositories::FeeRepository;
