//! Domain Adapters
//!
//! Implementations of the `domain_fees` ports backed by PostgreSQL.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresFeeAdapter;
//! use std::sync::Arc;
//!
//! let adapter = Arc::new(PostgresFeeAdapter::new(pool));
//! let service = FeeAccountService::new(adapter.clone(), adapter.clone(), adapter, Currency::KES);
//! ```

pub mod fees;

pub use fees::PostgresFeeAdapter;
