//! Test Utilities Crate
//!
//! Shared test infrastructure for the fee ledger crates.
//!
//! # Modules
//!
//! - `fixtures`: The reference fee scenarios and common values
//! - `builders`: Builders for fee structure and payment rows
//! - `assertions`: Ledger invariant checks with readable failure messages
//! - `generators`: Proptest strategies for rows and ledgers
//! - `memory`: An in-memory store implementing the fee ports

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod memory;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use memory::InMemoryFeeStore;
