//! Core Kernel - Foundational types for the school fee ledger
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers for students, payments and fee structures
//! - Port infrastructure for swappable data sources

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use identifiers::{StudentId, PaymentId, FeeStructureId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
pub use error::CoreError;
