//! Repositories
//!
//! Repositories own the SQL. They return database records and leave every
//! fee rule to `domain_fees`.

pub mod fees;

pub use fees::{FeeRepository, FeeStructureRecord, PaymentRecord, StudentRecordRow};
