//! Fee Domain - Term-Based Fee Ledger
//!
//! This crate turns a school's fee structure catalog and a student's recorded
//! payments into balances. Every balance shown anywhere (termly status table,
//! annual dashboard, payment history, receipt) comes out of one ledger fold.
//!
//! # Pipeline
//!
//! ```text
//! FeeStructureRow[] ─┐
//!                    ├─ row coercion ─ LedgerEventBuilder ─ BalanceFoldEngine ─ LedgerFold
//! PaymentRow[]     ──┘                                                            │
//!                                     FeeStatus / AnnualSummary / statements ◄────┘
//! ```
//!
//! # Sign convention
//!
//! A positive balance is money the student owes the school. A negative
//! balance is a credit the school holds for the student. Zero is settled.
//! Display code converts a signed balance with [`BalancePosition`] and never
//! flips the sign itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_fees::{AnnualSummary, BalanceFoldEngine, BalancePolicy, FeeStatus, LedgerEventBuilder};
//!
//! let events = LedgerEventBuilder::new("Form 2", 2024, Currency::KES)
//!     .build(&fee_structures, &payments)?;
//! let fold = BalanceFoldEngine::new(Currency::KES).fold(&events)?;
//! let summary = AnnualSummary::for_policy(&fold, BalancePolicy::BilledTermsOnly)?;
//! let status = FeeStatus::classify(&summary.final_balance, &summary.total_paid);
//! ```

pub mod term;
pub mod row;
pub mod structure;
pub mod payment;
pub mod event;
pub mod ledger;
pub mod status;
pub mod summary;
pub mod statement;
pub mod ports;
pub mod service;
pub mod error;

pub use term::Term;
pub use row::{FieldValue, FeeStructureRow, PaymentRow};
pub use structure::{FeeStructure, FeeComponents};
pub use payment::Payment;
pub use event::{LedgerEvent, LedgerEventBuilder};
pub use ledger::{
    BalanceFoldEngine, BalancePolicy, LedgerFold, TermBalance, PaymentSnapshot,
    IncompleteDataWarning,
};
pub use status::FeeStatus;
pub use summary::AnnualSummary;
pub use statement::{BalancePosition, TermStatement, PaymentHistoryEntry, Receipt};
pub use ports::{FeeStructureCatalog, PaymentLedgerSource, StudentRoster, StudentRecord};
pub use service::{FeeAccountService, StudentFeeAccount, DashboardRow};
pub use error::{FeeError, ValidationError};
