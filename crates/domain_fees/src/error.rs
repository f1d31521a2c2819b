//! Fee domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{MoneyError, PaymentId, PortError};

use crate::term::Term;

/// Malformed input rows
///
/// A validation error stops the computation for one student and year; the
/// fold is never attempted on partially valid input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An amount field holds something that is not a number
    #[error("Non-numeric value for {field}: {value:?}")]
    NonNumericAmount {
        field: &'static str,
        value: String,
    },

    /// Term outside 1..=3
    #[error("Invalid term: {0:?} (expected 1, 2 or 3)")]
    InvalidTerm(String),

    /// Payment row without a student
    #[error("Payment {payment_id} has no student id")]
    MissingStudentId { payment_id: PaymentId },

    /// No class was given for the computation
    #[error("Class name is required")]
    MissingClassName,

    /// Payments are completed ledger entries and must be positive
    #[error("Payment {payment_id} has non-positive amount {amount}")]
    NonPositivePayment {
        payment_id: PaymentId,
        amount: Decimal,
    },

    /// Fee components and totals cannot be negative
    #[error("Negative {field} ({amount}) in fee structure for {class_name} {term}")]
    NegativeFee {
        class_name: String,
        term: Term,
        field: &'static str,
        amount: Decimal,
    },

    /// Payment date present but not ISO 8601
    #[error("Payment {payment_id} has unparseable date {value:?}")]
    InvalidPaymentDate {
        payment_id: PaymentId,
        value: String,
    },

    /// Two fee structures configured for the same class, term and year
    #[error("Duplicate fee structure for {class_name} {term} {year}")]
    DuplicateFeeStructure {
        class_name: String,
        term: Term,
        year: i32,
    },
}

/// Errors that can occur in the fee domain
#[derive(Debug, Error)]
pub enum FeeError {
    /// Input rows failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A data source failed
    #[error("Data source error: {0}")]
    Port(#[from] PortError),

    /// The requested payment is not in the student's ledger for the year
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Calculation error
    #[error("Calculation error: {0}")]
    Calculation(String),
}

impl From<MoneyError> for FeeError {
    fn from(err: MoneyError) -> Self {
        FeeError::Calculation(err.to_string())
    }
}

impl FeeError {
    /// Returns true if the error was caused by the input data rather than the system
    pub fn is_data_error(&self) -> bool {
        matches!(self, FeeError::Validation(_) | FeeError::PaymentNotFound(_))
    }
}
