//! Recorded payments
//!
//! Payments reach the ledger already completed. They are append-only here;
//! corrections happen in the record store and the ledger is recomputed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, PaymentId, StudentId};

use crate::error::ValidationError;
use crate::row::{parse_payment_date, PaymentRow};
use crate::term::Term;

/// A validated payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub student_id: StudentId,
    pub term: Term,
    pub year: i32,
    pub amount: Money,
    pub payment_date: Option<DateTime<Utc>>,
    pub receipt_number: Option<String>,
}

impl Payment {
    /// Coerces and validates a stored row
    ///
    /// # Errors
    ///
    /// - `MissingStudentId` if the row has no student
    /// - `InvalidTerm` if the term is not 1..=3
    /// - `NonNumericAmount` / `NonPositivePayment` for a bad amount
    /// - `InvalidPaymentDate` if a date is present but unparseable
    pub fn from_row(row: &PaymentRow, currency: Currency) -> Result<Self, ValidationError> {
        let student_id = row
            .student_id
            .ok_or(ValidationError::MissingStudentId { payment_id: row.id })?;
        let term = row.term.to_term()?;

        let amount = row.amount_paid.to_decimal("amount_paid")?;
        if amount.is_sign_negative() || amount.is_zero() {
            return Err(ValidationError::NonPositivePayment {
                payment_id: row.id,
                amount,
            });
        }

        let payment_date = parse_payment_date(row.id, row.payment_date.as_deref())?;
        let receipt_number = row
            .receipt_number
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Ok(Self {
            id: row.id,
            student_id,
            term,
            year: row.year,
            amount: Money::new(amount, currency),
            payment_date,
            receipt_number,
        })
    }
}
