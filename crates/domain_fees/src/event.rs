//! Ledger events
//!
//! The builder turns a class's fee structures and a student's payments into
//! one ordered stream. The order is what lets a single fold answer both
//! "what was owed at the end of term 2" and "what was owed right after this
//! payment":
//!
//! 1. terms ascending
//! 2. within a term, the accrual before any payment
//! 3. payments by date ascending, undated payments last, input order
//!    breaking ties

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use core_kernel::{Currency, Money, PaymentId};

use crate::error::{FeeError, ValidationError};
use crate::payment::Payment;
use crate::row::{FeeStructureRow, PaymentRow};
use crate::structure::FeeStructure;
use crate::term::Term;

/// A single entry in the student's ledger stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A term's fee becoming due
    Accrual {
        term: Term,
        year: i32,
        amount: Money,
    },
    /// A recorded payment
    Payment {
        term: Term,
        year: i32,
        amount: Money,
        date: Option<DateTime<Utc>>,
        payment_id: PaymentId,
    },
}

impl LedgerEvent {
    /// The term the event belongs to
    pub fn term(&self) -> Term {
        match self {
            LedgerEvent::Accrual { term, .. } | LedgerEvent::Payment { term, .. } => *term,
        }
    }

    /// The (always non-negative) amount carried by the event
    pub fn amount(&self) -> Money {
        match self {
            LedgerEvent::Accrual { amount, .. } | LedgerEvent::Payment { amount, .. } => *amount,
        }
    }

    /// Returns true for accrual events
    pub fn is_accrual(&self) -> bool {
        matches!(self, LedgerEvent::Accrual { .. })
    }
}

/// Builds the ordered event stream for one student in one class and year
#[derive(Debug, Clone)]
pub struct LedgerEventBuilder {
    class_name: String,
    year: i32,
    currency: Currency,
}

impl LedgerEventBuilder {
    /// Creates a builder for a class and academic year
    pub fn new(class_name: impl Into<String>, year: i32, currency: Currency) -> Self {
        Self {
            class_name: class_name.into().trim().to_string(),
            year,
            currency,
        }
    }

    /// The class the builder filters fee structures by
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The academic year the builder filters by
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Coerces raw store rows and builds the stream
    ///
    /// Every row for this class and year is validated before anything is
    /// built, so a single bad row fails the whole computation for this
    /// student.
    pub fn build_from_rows(
        &self,
        fee_structures: &[FeeStructureRow],
        payments: &[PaymentRow],
    ) -> Result<Vec<LedgerEvent>, FeeError> {
        let (structures, payments) = self.coerce(fee_structures, payments)?;
        self.build(&structures, &payments)
    }

    /// Coerces raw store rows into validated domain values
    ///
    /// Rows for another class or year are dropped unread; only the rows that
    /// feed this ledger can fail it.
    pub fn coerce(
        &self,
        fee_structures: &[FeeStructureRow],
        payments: &[PaymentRow],
    ) -> Result<(Vec<FeeStructure>, Vec<Payment>), ValidationError> {
        if self.class_name.is_empty() {
            return Err(ValidationError::MissingClassName);
        }

        let structures = fee_structures
            .iter()
            .filter(|row| row.year == self.year && row.class_name.trim() == self.class_name)
            .map(|row| FeeStructure::from_row(row, self.currency))
            .collect::<Result<Vec<_>, _>>()?;
        let payments = payments
            .iter()
            .filter(|row| row.year == self.year)
            .map(|row| Payment::from_row(row, self.currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((structures, payments))
    }

    /// Builds the ordered event stream from validated values
    ///
    /// Fee structures for other classes or years, and payments for other
    /// years, are ignored. A term with no fee structure produces no accrual.
    ///
    /// # Errors
    ///
    /// - `DuplicateFeeStructure` if a term of this class and year is configured twice
    pub fn build(
        &self,
        fee_structures: &[FeeStructure],
        payments: &[Payment],
    ) -> Result<Vec<LedgerEvent>, FeeError> {
        let mut accruals: BTreeMap<Term, Money> = BTreeMap::new();
        for structure in fee_structures
            .iter()
            .filter(|s| s.applies_to(&self.class_name, self.year))
        {
            if accruals.contains_key(&structure.term) {
                return Err(ValidationError::DuplicateFeeStructure {
                    class_name: self.class_name.clone(),
                    term: structure.term,
                    year: self.year,
                }
                .into());
            }
            accruals.insert(structure.term, structure.total_fee()?);
        }

        let mut in_year: Vec<&Payment> = payments.iter().filter(|p| p.year == self.year).collect();
        // Stable: equal keys keep input order.
        in_year.sort_by_key(|p| (p.term, p.payment_date.is_none(), p.payment_date));

        let mut events = Vec::with_capacity(accruals.len() + in_year.len());
        let mut pending = in_year.into_iter().peekable();
        for term in Term::ALL {
            if let Some(amount) = accruals.get(&term) {
                events.push(LedgerEvent::Accrual {
                    term,
                    year: self.year,
                    amount: *amount,
                });
            }
            while let Some(payment) = pending.next_if(|p| p.term == term) {
                events.push(LedgerEvent::Payment {
                    term,
                    year: self.year,
                    amount: payment.amount,
                    date: payment.payment_date,
                    payment_id: payment.id,
                });
            }
        }

        debug!(
            class_name = %self.class_name,
            year = self.year,
            accruals = accruals.len(),
            events = events.len(),
            skipped_payments = payments.len() + accruals.len() - events.len(),
            "Built ledger event stream"
        );

        Ok(events)
    }
}
