//! Fee structures
//!
//! A fee structure is what one class is billed for one term of one year.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, FeeStructureId, Money, MoneyError};

use crate::error::ValidationError;
use crate::row::{FeeStructureRow, FieldValue};
use crate::term::Term;

/// The individual charges that make up a term fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeComponents {
    pub tuition: Money,
    pub boarding: Money,
    pub activity: Money,
    pub other: Money,
}

impl FeeComponents {
    /// Sum of all components
    pub fn total(&self) -> Result<Money, MoneyError> {
        Money::checked_sum(
            &[self.tuition, self.boarding, self.activity, self.other],
            self.tuition.currency(),
        )
    }
}

/// A validated fee structure for (class, term, year)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStructure {
    pub id: Option<FeeStructureId>,
    pub class_name: String,
    pub term: Term,
    pub year: i32,
    pub components: FeeComponents,
    /// Total as configured; overrides the component sum when present
    pub declared_total: Option<Money>,
}

impl FeeStructure {
    /// Coerces and validates a stored row
    ///
    /// Missing components count as zero. Negative components or totals are
    /// rejected.
    ///
    /// # Errors
    ///
    /// - `InvalidTerm` if the term is not 1..=3
    /// - `NonNumericAmount` if an amount cannot be parsed
    /// - `NegativeFee` if any amount is below zero
    pub fn from_row(row: &FeeStructureRow, currency: Currency) -> Result<Self, ValidationError> {
        let term = row.term.to_term()?;
        let class_name = row.class_name.trim().to_string();

        let amount = |value: &Option<FieldValue>, field: &'static str| -> Result<Money, ValidationError> {
            let decimal = match value {
                Some(v) => v.to_decimal(field)?,
                None => Decimal::ZERO,
            };
            if decimal.is_sign_negative() && !decimal.is_zero() {
                return Err(ValidationError::NegativeFee {
                    class_name: class_name.clone(),
                    term,
                    field,
                    amount: decimal,
                });
            }
            Ok(Money::new(decimal, currency))
        };

        let components = FeeComponents {
            tuition: amount(&row.tuition_fee, "tuition_fee")?,
            boarding: amount(&row.boarding_fee, "boarding_fee")?,
            activity: amount(&row.activity_fee, "activity_fee")?,
            other: amount(&row.other_fees, "other_fees")?,
        };
        let declared_total = match &row.total_fee {
            Some(_) => Some(amount(&row.total_fee, "total_fee")?),
            None => None,
        };

        Ok(Self {
            id: row.id,
            class_name,
            term,
            year: row.year,
            components,
            declared_total,
        })
    }

    /// The amount that accrues for this term
    pub fn total_fee(&self) -> Result<Money, MoneyError> {
        match self.declared_total {
            Some(total) => Ok(total),
            None => self.components.total(),
        }
    }

    /// Returns true if this structure applies to the given class and year
    pub fn applies_to(&self, class_name: &str, year: i32) -> bool {
        self.year == year && self.class_name == class_name.trim()
    }
}
