//! Boundary rows from the record store
//!
//! The record store hands back loosely typed rows: terms are strings, and
//! amounts may arrive as JSON numbers or as numeric strings. These types
//! describe that shape exactly; [`FeeStructure::from_row`] and
//! [`Payment::from_row`] coerce them into typed domain values. No other code
//! parses amounts.
//!
//! [`FeeStructure::from_row`]: crate::structure::FeeStructure::from_row
//! [`Payment::from_row`]: crate::payment::Payment::from_row

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use core_kernel::{FeeStructureId, PaymentId, StudentId};

use crate::error::ValidationError;
use crate::term::Term;

/// A numeric field as stored: either a number or a string holding one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(Decimal),
    Text(String),
}

impl FieldValue {
    /// Coerces the value to a decimal
    ///
    /// Text is trimmed and may use `,` as a thousands separator.
    pub fn to_decimal(&self, field: &'static str) -> Result<Decimal, ValidationError> {
        match self {
            FieldValue::Number(n) => Ok(*n),
            FieldValue::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                Decimal::from_str(&cleaned).map_err(|_| ValidationError::NonNumericAmount {
                    field,
                    value: s.clone(),
                })
            }
        }
    }

    /// Coerces the value to a term
    pub fn to_term(&self) -> Result<Term, ValidationError> {
        match self {
            FieldValue::Number(n) => {
                if n.fract().is_zero() {
                    n.to_i64()
                        .and_then(Term::from_number)
                        .ok_or_else(|| ValidationError::InvalidTerm(n.to_string()))
                } else {
                    Err(ValidationError::InvalidTerm(n.to_string()))
                }
            }
            FieldValue::Text(s) => s.parse(),
        }
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Term> for FieldValue {
    fn from(term: Term) -> Self {
        FieldValue::Text(term.number().to_string())
    }
}

/// A fee structure row: fees for one class in one term of one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStructureRow {
    #[serde(default)]
    pub id: Option<FeeStructureId>,
    pub class_name: String,
    pub term: FieldValue,
    pub year: i32,
    #[serde(default)]
    pub tuition_fee: Option<FieldValue>,
    #[serde(default)]
    pub boarding_fee: Option<FieldValue>,
    #[serde(default)]
    pub activity_fee: Option<FieldValue>,
    #[serde(default)]
    pub other_fees: Option<FieldValue>,
    /// Authoritative total when present
    #[serde(default)]
    pub total_fee: Option<FieldValue>,
}

/// A recorded payment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub id: PaymentId,
    #[serde(default)]
    pub student_id: Option<StudentId>,
    pub term: FieldValue,
    pub year: i32,
    pub amount_paid: FieldValue,
    /// ISO 8601 date or timestamp
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub receipt_number: Option<String>,
}

/// Parses a stored payment date
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.f]` /
/// `YYYY-MM-DD HH:MM:SS[.f]` timestamps (taken as UTC) and plain
/// `YYYY-MM-DD` dates (midnight UTC). Blank strings count as missing.
pub(crate) fn parse_payment_date(
    payment_id: PaymentId,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let raw = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(midnight.and_utc()));
    }

    Err(ValidationError::InvalidPaymentDate {
        payment_id,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use rust_decimal_macros::dec;

    #[test]
    fn test_field_value_accepts_numbers_and_numeric_strings() {
        let row: FeeStructureRow = serde_json::from_value(serde_json::json!({
            "class_name": "Form 1",
            "term": "1",
            "year": 2024,
            "tuition_fee": 9000,
            "boarding_fee": "4,500.50",
            "activity_fee": "  500 ",
            "other_fees": null
        }))
        .unwrap();

        assert_eq!(row.tuition_fee.unwrap().to_decimal("tuition_fee").unwrap(), dec!(9000));
        assert_eq!(row.boarding_fee.unwrap().to_decimal("boarding_fee").unwrap(), dec!(4500.50));
        assert_eq!(row.activity_fee.unwrap().to_decimal("activity_fee").unwrap(), dec!(500));
        assert!(row.other_fees.is_none());
        assert!(row.total_fee.is_none());
        assert_eq!(row.term.to_term().unwrap(), Term::First);
    }

    #[test]
    fn test_non_numeric_amount_is_rejected() {
        let value = FieldValue::from("fifteen thousand");
        assert!(matches!(
            value.to_decimal("amount_paid"),
            Err(ValidationError::NonNumericAmount { field: "amount_paid", .. })
        ));
    }

    #[test]
    fn test_numeric_term() {
        assert_eq!(FieldValue::Number(dec!(3)).to_term().unwrap(), Term::Third);
        assert!(FieldValue::Number(dec!(1.5)).to_term().is_err());
        assert!(FieldValue::Number(dec!(4)).to_term().is_err());
    }

    #[test]
    fn test_parse_payment_date_formats() {
        let id = PaymentId::new();

        let rfc = parse_payment_date(id, Some("2024-02-10T09:30:00+03:00")).unwrap().unwrap();
        assert_eq!(rfc.hour(), 6);

        let naive = parse_payment_date(id, Some("2024-02-10 09:30:00.123")).unwrap().unwrap();
        assert_eq!(naive.hour(), 9);

        let date_only = parse_payment_date(id, Some("2024-02-10")).unwrap().unwrap();
        assert_eq!((date_only.year(), date_only.month(), date_only.day()), (2024, 2, 10));

        assert_eq!(parse_payment_date(id, None).unwrap(), None);
        assert_eq!(parse_payment_date(id, Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_parse_payment_date_rejects_garbage() {
        let id = PaymentId::new();
        assert!(matches!(
            parse_payment_date(id, Some("10/02/2024")),
            Err(ValidationError::InvalidPaymentDate { .. })
        ));
    }
}
