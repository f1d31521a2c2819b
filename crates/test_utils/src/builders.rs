//! Test Data Builders
//!
//! Builders for store rows. Tests set only the fields they care about; the
//! rest default to a valid row for [`CLASS_NAME`] in [`YEAR`].

use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;

use core_kernel::{FeeStructureId, PaymentId, StudentId};
use domain_fees::{FeeStructureRow, FieldValue, PaymentRow, StudentRecord, Term};

use crate::fixtures::{CLASS_NAME, YEAR};

/// Builder for fee structure rows
#[derive(Debug, Clone)]
pub struct FeeStructureRowBuilder {
    row: FeeStructureRow,
}

impl FeeStructureRowBuilder {
    /// A row for `term` with no fee components set
    pub fn new(term: Term) -> Self {
        Self {
            row: FeeStructureRow {
                id: Some(FeeStructureId::new()),
                class_name: CLASS_NAME.to_string(),
                term: FieldValue::from(term),
                year: YEAR,
                tuition_fee: None,
                boarding_fee: None,
                activity_fee: None,
                other_fees: None,
                total_fee: None,
            },
        }
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.row.class_name = class_name.into();
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.row.year = year;
        self
    }

    /// Stores the term as free text, e.g. "Term 2"
    pub fn term_text(mut self, term: &str) -> Self {
        self.row.term = FieldValue::from(term);
        self
    }

    pub fn tuition(mut self, amount: Decimal) -> Self {
        self.row.tuition_fee = Some(FieldValue::Number(amount));
        self
    }

    pub fn boarding(mut self, amount: Decimal) -> Self {
        self.row.boarding_fee = Some(FieldValue::Number(amount));
        self
    }

    pub fn activity(mut self, amount: Decimal) -> Self {
        self.row.activity_fee = Some(FieldValue::Number(amount));
        self
    }

    pub fn other(mut self, amount: Decimal) -> Self {
        self.row.other_fees = Some(FieldValue::Number(amount));
        self
    }

    /// Sets the authoritative total
    pub fn total(mut self, amount: Decimal) -> Self {
        self.row.total_fee = Some(FieldValue::Number(amount));
        self
    }

    /// Sets the tuition component as raw text
    pub fn tuition_text(mut self, amount: &str) -> Self {
        self.row.tuition_fee = Some(FieldValue::from(amount));
        self
    }

    pub fn build(self) -> FeeStructureRow {
        self.row
    }
}

/// Builder for payment rows
#[derive(Debug, Clone)]
pub struct PaymentRowBuilder {
    row: PaymentRow,
}

impl PaymentRowBuilder {
    /// An undated payment by `student_id` against `term`
    pub fn new(student_id: StudentId, term: Term, amount: Decimal) -> Self {
        Self {
            row: PaymentRow {
                id: PaymentId::new(),
                student_id: Some(student_id),
                term: FieldValue::from(term),
                year: YEAR,
                amount_paid: FieldValue::Number(amount),
                payment_date: None,
                receipt_number: None,
            },
        }
    }

    pub fn id(mut self, id: PaymentId) -> Self {
        self.row.id = id;
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.row.year = year;
        self
    }

    /// Sets the payment date (any format the ledger accepts)
    pub fn on(mut self, date: &str) -> Self {
        self.row.payment_date = Some(date.to_string());
        self
    }

    pub fn receipt(mut self, number: &str) -> Self {
        self.row.receipt_number = Some(number.to_string());
        self
    }

    /// Sets the amount as raw text
    pub fn amount_text(mut self, amount: &str) -> Self {
        self.row.amount_paid = FieldValue::from(amount);
        self
    }

    pub fn without_student(mut self) -> Self {
        self.row.student_id = None;
        self
    }

    pub fn build(self) -> PaymentRow {
        self.row
    }
}

/// A roster entry with a generated name
pub fn student_record(class_name: &str) -> StudentRecord {
    let id = StudentId::new();
    let short = id.as_uuid().simple().to_string();
    StudentRecord {
        id,
        admission_number: format!("ADM-{}", short[..6].to_uppercase()),
        full_name: Name().fake(),
        class_name: class_name.to_string(),
    }
}
