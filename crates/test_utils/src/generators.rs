//! Property-Based Test Generators
//!
//! Proptest strategies for fee rows. Generated rows are always valid, so a
//! computation over them only fails on a bug.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::StudentId;
use domain_fees::{FeeStructureRow, PaymentRow, Term};

use crate::builders::{FeeStructureRowBuilder, PaymentRowBuilder};

/// Any of the three terms
pub fn term_strategy() -> impl Strategy<Value = Term> {
    prop_oneof![Just(Term::First), Just(Term::Second), Just(Term::Third)]
}

/// A positive amount with cents, up to 500,000.00
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..50_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// An optional ISO date within the school year
pub fn payment_date_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of((1u32..=12, 1u32..=28))
        .prop_map(|d| d.map(|(month, day)| format!("2024-{:02}-{:02}", month, day)))
}

/// Fee structures for any subset of the terms, at most one per term
pub fn fee_structures_strategy() -> impl Strategy<Value = Vec<FeeStructureRow>> {
    prop::collection::vec(prop::option::of(amount_strategy()), 3).prop_map(|fees| {
        Term::ALL
            .into_iter()
            .zip(fees)
            .filter_map(|(term, fee)| fee.map(|f| FeeStructureRowBuilder::new(term).tuition(f).build()))
            .collect()
    })
}

/// Up to `max` payments by one student
pub fn payments_strategy(student_id: StudentId, max: usize) -> impl Strategy<Value = Vec<PaymentRow>> {
    prop::collection::vec((term_strategy(), amount_strategy(), payment_date_strategy()), 0..=max)
        .prop_map(move |payments| {
            payments
                .into_iter()
                .map(|(term, amount, date)| {
                    let builder = PaymentRowBuilder::new(student_id, term, amount);
                    match date {
                        Some(d) => builder.on(&d).build(),
                        None => builder.build(),
                    }
                })
                .collect()
        })
}

/// One student's complete rows
pub fn ledger_rows_strategy() -> impl Strategy<Value = (StudentId, Vec<FeeStructureRow>, Vec<PaymentRow>)> {
    let student_id = StudentId::new();
    (Just(student_id), fee_structures_strategy(), payments_strategy(student_id, 10))
}
