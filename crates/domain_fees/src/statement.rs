//! Statements, payment history and receipts
//!
//! These are read-only views over a [`LedgerFold`]. They format signed
//! balances for people; they never compute a balance of their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use core_kernel::{Money, PaymentId, StudentId};

use crate::ledger::{LedgerFold, TermBalance};
use crate::payment::Payment;
use crate::term::Term;

/// A signed balance, made explicit for display
///
/// Credit carries the absolute value; the label says which way it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "position", content = "amount", rename_all = "snake_case")]
pub enum BalancePosition {
    /// The student owes the school
    Owing(Money),
    /// The school owes the student
    Credit(Money),
    Settled,
}

impl BalancePosition {
    /// Reads a signed ledger balance
    pub fn from_signed(balance: Money) -> Self {
        if balance.is_positive() {
            BalancePosition::Owing(balance)
        } else if balance.is_negative() {
            BalancePosition::Credit(balance.abs())
        } else {
            BalancePosition::Settled
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BalancePosition::Owing(_) => "Balance due",
            BalancePosition::Credit(_) => "Credit",
            BalancePosition::Settled => "Settled",
        }
    }

    /// The unsigned amount to print next to the label
    pub fn display_amount(&self) -> Option<Money> {
        match self {
            BalancePosition::Owing(m) | BalancePosition::Credit(m) => Some(m.round_to_currency()),
            BalancePosition::Settled => None,
        }
    }
}

impl fmt::Display for BalancePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_amount() {
            Some(amount) => write!(f, "{}: {}", self.label(), amount),
            None => f.write_str(self.label()),
        }
    }
}

/// One row of the termly status table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStatement {
    pub term: Term,
    pub term_fee: Money,
    pub term_payments: Money,
    /// Payments for unbilled terms already inside `carry_forward_in`
    pub unbilled_payments_in: Money,
    pub carry_forward_in: Money,
    pub net_balance: Money,
    pub position: BalancePosition,
}

impl From<&TermBalance> for TermStatement {
    fn from(balance: &TermBalance) -> Self {
        Self {
            term: balance.term,
            term_fee: balance.term_fee,
            term_payments: balance.term_payments,
            unbilled_payments_in: balance.unbilled_payments_in,
            carry_forward_in: balance.carry_forward_in,
            net_balance: balance.net_balance,
            position: BalancePosition::from_signed(balance.net_balance),
        }
    }
}

impl TermStatement {
    /// Statement rows for every billed term of a fold
    pub fn for_fold(fold: &LedgerFold) -> Vec<Self> {
        fold.term_balances.iter().map(TermStatement::from).collect()
    }
}

/// One row of the payment history view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub payment_id: PaymentId,
    pub receipt_number: String,
    pub payment_date: Option<DateTime<Utc>>,
    pub term: Term,
    pub amount: Money,
    pub running_balance: Money,
    pub position: BalancePosition,
    pub unbilled_term: bool,
}

impl PaymentHistoryEntry {
    /// History rows in ledger order
    ///
    /// Snapshots without a matching payment record are skipped.
    pub fn for_fold(fold: &LedgerFold, payments: &[Payment], year: i32) -> Vec<Self> {
        let by_id: HashMap<PaymentId, &Payment> = payments.iter().map(|p| (p.id, p)).collect();

        fold.snapshots
            .iter()
            .filter_map(|snapshot| {
                let payment = by_id.get(&snapshot.payment_id)?;
                Some(Self {
                    payment_id: snapshot.payment_id,
                    receipt_number: receipt_number_for(payment, year),
                    payment_date: payment.payment_date,
                    term: snapshot.term,
                    amount: snapshot.amount,
                    running_balance: snapshot.running_balance,
                    position: BalancePosition::from_signed(snapshot.running_balance),
                    unbilled_term: snapshot.unbilled_term,
                })
            })
            .collect()
    }
}

/// A receipt for one payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_number: String,
    pub payment_id: PaymentId,
    pub student_id: StudentId,
    pub class_name: String,
    pub year: i32,
    pub term: Term,
    pub amount: Money,
    pub payment_date: Option<DateTime<Utc>>,
    /// Fee of the paid term, if the term is billed
    pub term_fee: Option<Money>,
    /// Signed ledger balance right after this payment
    pub balance_after: Money,
    pub position: BalancePosition,
}

impl Receipt {
    /// Issues the receipt for `payment_id` from a fold
    ///
    /// Returns `None` if the payment is not part of the fold.
    pub fn issue(
        fold: &LedgerFold,
        payments: &[Payment],
        class_name: &str,
        year: i32,
        payment_id: PaymentId,
    ) -> Option<Self> {
        let snapshot = fold.snapshot(payment_id)?;
        let payment = payments.iter().find(|p| p.id == payment_id)?;

        Some(Self {
            receipt_number: receipt_number_for(payment, year),
            payment_id,
            student_id: payment.student_id,
            class_name: class_name.to_string(),
            year,
            term: snapshot.term,
            amount: snapshot.amount,
            payment_date: payment.payment_date,
            term_fee: fold.term(snapshot.term).map(|t| t.term_fee),
            balance_after: snapshot.running_balance,
            position: BalancePosition::from_signed(snapshot.running_balance),
        })
    }
}

/// The payment's own receipt number, or one derived from its id
fn receipt_number_for(payment: &Payment, year: i32) -> String {
    match &payment.receipt_number {
        Some(number) => number.clone(),
        None => {
            let short = payment.id.as_uuid().simple().to_string();
            format!(
                "RCT-{}-T{}-{}",
                year,
                payment.term.number(),
                short[..8].to_uppercase()
            )
        }
    }
}
