//! Balance fold engine
//!
//! One pass over the ordered event stream produces every balance the
//! application shows: the per-term breakdown, the running balance after each
//! payment, and the annual final balance. Views read these outputs and never
//! recompute balances themselves.
//!
//! # Invariants
//!
//! - For every term: `net_balance == carry_forward_in + term_fee - term_payments`
//! - Each term carries in the previous term's net balance less any
//!   `unbilled_payments_in` folded between the two
//! - `final_balance` is the net balance of the last term with an accrual
//! - `final_balance == total_fees - paid(BilledTermsOnly)` and
//!   `closing_balance == total_fees - total_received`
//! - Nothing is rounded inside the fold

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use core_kernel::{Currency, Money, MoneyError, PaymentId};

use crate::event::LedgerEvent;
use crate::term::Term;

/// The balance of one billed term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermBalance {
    pub term: Term,
    /// Fee accrued for the term
    pub term_fee: Money,
    /// Payments recorded against the term
    pub term_payments: Money,
    /// Payments for unbilled terms folded after the previous billed term
    /// closed and before this term's accrual
    pub unbilled_payments_in: Money,
    /// Signed balance entering the term
    pub carry_forward_in: Money,
    /// Signed balance at the close of the term
    pub net_balance: Money,
}

/// The ledger balance immediately after one payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    pub payment_id: PaymentId,
    pub term: Term,
    pub amount: Money,
    /// Signed balance after this payment was applied
    pub running_balance: Money,
    /// True when the payment's term has no fee structure
    pub unbilled_term: bool,
}

/// Payments recorded for a term that has no fee structure
///
/// The payments are still folded into the running balance. Whether the
/// missing fee structure means "not billed yet" or "data entry gap" is for the
/// caller to decide; see [`BalancePolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteDataWarning {
    pub term: Term,
    pub payment_ids: Vec<PaymentId>,
    pub amount: Money,
}

impl fmt::Display for IncompleteDataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} payment(s) totalling {} recorded for {} which has no fee structure",
            self.payment_ids.len(),
            self.amount,
            self.term
        )
    }
}

/// Which figures to report when payments exist for unbilled terms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Balance at the close of the last billed term; payments for unbilled
    /// terms after it are left out of both the balance and the amount paid
    #[default]
    BilledTermsOnly,
    /// Balance after every recorded payment
    IncludeUnbilledPayments,
}

/// Everything the fold produces for one student and year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFold {
    pub currency: Currency,
    /// Billed terms in term order
    pub term_balances: Vec<TermBalance>,
    /// One snapshot per payment, in event order
    pub snapshots: Vec<PaymentSnapshot>,
    /// Net balance of the last billed term (zero when nothing is billed)
    pub final_balance: Money,
    /// Balance after the last event of the stream
    pub closing_balance: Money,
    pub warnings: Vec<IncompleteDataWarning>,
}

impl LedgerFold {
    /// Sum of fees over billed terms
    pub fn total_fees(&self) -> Result<Money, MoneyError> {
        Money::checked_sum(self.term_balances.iter().map(|t| &t.term_fee), self.currency)
    }

    /// Sum of payments attributed to billed terms
    pub fn total_paid(&self) -> Result<Money, MoneyError> {
        Money::checked_sum(self.term_balances.iter().map(|t| &t.term_payments), self.currency)
    }

    /// Sum of payments for unbilled terms that were folded before a later
    /// accrual, and so already sit in `final_balance`
    pub fn unbilled_carried(&self) -> Result<Money, MoneyError> {
        Money::checked_sum(self.term_balances.iter().map(|t| &t.unbilled_payments_in), self.currency)
    }

    /// Sum of every payment in the stream, billed term or not
    pub fn total_received(&self) -> Result<Money, MoneyError> {
        Money::checked_sum(self.snapshots.iter().map(|s| &s.amount), self.currency)
    }

    /// The balance to report under `policy`
    pub fn balance(&self, policy: BalancePolicy) -> Money {
        match policy {
            BalancePolicy::BilledTermsOnly => self.final_balance,
            BalancePolicy::IncludeUnbilledPayments => self.closing_balance,
        }
    }

    /// The amount paid to report under `policy`
    ///
    /// Always the payments already folded into [`balance`](Self::balance)
    /// for the same policy.
    pub fn paid(&self, policy: BalancePolicy) -> Result<Money, MoneyError> {
        match policy {
            BalancePolicy::BilledTermsOnly => self.total_paid()?.checked_add(&self.unbilled_carried()?),
            BalancePolicy::IncludeUnbilledPayments => self.total_received(),
        }
    }

    /// The balance of a billed term
    pub fn term(&self, term: Term) -> Option<&TermBalance> {
        self.term_balances.iter().find(|t| t.term == term)
    }

    /// The snapshot for a payment
    pub fn snapshot(&self, payment_id: PaymentId) -> Option<&PaymentSnapshot> {
        self.snapshots.iter().find(|s| s.payment_id == payment_id)
    }

    /// Returns true if any payment was folded against an unbilled term
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A billed term that has not been closed yet
struct OpenTerm {
    term: Term,
    fee: Money,
    payments: Money,
    unbilled_payments_in: Money,
    carry_forward_in: Money,
}

impl OpenTerm {
    fn close(self, balance: Money) -> TermBalance {
        TermBalance {
            term: self.term,
            term_fee: self.fee,
            term_payments: self.payments,
            unbilled_payments_in: self.unbilled_payments_in,
            carry_forward_in: self.carry_forward_in,
            net_balance: balance,
        }
    }
}

/// Folds ledger event streams into balances
#[derive(Debug, Clone, Copy)]
pub struct BalanceFoldEngine {
    currency: Currency,
}

impl BalanceFoldEngine {
    /// Creates an engine for a ledger currency
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    /// Folds an ordered event stream
    ///
    /// Expects the order produced by [`LedgerEventBuilder`]. A term closes at
    /// the next accrual, at the first event of another term, or at the end of
    /// the stream. A payment whose term has no open accrual is folded into the
    /// running balance, reported in `warnings`, and not attributed to any term.
    /// If a later accrual follows, that term records it as
    /// `unbilled_payments_in`.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` if an event is not in the engine's currency.
    ///
    /// [`LedgerEventBuilder`]: crate::event::LedgerEventBuilder
    pub fn fold(&self, events: &[LedgerEvent]) -> Result<LedgerFold, MoneyError> {
        let zero = Money::zero(self.currency);
        let mut balance = zero;
        let mut open: Option<OpenTerm> = None;
        let mut pending_unbilled = zero;
        let mut term_balances = Vec::new();
        let mut snapshots = Vec::new();
        let mut unbilled: BTreeMap<Term, IncompleteDataWarning> = BTreeMap::new();

        for event in events {
            match event {
                LedgerEvent::Accrual { term, amount, .. } => {
                    if let Some(previous) = open.take() {
                        term_balances.push(previous.close(balance));
                    }
                    let carry_forward_in = balance;
                    balance = balance.checked_add(amount)?;
                    open = Some(OpenTerm {
                        term: *term,
                        fee: *amount,
                        payments: zero,
                        unbilled_payments_in: pending_unbilled,
                        carry_forward_in,
                    });
                    pending_unbilled = zero;
                }
                LedgerEvent::Payment { term, amount, payment_id, .. } => {
                    let billed = matches!(&open, Some(current) if current.term == *term);
                    if !billed {
                        if let Some(previous) = open.take() {
                            term_balances.push(previous.close(balance));
                        }
                    }

                    balance = balance.checked_sub(amount)?;

                    match open.as_mut() {
                        Some(current) if billed => {
                            current.payments = current.payments.checked_add(amount)?;
                        }
                        _ => {
                            pending_unbilled = pending_unbilled.checked_add(amount)?;
                            let warning = unbilled.entry(*term).or_insert_with(|| IncompleteDataWarning {
                                term: *term,
                                payment_ids: Vec::new(),
                                amount: zero,
                            });
                            warning.payment_ids.push(*payment_id);
                            warning.amount = warning.amount.checked_add(amount)?;
                        }
                    }

                    snapshots.push(PaymentSnapshot {
                        payment_id: *payment_id,
                        term: *term,
                        amount: *amount,
                        running_balance: balance,
                        unbilled_term: !billed,
                    });
                }
            }
        }

        if let Some(last) = open.take() {
            term_balances.push(last.close(balance));
        }

        let final_balance = term_balances.last().map(|t| t.net_balance).unwrap_or(zero);

        debug!(
            terms = term_balances.len(),
            payments = snapshots.len(),
            final_balance = %final_balance,
            closing_balance = %balance,
            unbilled_terms = unbilled.len(),
            "Folded fee ledger"
        );

        Ok(LedgerFold {
            currency: self.currency,
            term_balances,
            snapshots,
            final_balance,
            closing_balance: balance,
            warnings: unbilled.into_values().collect(),
        })
    }
}
