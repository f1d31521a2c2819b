//! Annual aggregation for dashboards

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError, Rate};

use crate::ledger::{BalancePolicy, LedgerFold, TermBalance};

/// Year totals derived from the term balances
///
/// `final_balance == total_fees - total_paid` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub total_fees: Money,
    /// Payments already folded into `final_balance`
    pub total_paid: Money,
    pub final_balance: Money,
    /// Share of billed fees paid, capped at 100%
    pub percent_paid: Rate,
}

impl AnnualSummary {
    /// Aggregates the billed terms of one fold
    ///
    /// `total_paid` counts term payments plus any unbilled-term payments
    /// carried into a billed term. `percent_paid` is zero when nothing has
    /// been billed.
    pub fn aggregate(term_balances: &[TermBalance], currency: Currency) -> Result<Self, MoneyError> {
        let total_fees = Money::checked_sum(term_balances.iter().map(|t| &t.term_fee), currency)?;
        let term_paid = Money::checked_sum(term_balances.iter().map(|t| &t.term_payments), currency)?;
        let carried = Money::checked_sum(term_balances.iter().map(|t| &t.unbilled_payments_in), currency)?;
        let final_balance = term_balances
            .last()
            .map(|t| t.net_balance)
            .unwrap_or_else(|| Money::zero(currency));

        Self::from_totals(total_fees, term_paid.checked_add(&carried)?, final_balance)
    }

    /// The summary a fold reports under `policy`
    pub fn for_policy(fold: &LedgerFold, policy: BalancePolicy) -> Result<Self, MoneyError> {
        match policy {
            BalancePolicy::BilledTermsOnly => Self::aggregate(&fold.term_balances, fold.currency),
            BalancePolicy::IncludeUnbilledPayments => {
                Self::from_totals(fold.total_fees()?, fold.total_received()?, fold.closing_balance)
            }
        }
    }

    fn from_totals(total_fees: Money, total_paid: Money, final_balance: Money) -> Result<Self, MoneyError> {
        let percent_paid = if total_fees.is_positive() {
            Rate::new(total_paid.ratio_of(&total_fees)?).capped_at(Rate::from_percentage(dec!(100)))
        } else {
            Rate::zero()
        };

        Ok(Self {
            total_fees,
            total_paid,
            final_balance,
            percent_paid,
        })
    }

    /// Percentage paid rounded for display
    pub fn percent_paid_display(&self) -> rust_decimal::Decimal {
        self.percent_paid.as_percentage().round_dp(2)
    }
}
