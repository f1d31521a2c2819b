//! Student fee status

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::Money;

/// Coarse standing of a student's fee account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    /// Nothing owed, nothing in credit
    Cleared,
    /// The school holds an overpayment
    Credit,
    /// Something owed, something paid
    Partial,
    /// Something owed, nothing paid
    Defaulter,
}

impl FeeStatus {
    /// Classifies a signed final balance
    ///
    /// Total over every input: a negative balance is always `Credit`, zero is
    /// always `Cleared`, and a positive balance splits on whether anything
    /// was paid.
    pub fn classify(final_balance: &Money, total_paid: &Money) -> Self {
        if final_balance.is_negative() {
            FeeStatus::Credit
        } else if final_balance.is_zero() {
            FeeStatus::Cleared
        } else if total_paid.is_positive() {
            FeeStatus::Partial
        } else {
            FeeStatus::Defaulter
        }
    }

    /// Badge text for dashboards
    pub fn label(&self) -> &'static str {
        match self {
            FeeStatus::Cleared => "Cleared",
            FeeStatus::Credit => "In credit",
            FeeStatus::Partial => "Partially paid",
            FeeStatus::Defaulter => "Defaulter",
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn kes(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::KES)
    }

    #[test]
    fn test_classification_table() {
        assert_eq!(FeeStatus::classify(&kes(dec!(-1)), &kes(dec!(0))), FeeStatus::Credit);
        assert_eq!(FeeStatus::classify(&kes(dec!(0)), &kes(dec!(0))), FeeStatus::Cleared);
        assert_eq!(FeeStatus::classify(&kes(dec!(0)), &kes(dec!(500))), FeeStatus::Cleared);
        assert_eq!(FeeStatus::classify(&kes(dec!(100)), &kes(dec!(1))), FeeStatus::Partial);
        assert_eq!(FeeStatus::classify(&kes(dec!(100)), &kes(dec!(0))), FeeStatus::Defaulter);
    }

    proptest! {
        #[test]
        fn classification_follows_the_sign_of_the_balance(
            balance in -10_000_000i64..10_000_000i64,
            paid in 0i64..10_000_000i64
        ) {
            let balance = Money::from_minor(balance, Currency::KES);
            let paid = Money::from_minor(paid, Currency::KES);
            let status = FeeStatus::classify(&balance, &paid);

            prop_assert_eq!(status == FeeStatus::Credit, balance.is_negative());
            prop_assert_eq!(status == FeeStatus::Cleared, balance.is_zero());
            prop_assert_eq!(
                matches!(status, FeeStatus::Partial | FeeStatus::Defaulter),
                balance.is_positive()
            );
        }
    }
}
