//! Pre-built Test Fixtures
//!
//! The four reference fee scenarios plus a few common values. Every
//! scenario is one student in [`CLASS_NAME`] for [`YEAR`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, StudentId};
use domain_fees::{
    BalancePolicy, FeeError, FeeStatus, FeeStructureRow, PaymentRow, StudentFeeAccount, Term,
};

use crate::builders::{FeeStructureRowBuilder, PaymentRowBuilder};

pub const CLASS_NAME: &str = "Form 2";
pub const YEAR: i32 = 2024;

/// Shillings
pub fn kes(amount: Decimal) -> Money {
    Money::new(amount, Currency::KES)
}

/// A fee structure whose whole fee is tuition
pub fn fee(term: Term, amount: Decimal) -> FeeStructureRow {
    FeeStructureRowBuilder::new(term).tuition(amount).build()
}

/// A dated payment
pub fn paid(student_id: StudentId, term: Term, amount: Decimal, date: &str) -> PaymentRow {
    PaymentRowBuilder::new(student_id, term, amount).on(date).build()
}

/// One student's rows and the outcome they should produce
#[derive(Debug, Clone)]
pub struct FeeScenario {
    pub name: &'static str,
    pub student_id: StudentId,
    pub fee_structures: Vec<FeeStructureRow>,
    pub payments: Vec<PaymentRow>,
    /// Status under the default policy
    pub expected_status: FeeStatus,
    /// Final balance under the default policy
    pub expected_balance: Decimal,
}

impl FeeScenario {
    /// Every term settled, term 2 short and made up in term 3
    pub fn simple_settle() -> Self {
        let student_id = StudentId::new();
        Self {
            name: "simple settle",
            student_id,
            fee_structures: vec![
                fee(Term::First, dec!(15000)),
                fee(Term::Second, dec!(15000)),
                fee(Term::Third, dec!(15000)),
            ],
            payments: vec![
                paid(student_id, Term::First, dec!(15000), "2024-01-08"),
                paid(student_id, Term::Second, dec!(10000), "2024-05-06"),
                paid(student_id, Term::Third, dec!(20000), "2024-09-02"),
            ],
            expected_status: FeeStatus::Cleared,
            expected_balance: dec!(0),
        }
    }

    /// Term 1 overpaid; the credit reduces term 2
    pub fn credit_carry_forward() -> Self {
        let student_id = StudentId::new();
        Self {
            name: "credit carry-forward",
            student_id,
            fee_structures: vec![fee(Term::First, dec!(10000)), fee(Term::Second, dec!(10000))],
            payments: vec![paid(student_id, Term::First, dec!(12000), "2024-01-15")],
            expected_status: FeeStatus::Partial,
            expected_balance: dec!(8000),
        }
    }

    /// A term 2 payment with no term 2 fee structure
    pub fn missing_fee_structure() -> Self {
        let student_id = StudentId::new();
        Self {
            name: "missing fee structure",
            student_id,
            fee_structures: vec![fee(Term::First, dec!(10000))],
            payments: vec![
                paid(student_id, Term::First, dec!(10000), "2024-01-10"),
                paid(student_id, Term::Second, dec!(5000), "2024-05-03"),
            ],
            expected_status: FeeStatus::Cleared,
            expected_balance: dec!(0),
        }
    }

    /// Billed, nothing paid
    pub fn defaulter() -> Self {
        Self {
            name: "defaulter",
            student_id: StudentId::new(),
            fee_structures: vec![fee(Term::First, dec!(12000))],
            payments: vec![],
            expected_status: FeeStatus::Defaulter,
            expected_balance: dec!(12000),
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::simple_settle(),
            Self::credit_carry_forward(),
            Self::missing_fee_structure(),
            Self::defaulter(),
        ]
    }

    /// Computes the scenario's account in KES
    pub fn account(&self, policy: BalancePolicy) -> Result<StudentFeeAccount, FeeError> {
        StudentFeeAccount::compute(
            self.student_id,
            CLASS_NAME,
            YEAR,
            Currency::KES,
            policy,
            &self.fee_structures,
            &self.payments,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenarios_produce_expected_outcomes() {
        for scenario in FeeScenario::all() {
            let account = scenario.account(BalancePolicy::default()).unwrap();
            assert_eq!(account.status, scenario.expected_status, "{}", scenario.name);
            assert_eq!(account.balance(), kes(scenario.expected_balance), "{}", scenario.name);
        }
    }

    #[test]
    fn test_only_missing_fee_structure_warns() {
        for scenario in FeeScenario::all() {
            let account = scenario.account(BalancePolicy::default()).unwrap();
            assert_eq!(
                account.fold.has_warnings(),
                scenario.name == "missing fee structure",
                "{}",
                scenario.name
            );
        }
    }
}
