//! Custom Test Assertions
//!
//! Ledger invariant checks that name the failing term or payment.

use core_kernel::Money;
use domain_fees::{BalancePolicy, FeeStatus, LedgerFold, StudentFeeAccount};

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero, got {}", money);
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(money.is_positive(), "Expected positive amount, got {}", money);
}

/// Asserts that a Money value is negative
pub fn assert_money_negative(money: &Money) {
    assert!(money.is_negative(), "Expected negative amount, got {}", money);
}

/// Asserts `net_balance == carry_forward_in + term_fee - term_payments` for every term
pub fn assert_term_invariant(fold: &LedgerFold) {
    for term in &fold.term_balances {
        let expected = term
            .carry_forward_in
            .checked_add(&term.term_fee)
            .and_then(|m| m.checked_sub(&term.term_payments))
            .expect("term figures share the fold currency");
        assert_eq!(
            term.net_balance, expected,
            "{}: net {} != carried {} + fee {} - paid {}",
            term.term, term.net_balance, term.carry_forward_in, term.term_fee, term.term_payments
        );
    }
}

/// Asserts that each term starts where the previous one ended, less any
/// unbilled-term payments folded in between
pub fn assert_carry_forward_chain(fold: &LedgerFold) {
    let mut previous_net = Money::zero(fold.currency);
    for term in &fold.term_balances {
        let expected = previous_net
            .checked_sub(&term.unbilled_payments_in)
            .expect("term figures share the fold currency");
        assert_eq!(
            term.carry_forward_in, expected,
            "{} carried in {}, expected {} less unbilled {}",
            term.term, term.carry_forward_in, previous_net, term.unbilled_payments_in
        );
        previous_net = term.net_balance;
    }
}

/// Asserts that each policy's balance is fees billed minus what it counts as paid
pub fn assert_conservation(fold: &LedgerFold) {
    let fees = fold.total_fees().expect("single currency");
    for policy in [BalancePolicy::BilledTermsOnly, BalancePolicy::IncludeUnbilledPayments] {
        let paid = fold.paid(policy).expect("single currency");
        let expected = fees.checked_sub(&paid).expect("single currency");
        assert_eq!(
            fold.balance(policy),
            expected,
            "{:?}: balance {} != fees {} - paid {}",
            policy,
            fold.balance(policy),
            fees,
            paid
        );
    }
}

/// Asserts that status, balance and summary tell the same story
pub fn assert_status_consistent(account: &StudentFeeAccount) {
    let balance = account.balance();
    match account.status {
        FeeStatus::Credit => assert_money_negative(&balance),
        FeeStatus::Cleared => assert_money_zero(&balance),
        FeeStatus::Partial | FeeStatus::Defaulter => assert_money_positive(&balance),
    }

    let summary = &account.summary;
    assert_eq!(summary.final_balance, balance, "summary balance disagrees with account balance");
    assert_eq!(
        summary.total_paid,
        account.fold.paid(account.policy).expect("single currency"),
        "summary paid disagrees with {:?}",
        account.policy
    );
    assert_eq!(
        account.status,
        FeeStatus::classify(&summary.final_balance, &summary.total_paid),
        "status disagrees with summary"
    );
}

/// Runs every ledger check that holds for any account
pub fn assert_ledger_consistent(account: &StudentFeeAccount) {
    assert_term_invariant(&account.fold);
    assert_carry_forward_chain(&account.fold);
    assert_conservation(&account.fold);
    assert_status_consistent(account);
}
