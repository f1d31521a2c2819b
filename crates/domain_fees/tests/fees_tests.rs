//! Integration tests for domain_fees

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PaymentId, StudentId};

use domain_fees::{
    BalanceFoldEngine, BalancePolicy, FeeError, FeeStatus, FeeStructureRow, FieldValue, LedgerEvent,
    LedgerEventBuilder, PaymentRow, StudentFeeAccount, Term, ValidationError,
};

const CLASS: &str = "Grade 6";
const YEAR: i32 = 2024;

fn kes(amount: Decimal) -> Money {
    Money::new(amount, Currency::KES)
}

fn fee_row(term: u8, total: Decimal) -> FeeStructureRow {
    FeeStructureRow {
        id: None,
        class_name: CLASS.to_string(),
        term: FieldValue::Number(Decimal::from(term)),
        year: YEAR,
        tuition_fee: Some(FieldValue::Number(total)),
        boarding_fee: None,
        activity_fee: None,
        other_fees: None,
        total_fee: None,
    }
}

fn payment_row(student_id: StudentId, term: u8, amount: Decimal, date: Option<&str>) -> PaymentRow {
    PaymentRow {
        id: PaymentId::new(),
        student_id: Some(student_id),
        term: FieldValue::Number(Decimal::from(term)),
        year: YEAR,
        amount_paid: FieldValue::Number(amount),
        payment_date: date.map(str::to_string),
        receipt_number: None,
    }
}

fn account(
    student_id: StudentId,
    fees: &[FeeStructureRow],
    payments: &[PaymentRow],
    policy: BalancePolicy,
) -> StudentFeeAccount {
    StudentFeeAccount::compute(student_id, CLASS, YEAR, Currency::KES, policy, fees, payments)
        .expect("valid rows")
}

// ============================================================================
// Scenario Tests
// ============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_scenario_a_simple_settle() {
        let student = StudentId::new();
        let fees = vec![fee_row(1, dec!(15000)), fee_row(2, dec!(15000)), fee_row(3, dec!(15000))];
        let payments = vec![
            payment_row(student, 1, dec!(15000), Some("2024-01-10")),
            payment_row(student, 2, dec!(10000), Some("2024-05-06")),
            payment_row(student, 3, dec!(20000), Some("2024-09-02")),
        ];

        let account = account(student, &fees, &payments, BalancePolicy::BilledTermsOnly);
        let terms = &account.fold.term_balances;

        assert_eq!(terms.len(), 3);
        assert_eq!(terms[0].net_balance, kes(dec!(0)));
        assert_eq!(terms[1].carry_forward_in, kes(dec!(0)));
        assert_eq!(terms[1].net_balance, kes(dec!(5000)));
        assert_eq!(terms[2].carry_forward_in, kes(dec!(5000)));
        assert_eq!(terms[2].net_balance, kes(dec!(0)));
        assert_eq!(account.status, FeeStatus::Cleared);
        assert_eq!(account.summary.total_fees, kes(dec!(45000)));
        assert_eq!(account.summary.total_paid, kes(dec!(45000)));
        assert_eq!(account.summary.percent_paid_display(), dec!(100.00));
    }

    #[test]
    fn test_scenario_b_credit_carry_forward() {
        let student = StudentId::new();
        let fees = vec![fee_row(1, dec!(10000)), fee_row(2, dec!(10000))];
        let payments = vec![payment_row(student, 1, dec!(12000), Some("2024-01-15"))];

        let account = account(student, &fees, &payments, BalancePolicy::BilledTermsOnly);
        let terms = &account.fold.term_balances;

        assert_eq!(terms[0].net_balance, kes(dec!(-2000)));
        assert_eq!(terms[1].carry_forward_in, kes(dec!(-2000)));
        assert_eq!(terms[1].net_balance, kes(dec!(8000)));
        assert_eq!(account.status, FeeStatus::Partial);
        assert_eq!(account.position().to_string(), "Balance due: KSh 8000.00");
    }

    #[test]
    fn test_scenario_c_payment_for_unbilled_term() {
        let student = StudentId::new();
        let fees = vec![fee_row(1, dec!(10000))];
        let dangling = payment_row(student, 2, dec!(5000), Some("2024-05-02"));
        let payments = vec![payment_row(student, 1, dec!(10000), Some("2024-01-12")), dangling.clone()];

        let billed = account(student, &fees, &payments, BalancePolicy::BilledTermsOnly);

        assert_eq!(billed.fold.term_balances.len(), 1);
        assert!(billed.fold.term(Term::Second).is_none());
        assert_eq!(billed.fold.final_balance, kes(dec!(0)));
        assert_eq!(billed.fold.closing_balance, kes(dec!(-5000)));
        assert_eq!(billed.status, FeeStatus::Cleared);

        let warnings = billed.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].term, Term::Second);
        assert_eq!(warnings[0].payment_ids, vec![dangling.id]);
        assert_eq!(warnings[0].amount, kes(dec!(5000)));

        let snapshot = billed.fold.snapshot(dangling.id).unwrap();
        assert!(snapshot.unbilled_term);
        assert_eq!(snapshot.running_balance, kes(dec!(-5000)));

        let inclusive = account(student, &fees, &payments, BalancePolicy::IncludeUnbilledPayments);
        assert_eq!(inclusive.balance(), kes(dec!(-5000)));
        assert_eq!(inclusive.status, FeeStatus::Credit);
        assert_eq!(inclusive.summary.final_balance, kes(dec!(-5000)));
        assert_eq!(inclusive.summary.total_paid, kes(dec!(15000)));
    }

    #[test]
    fn test_payment_for_unbilled_term_between_billed_terms() {
        let student = StudentId::new();
        let fees = vec![fee_row(1, dec!(10000)), fee_row(3, dec!(10000))];
        let payments = vec![payment_row(student, 2, dec!(3000), Some("2024-05-10"))];

        let billed = account(student, &fees, &payments, BalancePolicy::BilledTermsOnly);
        let terms = &billed.fold.term_balances;

        assert_eq!(terms[0].net_balance, kes(dec!(10000)));
        assert_eq!(terms[1].unbilled_payments_in, kes(dec!(3000)));
        assert_eq!(terms[1].carry_forward_in, kes(dec!(7000)));
        assert_eq!(billed.balance(), kes(dec!(17000)));
        assert_eq!(billed.summary.total_paid, kes(dec!(3000)));
        assert_eq!(billed.summary.percent_paid_display(), dec!(15));
        assert_eq!(billed.status, FeeStatus::Partial);

        let inclusive = account(student, &fees, &payments, BalancePolicy::IncludeUnbilledPayments);
        assert_eq!(inclusive.balance(), billed.balance());
        assert_eq!(inclusive.summary, billed.summary);
    }

    #[test]
    fn test_scenario_d_defaulter() {
        let student = StudentId::new();
        let account = account(student, &[fee_row(1, dec!(12000))], &[], BalancePolicy::BilledTermsOnly);

        assert_eq!(account.fold.term_balances[0].net_balance, kes(dec!(12000)));
        assert_eq!(account.summary.total_paid, kes(dec!(0)));
        assert_eq!(account.status, FeeStatus::Defaulter);
        assert!(account.payment_history().is_empty());
    }

    #[test]
    fn test_nothing_billed_nothing_paid_is_cleared() {
        let account = account(StudentId::new(), &[], &[], BalancePolicy::BilledTermsOnly);

        assert!(account.fold.term_balances.is_empty());
        assert_eq!(account.balance(), kes(dec!(0)));
        assert_eq!(account.status, FeeStatus::Cleared);
        assert_eq!(account.summary.percent_paid_display(), dec!(0));
    }
}

// ============================================================================
// View Consistency Tests
// ============================================================================

mod view_tests {
    use super::*;

    #[test]
    fn test_receipt_and_history_agree_with_fold() {
        let student = StudentId::new();
        let fees = vec![fee_row(1, dec!(10000)), fee_row(2, dec!(10000))];
        let payments = vec![
            payment_row(student, 1, dec!(4000), Some("2024-01-20")),
            payment_row(student, 1, dec!(3000), Some("2024-01-05")),
            payment_row(student, 2, dec!(6000), None),
        ];
        let account = account(student, &fees, &payments, BalancePolicy::BilledTermsOnly);

        let history = account.payment_history();
        assert_eq!(history.len(), 3);
        // Earlier-dated payment applied first
        assert_eq!(history[0].payment_id, payments[1].id);
        assert_eq!(history[0].running_balance, kes(dec!(7000)));
        assert_eq!(history[1].running_balance, kes(dec!(3000)));
        assert_eq!(history[2].running_balance, kes(dec!(7000)));

        for entry in &history {
            let receipt = account.receipt(entry.payment_id).unwrap();
            assert_eq!(receipt.balance_after, entry.running_balance);
            assert_eq!(receipt.receipt_number, entry.receipt_number);
        }

        let last_term = account.term_statements().last().cloned().unwrap();
        assert_eq!(last_term.net_balance, account.balance());
        assert_eq!(account.summary.final_balance, account.balance());
    }

    #[test]
    fn test_receipt_for_unknown_payment_is_not_found() {
        let student = StudentId::new();
        let account = account(student, &[fee_row(1, dec!(100))], &[], BalancePolicy::BilledTermsOnly);

        assert!(matches!(
            account.receipt(PaymentId::new()),
            Err(FeeError::PaymentNotFound(_))
        ));
    }

    #[test]
    fn test_textual_rows_are_coerced() {
        let student = StudentId::new();
        let mut fee = fee_row(1, dec!(0));
        fee.term = FieldValue::from("Term 1");
        fee.tuition_fee = Some(FieldValue::from("8,000"));
        fee.boarding_fee = Some(FieldValue::from(" 2000.50 "));

        let mut payment = payment_row(student, 1, dec!(0), Some("2024-02-01T08:30:00Z"));
        payment.amount_paid = FieldValue::from("10000.50");

        let account = account(student, &[fee], &[payment], BalancePolicy::BilledTermsOnly);
        assert_eq!(account.fold.term_balances[0].term_fee, kes(dec!(10000.50)));
        assert_eq!(account.status, FeeStatus::Cleared);
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

mod validation_tests {
    use super::*;

    fn compute(fees: &[FeeStructureRow], payments: &[PaymentRow]) -> Result<StudentFeeAccount, FeeError> {
        StudentFeeAccount::compute(
            StudentId::new(),
            CLASS,
            YEAR,
            Currency::KES,
            BalancePolicy::default(),
            fees,
            payments,
        )
    }

    #[test]
    fn test_non_numeric_amount_fails_whole_computation() {
        let student = StudentId::new();
        let mut bad = payment_row(student, 1, dec!(0), None);
        bad.amount_paid = FieldValue::from("ten thousand");
        let good = payment_row(student, 1, dec!(500), None);

        let result = compute(&[fee_row(1, dec!(1000))], &[good, bad]);
        assert!(matches!(
            result,
            Err(FeeError::Validation(ValidationError::NonNumericAmount { .. }))
        ));
    }

    #[test]
    fn test_term_out_of_range_rejected() {
        let mut fee = fee_row(1, dec!(1000));
        fee.term = FieldValue::Number(dec!(4));

        assert!(matches!(
            compute(&[fee], &[]),
            Err(FeeError::Validation(ValidationError::InvalidTerm(_)))
        ));
    }

    #[test]
    fn test_missing_student_rejected() {
        let mut payment = payment_row(StudentId::new(), 1, dec!(100), None);
        payment.student_id = None;

        assert!(matches!(
            compute(&[], &[payment]),
            Err(FeeError::Validation(ValidationError::MissingStudentId { .. }))
        ));
    }

    #[test]
    fn test_zero_payment_rejected() {
        let payment = payment_row(StudentId::new(), 1, dec!(0), None);

        assert!(matches!(
            compute(&[], &[payment]),
            Err(FeeError::Validation(ValidationError::NonPositivePayment { .. }))
        ));
    }

    #[test]
    fn test_duplicate_fee_structure_rejected() {
        let result = compute(&[fee_row(2, dec!(1000)), fee_row(2, dec!(1000))], &[]);
        assert!(matches!(
            result,
            Err(FeeError::Validation(ValidationError::DuplicateFeeStructure { term: Term::Second, .. }))
        ));
        assert!(result.unwrap_err().is_data_error());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn amount() -> impl Strategy<Value = Decimal> {
        (1i64..50_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn fee_rows() -> impl Strategy<Value = Vec<FeeStructureRow>> {
        prop::collection::vec(prop::option::of(amount()), 3).prop_map(|fees| {
            fees.into_iter()
                .enumerate()
                .filter_map(|(i, fee)| fee.map(|f| fee_row(i as u8 + 1, f)))
                .collect()
        })
    }

    fn payment_rows(student: StudentId) -> impl Strategy<Value = Vec<PaymentRow>> {
        prop::collection::vec((1u8..=3, amount(), prop::option::of(1u32..=28)), 0..12).prop_map(
            move |payments| {
                payments
                    .into_iter()
                    .map(|(term, amount, day)| {
                        let date = day.map(|d| format!("2024-03-{:02}", d));
                        payment_row(student, term, amount, date.as_deref())
                    })
                    .collect()
            },
        )
    }

    fn inputs() -> impl Strategy<Value = (StudentId, Vec<FeeStructureRow>, Vec<PaymentRow>)> {
        let student = StudentId::new();
        (Just(student), fee_rows(), payment_rows(student))
    }

    proptest! {
        #[test]
        fn fold_is_deterministic((student, fees, payments) in inputs()) {
            let first = account(student, &fees, &payments, BalancePolicy::BilledTermsOnly);
            let second = account(student, &fees, &payments, BalancePolicy::BilledTermsOnly);
            prop_assert_eq!(first.fold, second.fold);
            prop_assert_eq!(first.status, second.status);
        }

        #[test]
        fn term_balance_invariant_holds((student, fees, payments) in inputs()) {
            let account = account(student, &fees, &payments, BalancePolicy::BilledTermsOnly);
            for term in &account.fold.term_balances {
                let expected = term.carry_forward_in
                    .checked_add(&term.term_fee).unwrap()
                    .checked_sub(&term.term_payments).unwrap();
                prop_assert_eq!(term.net_balance, expected);
            }
        }

        #[test]
        fn balances_conserve_money_under_both_policies((student, fees, payments) in inputs()) {
            for policy in [BalancePolicy::BilledTermsOnly, BalancePolicy::IncludeUnbilledPayments] {
                let account = account(student, &fees, &payments, policy);
                let fold = &account.fold;
                let fees_billed = fold.total_fees().unwrap();
                let paid = fold.paid(policy).unwrap();

                prop_assert_eq!(fold.balance(policy), fees_billed.checked_sub(&paid).unwrap());
                prop_assert_eq!(account.summary.final_balance, fold.balance(policy));
                prop_assert_eq!(account.summary.total_paid, paid);
                prop_assert_eq!(account.status, FeeStatus::classify(&fold.balance(policy), &paid));
            }
        }

        #[test]
        fn carry_forward_chains_through_unbilled_payments((student, fees, payments) in inputs()) {
            let account = account(student, &fees, &payments, BalancePolicy::BilledTermsOnly);

            let mut previous_net = kes(dec!(0));
            for term in &account.fold.term_balances {
                let expected = previous_net.checked_sub(&term.unbilled_payments_in).unwrap();
                prop_assert_eq!(term.carry_forward_in, expected);
                previous_net = term.net_balance;
            }
        }

        #[test]
        fn running_balance_steps_by_payment_and_accruals((student, fees, payments) in inputs()) {
            let builder = LedgerEventBuilder::new(CLASS, YEAR, Currency::KES);
            let events = builder.build_from_rows(&fees, &payments).unwrap();
            let fold = BalanceFoldEngine::new(Currency::KES).fold(&events).unwrap();
            prop_assert_eq!(fold.snapshots.len(), payments.len());

            // Each snapshot is the previous one, plus accruals in between, less its own amount
            let mut previous = kes(dec!(0));
            let mut accrued = kes(dec!(0));
            let mut snapshots = fold.snapshots.iter();
            for event in &events {
                match event {
                    LedgerEvent::Accrual { amount, .. } => accrued = accrued.checked_add(amount).unwrap(),
                    LedgerEvent::Payment { payment_id, amount, .. } => {
                        let snapshot = snapshots.next().unwrap();
                        prop_assert_eq!(snapshot.payment_id, *payment_id);
                        let expected = previous.checked_add(&accrued).unwrap().checked_sub(amount).unwrap();
                        prop_assert_eq!(snapshot.running_balance, expected);
                        previous = snapshot.running_balance;
                        accrued = kes(dec!(0));
                    }
                }
            }
        }

        #[test]
        fn events_ordered_by_term_with_accrual_first((_, fees, payments) in inputs()) {
            let builder = LedgerEventBuilder::new(CLASS, YEAR, Currency::KES);
            let events = builder.build_from_rows(&fees, &payments).unwrap();

            for pair in events.windows(2) {
                prop_assert!(pair[0].term() <= pair[1].term());
                if pair[0].term() == pair[1].term() {
                    prop_assert!(!pair[1].is_accrual());
                }
            }

            let fold = BalanceFoldEngine::new(Currency::KES).fold(&events).unwrap();
            let accruals = events.iter().filter(|e| matches!(e, LedgerEvent::Accrual { .. })).count();
            prop_assert_eq!(fold.term_balances.len(), accruals);
        }

        #[test]
        fn status_agrees_with_balance_sign((student, fees, payments) in inputs()) {
            for policy in [BalancePolicy::BilledTermsOnly, BalancePolicy::IncludeUnbilledPayments] {
                let account = account(student, &fees, &payments, policy);
                let balance = account.balance();
                match account.status {
                    FeeStatus::Credit => prop_assert!(balance.is_negative()),
                    FeeStatus::Cleared => prop_assert!(balance.is_zero()),
                    FeeStatus::Partial | FeeStatus::Defaulter => prop_assert!(balance.is_positive()),
                }
            }
        }
    }
}
