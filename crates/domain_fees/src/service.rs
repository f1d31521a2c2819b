//! Fee account service
//!
//! The application entry point for fee figures. It reads rows through the
//! ports, runs the ledger pipeline once per student and year, and hands the
//! result to whichever view asked.

use std::sync::Arc;
use tracing::{instrument, warn};

use core_kernel::{Currency, Money, OperationMetadata, PaymentId, StudentId};

use crate::error::FeeError;
use crate::event::LedgerEventBuilder;
use crate::ledger::{BalanceFoldEngine, BalancePolicy, IncompleteDataWarning, LedgerFold};
use crate::payment::Payment;
use crate::ports::{FeeStructureCatalog, PaymentLedgerSource, StudentRecord, StudentRoster};
use crate::row::{FeeStructureRow, PaymentRow};
use crate::statement::{BalancePosition, PaymentHistoryEntry, Receipt, TermStatement};
use crate::status::FeeStatus;
use crate::summary::AnnualSummary;

/// A student's fee account for one academic year
#[derive(Debug, Clone)]
pub struct StudentFeeAccount {
    pub student_id: StudentId,
    pub class_name: String,
    pub year: i32,
    pub policy: BalancePolicy,
    pub fold: LedgerFold,
    pub payments: Vec<Payment>,
    pub summary: AnnualSummary,
    pub status: FeeStatus,
}

impl StudentFeeAccount {
    /// Runs the whole pipeline over raw rows
    ///
    /// This is the only place balances are computed; every view reads the
    /// returned account.
    ///
    /// # Errors
    ///
    /// Returns `FeeError::Validation` for malformed rows. The fold is not
    /// attempted in that case.
    pub fn compute(
        student_id: StudentId,
        class_name: &str,
        year: i32,
        currency: Currency,
        policy: BalancePolicy,
        fee_rows: &[FeeStructureRow],
        payment_rows: &[PaymentRow],
    ) -> Result<Self, FeeError> {
        let builder = LedgerEventBuilder::new(class_name, year, currency);
        let (structures, payments) = builder.coerce(fee_rows, payment_rows)?;
        let events = builder.build(&structures, &payments)?;
        let fold = BalanceFoldEngine::new(currency).fold(&events)?;

        let summary = AnnualSummary::for_policy(&fold, policy)?;
        let status = FeeStatus::classify(&summary.final_balance, &summary.total_paid);

        Ok(Self {
            student_id,
            class_name: builder.class_name().to_string(),
            year,
            policy,
            fold,
            payments,
            summary,
            status,
        })
    }

    /// The signed balance under the account's policy
    pub fn balance(&self) -> Money {
        self.fold.balance(self.policy)
    }

    /// The balance made explicit for display
    pub fn position(&self) -> BalancePosition {
        BalancePosition::from_signed(self.balance())
    }

    pub fn term_statements(&self) -> Vec<TermStatement> {
        TermStatement::for_fold(&self.fold)
    }

    pub fn payment_history(&self) -> Vec<PaymentHistoryEntry> {
        PaymentHistoryEntry::for_fold(&self.fold, &self.payments, self.year)
    }

    /// The receipt for one of the account's payments
    pub fn receipt(&self, payment_id: PaymentId) -> Result<Receipt, FeeError> {
        Receipt::issue(&self.fold, &self.payments, &self.class_name, self.year, payment_id)
            .ok_or(FeeError::PaymentNotFound(payment_id))
    }

    /// Payments folded against terms with no fee structure
    pub fn warnings(&self) -> &[IncompleteDataWarning] {
        &self.fold.warnings
    }
}

/// One student's line on a class dashboard
///
/// Each row carries its own outcome so one student's bad data never hides
/// the rest of the class.
#[derive(Debug)]
pub struct DashboardRow {
    pub student: StudentRecord,
    pub outcome: Result<StudentFeeAccount, FeeError>,
}

/// Reads fee data through the ports and computes accounts
#[derive(Clone)]
pub struct FeeAccountService {
    catalog: Arc<dyn FeeStructureCatalog>,
    ledger: Arc<dyn PaymentLedgerSource>,
    roster: Arc<dyn StudentRoster>,
    currency: Currency,
    policy: BalancePolicy,
}

impl FeeAccountService {
    /// Creates a service over the given ports
    ///
    /// # Arguments
    ///
    /// * `catalog` - Fee structure source
    /// * `ledger` - Payment source
    /// * `roster` - Class roster source
    /// * `currency` - Currency every amount is read in
    pub fn new(
        catalog: Arc<dyn FeeStructureCatalog>,
        ledger: Arc<dyn PaymentLedgerSource>,
        roster: Arc<dyn StudentRoster>,
        currency: Currency,
    ) -> Self {
        Self {
            catalog,
            ledger,
            roster,
            currency,
            policy: BalancePolicy::default(),
        }
    }

    /// Sets the default policy for payments on unbilled terms
    pub fn with_policy(mut self, policy: BalancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn policy(&self) -> BalancePolicy {
        self.policy
    }

    /// Computes one student's account
    ///
    /// `policy` overrides the service default when given.
    #[instrument(skip(self), fields(student_id = %student_id))]
    pub async fn student_account(
        &self,
        student_id: StudentId,
        class_name: &str,
        year: i32,
        policy: Option<BalancePolicy>,
    ) -> Result<StudentFeeAccount, FeeError> {
        let metadata = Self::metadata(class_name, year);
        let fee_rows = self
            .catalog
            .fee_structures(class_name, year, Some(metadata.clone()))
            .await?;
        let payment_rows = self
            .ledger
            .payments_for_student(student_id, year, Some(metadata))
            .await?;

        self.compute(student_id, class_name, year, policy, &fee_rows, &payment_rows)
    }

    /// Payment history with running balances
    pub async fn payment_history(
        &self,
        student_id: StudentId,
        class_name: &str,
        year: i32,
    ) -> Result<Vec<PaymentHistoryEntry>, FeeError> {
        let account = self.student_account(student_id, class_name, year, None).await?;
        Ok(account.payment_history())
    }

    /// Receipt for one payment
    ///
    /// # Errors
    ///
    /// Returns `FeeError::PaymentNotFound` if the payment is not in the
    /// student's ledger for the year.
    pub async fn receipt(
        &self,
        student_id: StudentId,
        class_name: &str,
        year: i32,
        payment_id: PaymentId,
    ) -> Result<Receipt, FeeError> {
        let account = self.student_account(student_id, class_name, year, None).await?;
        account.receipt(payment_id)
    }

    /// Accounts for every student in a class
    ///
    /// Fails only if the roster or the catalog cannot be read; per-student
    /// failures are reported in the student's row.
    #[instrument(skip(self))]
    pub async fn class_dashboard(
        &self,
        class_name: &str,
        year: i32,
    ) -> Result<Vec<DashboardRow>, FeeError> {
        let metadata = Self::metadata(class_name, year);
        let students = self
            .roster
            .students_in_class(class_name, Some(metadata.clone()))
            .await?;
        let fee_rows = self
            .catalog
            .fee_structures(class_name, year, Some(metadata.clone()))
            .await?;

        let mut rows = Vec::with_capacity(students.len());
        for student in students {
            let outcome = match self
                .ledger
                .payments_for_student(student.id, year, Some(metadata.clone()))
                .await
            {
                Ok(payment_rows) => {
                    self.compute(student.id, class_name, year, None, &fee_rows, &payment_rows)
                }
                Err(e) => Err(FeeError::from(e)),
            };
            if let Err(e) = &outcome {
                warn!(student_id = %student.id, error = %e, "Fee account could not be computed");
            }
            rows.push(DashboardRow { student, outcome });
        }

        Ok(rows)
    }

    fn compute(
        &self,
        student_id: StudentId,
        class_name: &str,
        year: i32,
        policy: Option<BalancePolicy>,
        fee_rows: &[FeeStructureRow],
        payment_rows: &[PaymentRow],
    ) -> Result<StudentFeeAccount, FeeError> {
        let account = StudentFeeAccount::compute(
            student_id,
            class_name,
            year,
            self.currency,
            policy.unwrap_or(self.policy),
            fee_rows,
            payment_rows,
        )?;

        for warning in account.warnings() {
            warn!(
                student_id = %student_id,
                term = %warning.term,
                amount = %warning.amount,
                payments = warning.payment_ids.len(),
                "Payments recorded for a term with no fee structure"
            );
        }

        Ok(account)
    }

    fn metadata(class_name: &str, year: i32) -> OperationMetadata {
        OperationMetadata::default()
            .with_context("class_name", class_name)
            .with_context("year", year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::FieldValue;
    use crate::term::Term;
    use async_trait::async_trait;
    use core_kernel::{DomainPort, PortError};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    struct StubStore {
        fees: Vec<FeeStructureRow>,
        payments: HashMap<StudentId, Vec<PaymentRow>>,
        students: Vec<StudentRecord>,
        failing_student: Option<StudentId>,
    }

    impl DomainPort for StubStore {}

    #[async_trait]
    impl FeeStructureCatalog for StubStore {
        async fn fee_structures(
            &self,
            _class_name: &str,
            _year: i32,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<FeeStructureRow>, PortError> {
            Ok(self.fees.clone())
        }
    }

    #[async_trait]
    impl PaymentLedgerSource for StubStore {
        async fn payments_for_student(
            &self,
            student_id: StudentId,
            _year: i32,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<PaymentRow>, PortError> {
            if self.failing_student == Some(student_id) {
                return Err(PortError::connection("ledger offline"));
            }
            Ok(self.payments.get(&student_id).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl StudentRoster for StubStore {
        async fn students_in_class(
            &self,
            _class_name: &str,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<StudentRecord>, PortError> {
            Ok(self.students.clone())
        }
    }

    fn fee_row(term: &str, total: &str) -> FeeStructureRow {
        FeeStructureRow {
            id: None,
            class_name: "Form 3".to_string(),
            term: FieldValue::from(term),
            year: 2024,
            tuition_fee: None,
            boarding_fee: None,
            activity_fee: None,
            other_fees: None,
            total_fee: Some(FieldValue::from(total)),
        }
    }

    fn payment_row(student_id: StudentId, term: &str, amount: &str) -> PaymentRow {
        PaymentRow {
            id: PaymentId::new(),
            student_id: Some(student_id),
            term: FieldValue::from(term),
            year: 2024,
            amount_paid: FieldValue::from(amount),
            payment_date: None,
            receipt_number: None,
        }
    }

    fn student(name: &str) -> StudentRecord {
        StudentRecord {
            id: StudentId::new(),
            admission_number: format!("ADM-{}", name),
            full_name: name.to_string(),
            class_name: "Form 3".to_string(),
        }
    }

    fn service(store: StubStore) -> FeeAccountService {
        let store = Arc::new(store);
        FeeAccountService::new(store.clone(), store.clone(), store, Currency::KES)
    }

    #[tokio::test]
    async fn test_student_account_policy_override() {
        let pupil = student("Amina");
        let store = StubStore {
            fees: vec![fee_row("1", "10000")],
            payments: HashMap::from([(
                pupil.id,
                vec![payment_row(pupil.id, "1", "10000"), payment_row(pupil.id, "2", "5000")],
            )]),
            students: vec![pupil.clone()],
            failing_student: None,
        };
        let service = service(store);

        let billed = service.student_account(pupil.id, "Form 3", 2024, None).await.unwrap();
        assert_eq!(billed.status, FeeStatus::Cleared);
        assert_eq!(billed.warnings().len(), 1);
        assert_eq!(billed.warnings()[0].term, Term::Second);

        let all = service
            .student_account(pupil.id, "Form 3", 2024, Some(BalancePolicy::IncludeUnbilledPayments))
            .await
            .unwrap();
        assert_eq!(all.status, FeeStatus::Credit);
        assert_eq!(all.balance().amount(), dec!(-5000));
    }

    #[tokio::test]
    async fn test_payment_between_billed_terms_counts_toward_paid() {
        let pupil = student("Faith");
        let service = service(StubStore {
            fees: vec![fee_row("1", "10000"), fee_row("3", "10000")],
            payments: HashMap::from([(pupil.id, vec![payment_row(pupil.id, "2", "3000")])]),
            students: vec![pupil.clone()],
            failing_student: None,
        });

        let account = service.student_account(pupil.id, "Form 3", 2024, None).await.unwrap();

        assert_eq!(account.balance().amount(), dec!(17000));
        assert_eq!(account.summary.final_balance, account.balance());
        assert_eq!(account.summary.total_fees.amount(), dec!(20000));
        assert_eq!(account.summary.total_paid.amount(), dec!(3000));
        assert_eq!(account.summary.percent_paid_display(), dec!(15));
        assert_eq!(account.status, FeeStatus::Partial);
        assert_eq!(account.warnings().len(), 1);

        let terms = account.term_statements();
        assert_eq!(terms[0].net_balance.amount(), dec!(10000));
        assert_eq!(terms[1].unbilled_payments_in.amount(), dec!(3000));
        assert_eq!(terms[1].carry_forward_in.amount(), dec!(7000));
    }

    #[tokio::test]
    async fn test_summary_follows_policy() {
        let pupil = student("Gitau");
        let service = service(StubStore {
            fees: vec![fee_row("1", "10000")],
            payments: HashMap::from([(
                pupil.id,
                vec![payment_row(pupil.id, "1", "10000"), payment_row(pupil.id, "2", "5000")],
            )]),
            students: vec![pupil.clone()],
            failing_student: None,
        });

        let inclusive = service
            .student_account(pupil.id, "Form 3", 2024, Some(BalancePolicy::IncludeUnbilledPayments))
            .await
            .unwrap();
        assert_eq!(inclusive.summary.final_balance, inclusive.balance());
        assert_eq!(inclusive.summary.final_balance.amount(), dec!(-5000));
        assert_eq!(inclusive.summary.total_paid.amount(), dec!(15000));
        assert_eq!(inclusive.summary.percent_paid_display(), dec!(100));

        let billed = service.student_account(pupil.id, "Form 3", 2024, None).await.unwrap();
        assert_eq!(billed.summary.final_balance.amount(), dec!(0));
        assert_eq!(billed.summary.total_paid.amount(), dec!(10000));
    }

    #[tokio::test]
    async fn test_receipt_for_unknown_payment() {
        let pupil = student("Brian");
        let service = service(StubStore {
            fees: vec![fee_row("1", "10000")],
            payments: HashMap::new(),
            students: vec![pupil.clone()],
            failing_student: None,
        });

        let result = service.receipt(pupil.id, "Form 3", 2024, PaymentId::new()).await;
        assert!(matches!(result, Err(FeeError::PaymentNotFound(_))));
    }

    #[tokio::test]
    async fn test_dashboard_isolates_per_student_failures() {
        let good = student("Chege");
        let malformed = student("Dalia");
        let offline = student("Evans");
        let store = StubStore {
            fees: vec![fee_row("1", "12000")],
            payments: HashMap::from([
                (good.id, vec![payment_row(good.id, "1", "2000")]),
                (malformed.id, vec![payment_row(malformed.id, "1", "lots")]),
            ]),
            students: vec![good.clone(), malformed.clone(), offline.clone()],
            failing_student: Some(offline.id),
        };

        let rows = service(store).class_dashboard("Form 3", 2024).await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].outcome.as_ref().unwrap().status, FeeStatus::Partial);
        assert!(matches!(rows[1].outcome, Err(FeeError::Validation(_))));
        assert!(matches!(rows[2].outcome, Err(FeeError::Port(_))));
    }
}
