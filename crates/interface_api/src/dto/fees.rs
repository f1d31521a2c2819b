//! Fee DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Currency, Money, PaymentId, StudentId};
use domain_fees::{
    AnnualSummary, BalancePolicy, BalancePosition, DashboardRow, FeeStatus, IncompleteDataWarning,
    PaymentHistoryEntry, StudentFeeAccount, Term, TermStatement,
};

/// Query for a single student's fees
#[derive(Debug, Deserialize, Validate)]
pub struct StudentFeesQuery {
    #[validate(length(min = 1, max = 64))]
    pub class_name: String,
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    /// Overrides the configured policy for this request
    #[serde(default)]
    pub policy: Option<BalancePolicy>,
}

/// Query for a class dashboard
#[derive(Debug, Deserialize, Validate)]
pub struct ClassFeesQuery {
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
}

#[derive(Debug, Serialize)]
pub struct SummaryDto {
    pub total_fees: Money,
    pub total_paid: Money,
    pub final_balance: Money,
    /// Percentage with two decimal places
    pub percent_paid: Decimal,
}

impl From<&AnnualSummary> for SummaryDto {
    fn from(summary: &AnnualSummary) -> Self {
        Self {
            total_fees: summary.total_fees,
            total_paid: summary.total_paid,
            final_balance: summary.final_balance,
            percent_paid: summary.percent_paid_display(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WarningDto {
    pub term: Term,
    pub payment_ids: Vec<PaymentId>,
    pub amount: Money,
    pub message: String,
}

impl From<&IncompleteDataWarning> for WarningDto {
    fn from(warning: &IncompleteDataWarning) -> Self {
        Self {
            term: warning.term,
            payment_ids: warning.payment_ids.clone(),
            amount: warning.amount,
            message: warning.to_string(),
        }
    }
}

/// Termly and annual fee status of one student
#[derive(Debug, Serialize)]
pub struct StudentFeesResponse {
    pub student_id: StudentId,
    pub class_name: String,
    pub year: i32,
    pub currency: Currency,
    pub policy: BalancePolicy,
    pub status: FeeStatus,
    pub status_label: String,
    pub balance: Money,
    pub position: BalancePosition,
    pub summary: SummaryDto,
    pub terms: Vec<TermStatement>,
    pub warnings: Vec<WarningDto>,
}

impl From<&StudentFeeAccount> for StudentFeesResponse {
    fn from(account: &StudentFeeAccount) -> Self {
        Self {
            student_id: account.student_id,
            class_name: account.class_name.clone(),
            year: account.year,
            currency: account.fold.currency,
            policy: account.policy,
            status: account.status,
            status_label: account.status.label().to_string(),
            balance: account.balance(),
            position: account.position(),
            summary: SummaryDto::from(&account.summary),
            terms: account.term_statements(),
            warnings: account.warnings().iter().map(WarningDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentHistoryResponse {
    pub student_id: StudentId,
    pub class_name: String,
    pub year: i32,
    pub payments: Vec<PaymentHistoryEntry>,
}

/// One student's line on the class dashboard
///
/// Figures are absent when the student's account could not be computed;
/// `error` says why.
#[derive(Debug, Serialize)]
pub struct DashboardEntryDto {
    pub student_id: StudentId,
    pub admission_number: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FeeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryDto>,
    pub warnings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&DashboardRow> for DashboardEntryDto {
    fn from(row: &DashboardRow) -> Self {
        let base = Self {
            student_id: row.student.id,
            admission_number: row.student.admission_number.clone(),
            full_name: row.student.full_name.clone(),
            status: None,
            balance: None,
            summary: None,
            warnings: 0,
            error: None,
        };

        match &row.outcome {
            Ok(account) => Self {
                status: Some(account.status),
                balance: Some(account.balance()),
                summary: Some(SummaryDto::from(&account.summary)),
                warnings: account.warnings().len(),
                ..base
            },
            Err(e) => Self {
                error: Some(e.to_string()),
                ..base
            },
        }
    }
}

/// Head counts per status
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub cleared: usize,
    pub credit: usize,
    pub partial: usize,
    pub defaulter: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn tally(rows: &[DashboardRow]) -> Self {
        rows.iter().fold(Self::default(), |mut counts, row| {
            match row.outcome.as_ref().map(|a| a.status) {
                Ok(FeeStatus::Cleared) => counts.cleared += 1,
                Ok(FeeStatus::Credit) => counts.credit += 1,
                Ok(FeeStatus::Partial) => counts.partial += 1,
                Ok(FeeStatus::Defaulter) => counts.defaulter += 1,
                Err(_) => counts.failed += 1,
            }
            counts
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ClassDashboardResponse {
    pub class_name: String,
    pub year: i32,
    pub counts: StatusCounts,
    pub students: Vec<DashboardEntryDto>,
}
