//! Fee repository
//!
//! SQL for the three fee tables. Records mirror the columns one to one and
//! convert into the domain's boundary rows without interpreting them.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use core_kernel::{FeeStructureId, PaymentId, StudentId};
use domain_fees::{FeeStructureRow, FieldValue, PaymentRow, StudentRecord};

use crate::error::DatabaseError;

/// Read access to students, fee structures and payments
#[derive(Debug, Clone)]
pub struct FeeRepository {
    pool: PgPool,
}

impl FeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fee structures configured for a class and year
    ///
    /// Class names are compared after trimming; every term row is returned,
    /// duplicates included, so the domain can reject them.
    pub async fn fee_structures(
        &self,
        class_name: &str,
        year: i32,
    ) -> Result<Vec<FeeStructureRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, FeeStructureRecord>(
            r#"
            SELECT fee_structure_id, class_name, term, year,
                   tuition_fee, boarding_fee, activity_fee, other_fees, total_fee
            FROM fee_structures
            WHERE btrim(class_name) = btrim($1) AND year = $2
            ORDER BY term, created_at
            "#,
        )
        .bind(class_name)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        debug!(class_name, year, count = records.len(), "Loaded fee structures");
        Ok(records)
    }

    /// Payments of one student in one year, in the order they were recorded
    pub async fn payments_for_student(
        &self,
        student_id: Uuid,
        year: i32,
    ) -> Result<Vec<PaymentRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT payment_id, student_id, term, year, amount_paid,
                   payment_date, receipt_number
            FROM fee_payments
            WHERE student_id = $1 AND year = $2
            ORDER BY recorded_at, payment_id
            "#,
        )
        .bind(student_id)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        debug!(%student_id, year, count = records.len(), "Loaded payments");
        Ok(records)
    }

    /// Active students of a class, by name
    pub async fn students_in_class(
        &self,
        class_name: &str,
    ) -> Result<Vec<StudentRecordRow>, DatabaseError> {
        let records = sqlx::query_as::<_, StudentRecordRow>(
            r#"
            SELECT student_id, admission_number, full_name, class_name
            FROM students
            WHERE btrim(class_name) = btrim($1) AND is_active
            ORDER BY full_name, admission_number
            "#,
        )
        .bind(class_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

/// A `fee_structures` row
#[derive(Debug, Clone, FromRow)]
pub struct FeeStructureRecord {
    pub fee_structure_id: Uuid,
    pub class_name: String,
    pub term: String,
    pub year: i32,
    pub tuition_fee: Option<Decimal>,
    pub boarding_fee: Option<Decimal>,
    pub activity_fee: Option<Decimal>,
    pub other_fees: Option<Decimal>,
    pub total_fee: Option<Decimal>,
}

impl From<FeeStructureRecord> for FeeStructureRow {
    fn from(record: FeeStructureRecord) -> Self {
        FeeStructureRow {
            id: Some(FeeStructureId::from(record.fee_structure_id)),
            class_name: record.class_name,
            term: FieldValue::Text(record.term),
            year: record.year,
            tuition_fee: record.tuition_fee.map(FieldValue::Number),
            boarding_fee: record.boarding_fee.map(FieldValue::Number),
            activity_fee: record.activity_fee.map(FieldValue::Number),
            other_fees: record.other_fees.map(FieldValue::Number),
            total_fee: record.total_fee.map(FieldValue::Number),
        }
    }
}

/// A `fee_payments` row
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRecord {
    pub payment_id: Uuid,
    pub student_id: Option<Uuid>,
    pub term: String,
    pub year: i32,
    pub amount_paid: Decimal,
    pub payment_date: Option<DateTime<Utc>>,
    pub receipt_number: Option<String>,
}

impl From<PaymentRecord> for PaymentRow {
    fn from(record: PaymentRecord) -> Self {
        PaymentRow {
            id: PaymentId::from(record.payment_id),
            student_id: record.student_id.map(StudentId::from),
            term: FieldValue::Text(record.term),
            year: record.year,
            amount_paid: FieldValue::Number(record.amount_paid),
            payment_date: record
                .payment_date
                .map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            receipt_number: record.receipt_number,
        }
    }
}

/// A `students` row
#[derive(Debug, Clone, FromRow)]
pub struct StudentRecordRow {
    pub student_id: Uuid,
    pub admission_number: String,
    pub full_name: String,
    pub class_name: String,
}

impl From<StudentRecordRow> for StudentRecord {
    fn from(row: StudentRecordRow) -> Self {
        StudentRecord {
            id: StudentId::from(row.student_id),
            admission_number: row.admission_number,
            full_name: row.full_name,
            class_name: row.class_name,
        }
    }
}
