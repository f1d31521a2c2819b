//! PostgreSQL Fee Adapter
//!
//! Implements the fee domain ports on top of [`FeeRepository`]. The adapter
//! only moves rows across the boundary; amount and term coercion stays in
//! `domain_fees`.

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;
use tracing::{debug, instrument};

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError, StudentId,
};
use domain_fees::{
    FeeStructureCatalog, FeeStructureRow, PaymentLedgerSource, PaymentRow, StudentRecord,
    StudentRoster,
};

use crate::repositories::FeeRepository;

const ADAPTER_ID: &str = "postgres-fee-adapter";

/// PostgreSQL-backed fee catalog, payment ledger and roster
///
/// Database errors reach the domain as `PortError`: connection failures and
/// pool exhaustion are transient, everything else is internal.
#[derive(Debug, Clone)]
pub struct PostgresFeeAdapter {
    repository: FeeRepository,
    pool: PgPool,
}

impl PostgresFeeAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: FeeRepository::new(pool.clone()),
            pool,
        }
    }

    /// The underlying repository, for queries the ports do not expose
    pub fn repository(&self) -> &FeeRepository {
        &self.repository
    }
}

impl DomainPort for PostgresFeeAdapter {}

#[async_trait]
impl HealthCheckable for PostgresFeeAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(_) => HealthCheckResult::healthy_after(ADAPTER_ID, start.elapsed()),
            Err(e) => HealthCheckResult::unhealthy(
                ADAPTER_ID,
                start.elapsed().as_millis() as u64,
                format!("Database error: {}", e),
            ),
        }
    }
}

#[async_trait]
impl FeeStructureCatalog for PostgresFeeAdapter {
    #[instrument(skip(self, metadata))]
    async fn fee_structures(
        &self,
        class_name: &str,
        year: i32,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<FeeStructureRow>, PortError> {
        debug!(request_id = ?metadata.and_then(|m| m.request_id), "Reading fee structures");

        let records = self.repository.fee_structures(class_name, year).await?;
        Ok(records.into_iter().map(FeeStructureRow::from).collect())
    }
}

#[async_trait]
impl PaymentLedgerSource for PostgresFeeAdapter {
    #[instrument(skip(self, metadata), fields(student_id = %student_id))]
    async fn payments_for_student(
        &self,
        student_id: StudentId,
        year: i32,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<PaymentRow>, PortError> {
        debug!(request_id = ?metadata.and_then(|m| m.request_id), "Reading payments");

        let records = self
            .repository
            .payments_for_student(student_id.into(), year)
            .await?;
        Ok(records.into_iter().map(PaymentRow::from).collect())
    }
}

#[async_trait]
impl StudentRoster for PostgresFeeAdapter {
    #[instrument(skip(self, _metadata))]
    async fn students_in_class(
        &self,
        class_name: &str,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<StudentRecord>, PortError> {
        let rows = self.repository.students_in_class(class_name).await?;
        Ok(rows.into_iter().map(StudentRecord::from).collect())
    }
}
