//! Fee Domain Ports
//!
//! The ledger reads three things from the outside world: the fee structure
//! catalog, a student's recorded payments, and the roster of a class. Each is
//! a port so the service works the same against PostgreSQL (`infra_db`) and
//! the in-memory store used in tests (`test_utils`).
//!
//! Implementations must return a consistent snapshot for one call. The
//! service does not retry or reconcile partial reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, OperationMetadata, PortError, StudentId};

use crate::row::{FeeStructureRow, PaymentRow};

/// A student as listed on a class roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub admission_number: String,
    pub full_name: String,
    pub class_name: String,
}

/// Read-only access to configured fee structures
#[async_trait]
pub trait FeeStructureCatalog: DomainPort {
    /// Returns the fee structure rows for a class and academic year
    ///
    /// Terms without a configured structure are simply absent.
    async fn fee_structures(
        &self,
        class_name: &str,
        year: i32,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<FeeStructureRow>, PortError>;
}

/// Read-only access to recorded payments
#[async_trait]
pub trait PaymentLedgerSource: DomainPort {
    /// Returns every payment row of a student for an academic year
    async fn payments_for_student(
        &self,
        student_id: StudentId,
        year: i32,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<PaymentRow>, PortError>;
}

/// Read-only access to class rosters
#[async_trait]
pub trait StudentRoster: DomainPort {
    /// Returns the students currently enrolled in a class
    async fn students_in_class(
        &self,
        class_name: &str,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<StudentRecord>, PortError>;
}
