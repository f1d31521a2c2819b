//! In-memory fee store
//!
//! Implements all three fee ports and `HealthCheckable` over plain vectors,
//! for service and API tests that should not need PostgreSQL.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError, StudentId,
};
use domain_fees::{
    FeeStructureCatalog, FeeStructureRow, PaymentLedgerSource, PaymentRow, StudentRecord,
    StudentRoster,
};

use crate::fixtures::FeeScenario;

const ADAPTER_ID: &str = "in-memory-fee-store";

#[derive(Debug, Default)]
struct StoreData {
    students: Vec<StudentRecord>,
    fee_structures: Vec<FeeStructureRow>,
    payments: Vec<PaymentRow>,
    offline: bool,
    failing_ledgers: HashSet<StudentId>,
}

/// A fee store held in memory
#[derive(Debug, Default)]
pub struct InMemoryFeeStore {
    data: RwLock<StoreData>,
}

impl InMemoryFeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_student(&self, student: StudentRecord) {
        self.write(|d| d.students.push(student));
    }

    pub fn add_fee_structure(&self, row: FeeStructureRow) {
        self.write(|d| d.fee_structures.push(row));
    }

    pub fn add_payment(&self, row: PaymentRow) {
        self.write(|d| d.payments.push(row));
    }

    /// Loads a scenario into `class_name` and enrols its student
    ///
    /// The scenario's fee structures are filed under `class_name`; a term the
    /// class already has a structure for is left as it is.
    pub fn load_scenario(&self, scenario: &FeeScenario, class_name: &str, full_name: &str) -> StudentRecord {
        let short = scenario.student_id.as_uuid().simple().to_string();
        let student = StudentRecord {
            id: scenario.student_id,
            admission_number: format!("ADM-{}", short[..6].to_uppercase()),
            full_name: full_name.to_string(),
            class_name: class_name.to_string(),
        };
        self.add_student(student.clone());

        self.write(|d| {
            for row in &scenario.fee_structures {
                let configured = d.fee_structures.iter().any(|f| {
                    f.class_name == class_name && f.year == row.year && f.term == row.term
                });
                if !configured {
                    d.fee_structures.push(FeeStructureRow {
                        class_name: class_name.to_string(),
                        ..row.clone()
                    });
                }
            }
            d.payments.extend(scenario.payments.iter().cloned());
        });

        student
    }

    /// Makes every port call fail with a connection error
    pub fn set_offline(&self, offline: bool) {
        self.write(|d| d.offline = offline);
    }

    /// Makes payment reads for one student fail
    pub fn fail_ledger_for(&self, student_id: StudentId) {
        self.write(|d| {
            d.failing_ledgers.insert(student_id);
        });
    }

    fn write<R>(&self, f: impl FnOnce(&mut StoreData) -> R) -> R {
        let mut guard = self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    fn read<R>(&self, f: impl FnOnce(&StoreData) -> R) -> R {
        let guard = self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    fn online<R>(&self, f: impl FnOnce(&StoreData) -> R) -> Result<R, PortError> {
        self.read(|d| {
            if d.offline {
                Err(PortError::connection("in-memory store is offline"))
            } else {
                Ok(f(d))
            }
        })
    }
}

impl DomainPort for InMemoryFeeStore {}

#[async_trait]
impl HealthCheckable for InMemoryFeeStore {
    async fn health_check(&self) -> HealthCheckResult {
        if self.read(|d| d.offline) {
            HealthCheckResult::unhealthy(ADAPTER_ID, 0, "store is offline")
        } else {
            HealthCheckResult::healthy(ADAPTER_ID, 0)
        }
    }
}

#[async_trait]
impl FeeStructureCatalog for InMemoryFeeStore {
    async fn fee_structures(
        &self,
        class_name: &str,
        year: i32,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<FeeStructureRow>, PortError> {
        self.online(|d| {
            d.fee_structures
                .iter()
                .filter(|f| f.year == year && f.class_name.trim() == class_name.trim())
                .cloned()
                .collect()
        })
    }
}

#[async_trait]
impl PaymentLedgerSource for InMemoryFeeStore {
    async fn payments_for_student(
        &self,
        student_id: StudentId,
        year: i32,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<PaymentRow>, PortError> {
        self.online(|d| {
            if d.failing_ledgers.contains(&student_id) {
                return Err(PortError::internal("payment ledger read failed"));
            }
            Ok(d.payments
                .iter()
                .filter(|p| p.student_id == Some(student_id) && p.year == year)
                .cloned()
                .collect())
        })?
    }
}

#[async_trait]
impl StudentRoster for InMemoryFeeStore {
    async fn students_in_class(
        &self,
        class_name: &str,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<StudentRecord>, PortError> {
        self.online(|d| {
            d.students
                .iter()
                .filter(|s| s.class_name.trim() == class_name.trim())
                .cloned()
                .collect()
        })
    }
}
