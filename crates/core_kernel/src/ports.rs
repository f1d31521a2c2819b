//! Ports and Adapters Infrastructure
//!
//! The fee ledger never talks to a database directly. Each data source the
//! ledger needs (fee structure catalog, payment ledger, class roster) is a
//! port trait defined in the domain crate; adapters in `infra_db` (or the
//! in-memory store in `test_utils`) implement them.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │           FeeAccountService (domain)          │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  FeeStructureCatalog / PaymentLedgerSource /  │
//! │  StudentRoster  (port traits, domain_fees)    │
//! └──────────────────────────────────────────────┘
//!              ▲                      ▲
//!   ┌──────────┴─────────┐  ┌─────────┴────────┐
//!   │ PostgresFeeAdapter │  │  InMemoryFeeStore │
//!   │     (infra_db)     │  │   (test_utils)    │
//!   └────────────────────┘  └──────────────────┘
//! ```


use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a fee data source
#[derive(Debug, Error)]
pub enum PortError {
    /// No record with that key
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// The store could not be reached
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The store is up but refusing work (pool exhausted, maintenance)
    #[error("{service} is unavailable")]
    ServiceUnavailable { service: String },

    /// A stored record has a shape the adapter cannot read
    #[error("Malformed record: {message}")]
    Malformed { message: String },

    /// Anything else
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PortError {
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        PortError::Malformed {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Whether asking again later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. } | PortError::ServiceUnavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker for port traits
///
/// Ports are shared behind `Arc<dyn ...>` across request handlers.
pub trait DomainPort: Send + Sync + 'static {}

/// Whether an adapter can serve reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Unhealthy,
}

/// Outcome of checking one adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    /// Round trip of the check
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    fn checked(adapter_id: impl Into<String>, status: AdapterHealth, latency_ms: u64, message: Option<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }

    pub fn healthy(adapter_id: impl Into<String>, latency_ms: u64) -> Self {
        Self::checked(adapter_id, AdapterHealth::Healthy, latency_ms, None)
    }

    pub fn unhealthy(adapter_id: impl Into<String>, latency_ms: u64, message: impl Into<String>) -> Self {
        Self::checked(adapter_id, AdapterHealth::Unhealthy, latency_ms, Some(message.into()))
    }

    /// Healthy result timed from `elapsed`
    pub fn healthy_after(adapter_id: impl Into<String>, elapsed: Duration) -> Self {
        Self::healthy(adapter_id, elapsed.as_millis() as u64)
    }

    pub fn is_available(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

/// Adapters the readiness endpoint can check
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

/// Request context passed along with a port call, for logs only
#[derive(Debug, Clone, Default)]
pub struct OperationMetadata {
    pub request_id: Option<String>,
    /// Sorted so log lines are stable
    pub context: BTreeMap<String, String>,
}

impl OperationMetadata {
    pub fn for_request(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }
}
