//! Kernel-level errors shared by the service crates

use thiserror::Error;

use crate::money::MoneyError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A setting is missing or out of range; the process should not start
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}

