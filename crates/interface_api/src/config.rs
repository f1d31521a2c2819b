//! API configuration
//!
//! Read from `API_*` environment variables (a `.env` file is loaded first by
//! the server binary), with defaults for everything.

use serde::{Deserialize, Deserializer};

use core_kernel::{CoreError, Currency};
use domain_fees::BalancePolicy;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Currency all fee amounts are read in
    #[serde(deserialize_with = "currency_code")]
    pub currency: Currency,
    /// Default treatment of payments for unbilled terms
    pub balance_policy: BalancePolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/school_fees".to_string(),
            log_level: "info".to_string(),
            currency: Currency::default(),
            balance_policy: BalancePolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    ///
    /// `API_PORT=9090`, `API_CURRENCY=ugx`,
    /// `API_BALANCE_POLICY=include_unbilled_payments` and so on; unset keys
    /// keep their defaults.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = ApiConfig::default();

        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_url", defaults.database_url)?
            .set_default("log_level", defaults.log_level)?
            .set_default("currency", defaults.currency.code())?
            .set_default("balance_policy", "billed_terms_only")?
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Checks values the type system cannot
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.host.trim().is_empty() {
            return Err(CoreError::configuration("API_HOST must not be empty"));
        }
        if self.port == 0 {
            return Err(CoreError::configuration("API_PORT must be non-zero"));
        }
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(CoreError::configuration(
                "API_DATABASE_URL must be a postgres:// connection string",
            ));
        }
        Ok(())
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn currency_code<'de, D>(deserializer: D) -> Result<Currency, D::Error>
where
    D: Deserializer<'de>,
{
    let code = String::deserialize(deserializer)?;
    code.parse().map_err(serde::de::Error::custom)
}
