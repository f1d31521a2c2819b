//! Database error types

use core_kernel::PortError;
use thiserror::Error;

/// Errors raised while reading or writing the fee database
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// A column held a value its record type cannot decode
    #[error("Undecodable row: {0}")]
    Decode(String),

    /// Unique constraint violation, e.g. a second fee structure for a term
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation, e.g. a non-positive payment
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Creates a not found error for an entity and identifier
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Student", "STU-42");
    /// assert!(error.to_string().contains("Student"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }

    /// Maps a PostgreSQL SQLSTATE to an error variant
    ///
    /// See <https://www.postgresql.org/docs/current/errcodes-appendix.html>.
    fn from_sqlstate(code: &str, message: String) -> Self {
        match code {
            "23505" => DatabaseError::DuplicateEntry(message),
            "23503" => DatabaseError::ForeignKeyViolation(message),
            "23514" => DatabaseError::ConstraintViolation(message),
            // Class 08: connection exception
            c if c.starts_with("08") => DatabaseError::ConnectionFailed(message),
            _ => DatabaseError::QueryFailed(message),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::not_found("row", "for query"),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
                DatabaseError::Decode(error.to_string())
            }
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.code() {
                    Some(code) => DatabaseError::from_sqlstate(code.as_ref(), message),
                    None => DatabaseError::QueryFailed(message),
                }
            }
            other => DatabaseError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

/// Adapters speak `PortError` to the domain
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::not_found(entity, id),
            DatabaseError::Decode(msg) => PortError::malformed(msg),
            DatabaseError::ConnectionFailed(msg) => PortError::connection(msg),
            DatabaseError::PoolExhausted => PortError::ServiceUnavailable {
                service: "postgres".to_string(),
            },
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_mapping() {
        assert!(matches!(
            DatabaseError::from_sqlstate("23505", "dup".into()),
            DatabaseError::DuplicateEntry(_)
        ));
        assert!(matches!(
            DatabaseError::from_sqlstate("23514", "check".into()),
            DatabaseError::ConstraintViolation(_)
        ));
        assert!(matches!(
            DatabaseError::from_sqlstate("08006", "gone".into()),
            DatabaseError::ConnectionFailed(_)
        ));
        assert!(matches!(
            DatabaseError::from_sqlstate("42P01", "no table".into()),
            DatabaseError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_row_not_found_is_not_found() {
        let error = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(error.is_not_found());
    }

    #[test]
    fn test_port_error_translation() {
        assert!(PortError::from(DatabaseError::PoolExhausted).is_transient());
        assert!(PortError::from(DatabaseError::ConnectionFailed("refused".into())).is_transient());
        assert!(PortError::from(DatabaseError::not_found("Student", "x")).is_not_found());
        assert!(!PortError::from(DatabaseError::QueryFailed("syntax".into())).is_transient());
        assert!(matches!(
            PortError::from(DatabaseError::Decode("amount_paid: not NUMERIC".into())),
            PortError::Malformed { .. }
        ));
    }

    #[test]
    fn test_decode_errors_are_not_query_failures() {
        let error = DatabaseError::from(sqlx::Error::ColumnNotFound("term".into()));
        assert!(matches!(error, DatabaseError::Decode(_)));
    }
}
