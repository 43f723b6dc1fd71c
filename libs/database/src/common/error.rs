/// Unified error type for connection management, transactions and repository calls.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Errors raised by SeaORM / the PostgreSQL driver
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Misuse of the transaction lifecycle (nested begin, commit without begin, ...)
    /// or a commit rejected by the store.
    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Database error: {0}")]
    Generic(String),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_err_converts_into_postgres_variant() {
        let err: DatabaseError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, DatabaseError::Postgres(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_transaction_error_message() {
        let err = DatabaseError::Transaction("no open transaction".to_string());
        assert_eq!(err.to_string(), "Transaction error: no open transaction");
    }
}
