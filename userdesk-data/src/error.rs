use userdesk_core::HttpError;

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    Conflict(String),
    Database(Box<dyn std::error::Error + Send + Sync>),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<DataError> for HttpError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(msg) => HttpError::NotFound(msg),
            DataError::Conflict(msg) => HttpError::Conflict(msg),
            DataError::Database(e) => {
                tracing::error!(error = %e, "database failure");
                HttpError::Internal("Internal server error".into())
            }
        }
    }
}

/// Extension trait for converting `sqlx::Error` into `DataError`.
///
/// Unique-constraint violations become `DataError::Conflict` carrying the
/// caller's message, so the HTTP layer answers 409 instead of 500.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;

    fn into_data_error_or_conflict(self, conflict: impl FnOnce() -> String) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match &self {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".into()),
            _ => DataError::database(self),
        }
    }

    fn into_data_error_or_conflict(self, conflict: impl FnOnce() -> String) -> DataError {
        match &self {
            sqlx::Error::Database(db) if db.is_unique_violation() => DataError::Conflict(conflict()),
            _ => self.into_data_error(),
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        err.into_data_error()
    }
}

/// Convenience alias for data-layer results using `DataError`.
pub type DataResult<T> = Result<T, DataError>;
