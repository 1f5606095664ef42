/// Errors raised while registering a model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    MissingPrimaryKey { model: String },
    DuplicatePrimaryKey { model: String, fields: Vec<String> },
    DuplicateField { model: String, field: String },
    InvalidPrimaryKey { model: String, field: String },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::MissingPrimaryKey { model } => {
                write!(f, "Primary key not found for model {model}")
            }
            SchemaError::DuplicatePrimaryKey { model, fields } => write!(
                f,
                "Duplicate primary key for model {model}: {}",
                fields.join(", ")
            ),
            SchemaError::DuplicateField { model, field } => {
                write!(f, "Duplicate field `{field}` on model {model}")
            }
            SchemaError::InvalidPrimaryKey { model, field } => write!(
                f,
                "Field `{field}` on model {model} cannot be a primary key"
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    Database(Box<dyn std::error::Error + Send + Sync>),
    Schema(SchemaError),
    /// A row or record could not be turned into the requested type.
    Decode(String),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `quill-data-sqlx`) to wrap driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Schema(err) => write!(f, "Schema error: {err}"),
            DataError::Decode(msg) => write!(f, "Decode error: {msg}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            DataError::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for DataError {
    fn from(err: SchemaError) -> Self {
        DataError::Schema(err)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Decode(err.to_string())
    }
}

impl From<DataError> for quill_core::HttpError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(msg) => quill_core::HttpError::NotFound(msg),
            other => quill_core::HttpError::Internal(other.to_string()),
        }
    }
}

impl From<DataError> for quill_core::HandlerError {
    fn from(err: DataError) -> Self {
        quill_core::HandlerError::Http(err.into())
    }
}
