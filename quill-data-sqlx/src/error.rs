use quill_data::DataError;

/// Results of pool and repository calls.
pub type SqlxResult<T> = Result<T, DataError>;

/// `sqlx::Error` → [`DataError`]; both types are foreign here, so this stands
/// in for a `From` impl.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match self {
            sqlx::Error::RowNotFound => DataError::NotFound("no matching row".into()),
            e @ (sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)) => DataError::Decode(e.to_string()),
            e => DataError::database(e),
        }
    }
}
