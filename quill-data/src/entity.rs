use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DataError, SchemaError};
use crate::model::ModelDescriptor;
use crate::record::Record;
use crate::value::Value;

/// A typed model backed by a registered [`ModelDescriptor`].
///
/// Conversion to and from [`Record`] goes through serde, so the struct's
/// serialized field names must match the descriptor's attribute names.
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// pub struct Tag { pub id: String, pub label: String }
///
/// impl Model for Tag {
///     fn schema() -> Result<&'static ModelDescriptor, SchemaError> {
///         static SCHEMA: SchemaCell = SchemaCell::new();
///         SCHEMA.get_or_register(|| {
///             ModelDescriptor::builder("Tag")
///                 .table("tags")
///                 .field("id", Field::string().primary_key())
///                 .field("label", Field::string())
///                 .build()
///         })
///     }
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    fn schema() -> Result<&'static ModelDescriptor, SchemaError>;

    /// Null attributes are left unset so the record can resolve their defaults.
    fn to_record(&self) -> Result<Record, DataError> {
        let descriptor = Self::schema()?;
        let json = serde_json::to_value(self)?;
        let serde_json::Value::Object(object) = json else {
            return Err(DataError::Decode(format!(
                "{} does not serialize to an object",
                descriptor.name()
            )));
        };
        let mut record = Record::new(descriptor);
        for (attr, _) in descriptor.mappings() {
            if let Some(value) = object.get(attr) {
                let value = Value::from_json(value);
                if !value.is_null() {
                    record.set(attr, value);
                }
            }
        }
        Ok(record)
    }

    fn from_record(record: &Record) -> Result<Self, DataError> {
        Ok(serde_json::from_value(record.to_json())?)
    }
}
