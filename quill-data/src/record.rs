use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::model::ModelDescriptor;
use crate::row::Row;
use crate::value::Value;

/// A mutable model instance: attribute values keyed by attribute name, tied to
/// the descriptor of its model type.
///
/// Reads through [`Record::get`] never touch defaults. Reads through
/// [`Record::value_or_default`] materialize a declared default the first time
/// and keep it on the record.
#[derive(Debug, Clone)]
pub struct Record {
    descriptor: &'static ModelDescriptor,
    values: HashMap<String, Value>,
}

impl Record {
    pub fn new(descriptor: &'static ModelDescriptor) -> Self {
        Self {
            descriptor,
            values: HashMap::new(),
        }
    }

    /// Build a record from a result row, mapping column names back to
    /// attributes and coercing driver values to the declared field kinds.
    /// Columns the model does not declare are kept under their own name.
    pub fn from_row(descriptor: &'static ModelDescriptor, row: Row) -> Self {
        let mut record = Self::new(descriptor);
        for (column, value) in row {
            match descriptor.attr_for_column(&column) {
                Some(attr) => {
                    let value = match descriptor.field(attr) {
                        Some(field) => field.coerce(value),
                        None => value,
                    };
                    record.values.insert(attr.to_string(), value);
                }
                None => {
                    record.values.insert(column, value);
                }
            }
        }
        record
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        self.descriptor
    }

    pub fn with(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(attr, value);
        self
    }

    pub fn set(&mut self, attr: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(attr.into(), value.into());
    }

    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.values.get(attr)
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.values.contains_key(attr)
    }

    /// Current value for `attr`, or its declared default. A default is
    /// produced at most once per record and then stored as the value.
    pub fn value_or_default(&mut self, attr: &str) -> Value {
        if let Some(value) = self.values.get(attr) {
            return value.clone();
        }
        let Some(value) = self
            .descriptor
            .field(attr)
            .and_then(|field| field.default().produce())
        else {
            return Value::Null;
        };
        debug!("using default value for {}: {}", attr, value);
        self.values.insert(attr.to_string(), value.clone());
        value
    }

    /// The primary key value as currently set, without default resolution.
    pub fn primary_key(&self) -> Value {
        self.get(self.descriptor.primary_key_attr())
            .cloned()
            .unwrap_or_default()
    }

    /// Values as a JSON object, declared attributes first.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (attr, _) in self.descriptor.mappings() {
            if let Some(value) = self.values.get(attr) {
                map.serialize_entry(attr, value)?;
            }
        }
        for (attr, value) in &self.values {
            if self.descriptor.field(attr).is_none() {
                map.serialize_entry(attr, value)?;
            }
        }
        map.end()
    }
}
