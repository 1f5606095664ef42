use std::borrow::Cow;

use crate::value::Value;

/// The storage class of a field, used to coerce raw driver values back into
/// the shape the model declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Float,
    Text,
}

/// Default for a field that has not been set on a record.
#[derive(Clone)]
pub enum FieldDefault {
    None,
    Value(Value),
    /// Evaluated lazily, once per record, on first default-resolving read.
    Compute(fn() -> Value),
}

impl FieldDefault {
    pub fn is_none(&self) -> bool {
        matches!(self, FieldDefault::None)
    }

    /// Produce the default value, if any.
    pub fn produce(&self) -> Option<Value> {
        match self {
            FieldDefault::None => None,
            FieldDefault::Value(v) => Some(v.clone()),
            FieldDefault::Compute(f) => Some(f()),
        }
    }
}

impl std::fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldDefault::None => write!(f, "None"),
            FieldDefault::Value(v) => write!(f, "Value({v:?})"),
            FieldDefault::Compute(_) => write!(f, "Compute(<fn>)"),
        }
    }
}

/// One declared column mapping.
///
/// ```ignore
/// Field::string().primary_key().ddl("varchar(50)").default_fn(next_id)
/// Field::boolean()
/// Field::float().default_fn(now)
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    column_type: Cow<'static, str>,
    primary_key: bool,
    default: FieldDefault,
    kind: FieldKind,
}

impl Field {
    fn new(kind: FieldKind, column_type: &'static str, default: FieldDefault) -> Self {
        Self {
            name: String::new(),
            column_type: Cow::Borrowed(column_type),
            primary_key: false,
            default,
            kind,
        }
    }

    /// `varchar(100)`, no default.
    pub fn string() -> Self {
        Self::new(FieldKind::String, "varchar(100)", FieldDefault::None)
    }

    /// `boolean`, defaults to `false`. Cannot be a primary key.
    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean, "boolean", FieldDefault::Value(Value::Bool(false)))
    }

    /// `bigint`, defaults to `0`.
    pub fn integer() -> Self {
        Self::new(FieldKind::Integer, "bigint", FieldDefault::Value(Value::Int(0)))
    }

    /// `real`, defaults to `0.0`.
    pub fn float() -> Self {
        Self::new(FieldKind::Float, "real", FieldDefault::Value(Value::Float(0.0)))
    }

    /// `text`, no default. Cannot be a primary key.
    pub fn text() -> Self {
        Self::new(FieldKind::Text, "text", FieldDefault::None)
    }

    /// Explicit column name. When left empty the declaring attribute name is used.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Override the column DDL type (e.g. `varchar(50)`).
    pub fn ddl(mut self, column_type: impl Into<Cow<'static, str>>) -> Self {
        self.column_type = column_type.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    pub fn default_fn(mut self, producer: fn() -> Value) -> Self {
        self.default = FieldDefault::Compute(producer);
        self
    }

    pub fn no_default(mut self) -> Self {
        self.default = FieldDefault::None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &str {
        &self.column_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default(&self) -> &FieldDefault {
        &self.default
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub(crate) fn fill_name(&mut self, attr: &str) {
        if self.name.is_empty() {
            self.name = attr.to_string();
        }
    }

    /// Coerce a raw driver value into this field's declared shape.
    ///
    /// Drivers report booleans as integers and `real` columns as integers when
    /// the stored value has no fractional part.
    pub fn coerce(&self, value: Value) -> Value {
        match (self.kind, value) {
            (_, Value::Null) => Value::Null,
            (FieldKind::Boolean, Value::Int(i)) => Value::Bool(i != 0),
            (FieldKind::Float, Value::Int(i)) => Value::Float(i as f64),
            (FieldKind::Integer, Value::Float(f)) if f.fract() == 0.0 => Value::Int(f as i64),
            (_, v) => v,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{:?}Field {}:{}>", self.kind, self.column_type, self.name)
    }
}
