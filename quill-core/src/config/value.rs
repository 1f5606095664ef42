use super::ConfigError;

/// One leaf of the flattened configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    List(Vec<ConfigValue>),
}

impl ConfigValue {
    pub(crate) fn from_yaml(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value as Y;
        match value {
            Y::Null => ConfigValue::Null,
            Y::Bool(b) => ConfigValue::Bool(*b),
            Y::Number(n) => n
                .as_i64()
                .map(ConfigValue::Integer)
                .or_else(|| n.as_f64().map(ConfigValue::Float))
                .unwrap_or_else(|| ConfigValue::String(n.to_string())),
            Y::String(s) => ConfigValue::String(s.clone()),
            Y::Sequence(items) => ConfigValue::List(items.iter().map(Self::from_yaml).collect()),
            other => ConfigValue::String(format!("{other:?}")),
        }
    }

    /// Scalars as text; `Null` and lists have none.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ConfigValue::String(s) => Some(s.clone()),
            ConfigValue::Integer(i) => Some(i.to_string()),
            ConfigValue::Float(f) => Some(f.to_string()),
            ConfigValue::Bool(b) => Some(b.to_string()),
            ConfigValue::Null | ConfigValue::List(_) => None,
        }
    }

    /// Integers, or strings that parse as one (environment overrides are strings).
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Booleans, or `true/false`, `1/0`, `yes/no` in any case.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Typed read of a [`ConfigValue`] stored under `key`.
pub trait FromConfigValue: Sized {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError>;
}

fn convert<T>(converted: Option<T>, key: &str, expected: &'static str) -> Result<T, ConfigError> {
    converted.ok_or_else(|| ConfigError::TypeMismatch {
        key: key.to_string(),
        expected,
    })
}

impl FromConfigValue for String {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        convert(value.as_text(), key, "String")
    }
}

impl FromConfigValue for f64 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        convert(value.as_float(), key, "f64")
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        convert(value.as_flag(), key, "bool")
    }
}

macro_rules! integer_from_config {
    ($($ty:ty),+) => {$(
        impl FromConfigValue for $ty {
            fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
                let narrowed = value.as_integer().and_then(|i| <$ty>::try_from(i).ok());
                convert(narrowed, key, stringify!($ty))
            }
        }
    )+};
}

integer_from_config!(i64, i32, u16, u32, u64, usize);

/// `Null` reads as `None`.
impl<T: FromConfigValue> FromConfigValue for Option<T> {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        if matches!(value, ConfigValue::Null) {
            return Ok(None);
        }
        T::from_config_value(value, key).map(Some)
    }
}

/// A scalar reads as a one-item list.
impl<T: FromConfigValue> FromConfigValue for Vec<T> {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        let ConfigValue::List(items) = value else {
            return T::from_config_value(value, key).map(|v| vec![v]);
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::from_config_value(item, &format!("{key}.{i}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_strings_convert() {
        let port = ConfigValue::String(" 3307 ".into());
        assert_eq!(u16::from_config_value(&port, "db.port").unwrap(), 3307);
        assert!(bool::from_config_value(&ConfigValue::String("YES".into()), "k").unwrap());
    }

    #[test]
    fn narrowing_overflow_is_a_mismatch() {
        let big = ConfigValue::Integer(70_000);
        assert!(matches!(
            u16::from_config_value(&big, "server.port"),
            Err(ConfigError::TypeMismatch { expected: "u16", .. })
        ));
    }
}
