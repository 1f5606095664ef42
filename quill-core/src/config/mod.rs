//! Layered application settings.
//!
//! Later layers win, leaf by leaf:
//!
//! | Layer | Source |
//! |-------|--------|
//! | base | `application.yaml` |
//! | profile | `application-{profile}.yaml` |
//! | dotenv | `.env`, then `.env.{profile}`, never replacing variables already set |
//! | placeholders | `${VAR}`, `${env:VAR}`, `${file:path}` inside string values |
//! | environment | every variable, `DB_HOST` read as `db.host` |
//!
//! The profile comes from `QUILL_PROFILE` when set, else from the caller.

mod loader;
pub mod secrets;
pub mod typed;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

pub use secrets::{DefaultSecretResolver, SecretResolver};
pub use typed::{ConfigProperties, ServerConfig};
pub use value::{ConfigValue, FromConfigValue};

#[derive(Debug)]
pub enum ConfigError {
    NotFound(String),
    TypeMismatch { key: String, expected: &'static str },
    /// Unreadable file, bad YAML or an unresolvable placeholder.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "missing configuration key `{key}`"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "configuration key `{key}` is not a valid {expected}")
            }
            ConfigError::Load(msg) => write!(f, "cannot load configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Map an environment variable name onto a configuration key.
pub fn env_key(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', ".")
}

/// Flattened settings: dot-separated keys (`db.host`, `session.secret`) to leaves.
#[derive(Debug, Clone)]
pub struct QuillConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl QuillConfig {
    /// Load every layer from the working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    pub fn load_from(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        Self::load_from_with_resolver(dir, profile, &DefaultSecretResolver)
    }

    pub fn load_from_with_resolver(
        dir: &Path,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let profile = std::env::var("QUILL_PROFILE")
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| profile.to_string());
        let mut config = Self {
            values: HashMap::new(),
            profile,
        };

        for file in ["application.yaml".to_string(), format!("application-{}.yaml", config.profile)] {
            loader::load_yaml_file(&dir.join(file), &mut config.values)?;
        }
        for file in [".env".to_string(), format!(".env.{}", config.profile)] {
            // a missing dotenv file is fine
            let _ = dotenvy::from_path(dir.join(file));
        }
        config.resolve_placeholders(resolver)?;
        for (name, value) in std::env::vars() {
            config.values.insert(env_key(&name), ConfigValue::String(value));
        }

        info!(profile = %config.profile, keys = config.values.len(), "configuration loaded");
        Ok(config)
    }

    /// Settings from a single YAML document, without files or environment.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(Self {
            values,
            profile: profile.to_string(),
        })
    }

    /// Lay the leaves of another YAML document over these settings.
    pub fn overlay_yaml_str(mut self, yaml: &str) -> Result<Self, ConfigError> {
        loader::load_yaml_str(yaml, &mut self.values)?;
        Ok(self)
    }

    pub fn empty() -> Self {
        Self {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        match self.values.get(key) {
            Some(value) => V::from_config_value(value, key),
            None => Err(ConfigError::NotFound(key.to_string())),
        }
    }

    /// Like [`QuillConfig::get`], but a missing or unconvertible key yields `default`.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn section<C: ConfigProperties>(&self) -> Result<C, ConfigError> {
        C::from_config(self)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    fn resolve_placeholders(&mut self, resolver: &dyn SecretResolver) -> Result<(), ConfigError> {
        for value in self.values.values_mut() {
            if let ConfigValue::String(s) = value {
                if s.contains("${") {
                    *s = secrets::resolve_placeholders(s, resolver)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_names_become_dotted_keys() {
        assert_eq!(env_key("DB_HOST"), "db.host");
        assert_eq!(env_key("SESSION_SECRET"), "session.secret");
    }
}
