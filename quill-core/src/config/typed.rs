use super::{ConfigError, QuillConfig};

/// A strongly-typed configuration section read from keys under [`prefix`](Self::prefix).
///
/// ```ignore
/// impl ConfigProperties for SessionConfig {
///     fn prefix() -> &'static str { "session" }
///     fn from_config(config: &QuillConfig) -> Result<Self, ConfigError> {
///         Ok(Self { secret: config.get("session.secret")? })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"db"`).
    fn prefix() -> &'static str;

    /// Construct from a loaded [`QuillConfig`].
    fn from_config(config: &QuillConfig) -> Result<Self, ConfigError>;

    /// Absolute key for a property of this section.
    fn key(name: &str) -> String {
        format!("{}.{name}", Self::prefix())
    }
}

/// HTTP listener and template settings (`server.*`).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the page templates.
    pub templates: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 9000,
            templates: "templates".into(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ConfigProperties for ServerConfig {
    fn prefix() -> &'static str {
        "server"
    }

    fn from_config(config: &QuillConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: config.get_or(&Self::key("host"), defaults.host),
            port: config.get_or(&Self::key("port"), defaults.port),
            templates: config.get_or(&Self::key("templates"), defaults.templates),
        })
    }
}
