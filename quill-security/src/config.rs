use quill_core::config::{ConfigError, ConfigProperties, QuillConfig};

/// Session cookie settings (`session.*`).
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Secret mixed into every cookie signature.
    pub secret: String,

    /// Cookie name (default: `awesession`).
    pub cookie_name: String,

    /// Cookie lifetime in seconds (default: 86400).
    pub max_age: u64,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: "awesession".into(),
            max_age: 86400,
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_max_age(mut self, secs: u64) -> Self {
        self.max_age = secs;
        self
    }
}

impl ConfigProperties for SessionConfig {
    fn prefix() -> &'static str {
        "session"
    }

    fn from_config(config: &QuillConfig) -> Result<Self, ConfigError> {
        let d = Self::new("");
        Ok(Self {
            secret: config.get(&Self::key("secret"))?,
            cookie_name: config.get_or(&Self::key("cookie_name"), d.cookie_name),
            max_age: config.get_or(&Self::key("max_age"), d.max_age),
        })
    }
}
