pub mod binder;
pub mod builder;
pub mod config;
pub mod error;
pub mod http;
pub mod layers;
pub mod middleware;
pub mod prelude;
pub mod reply;
pub mod session;
pub mod state;
pub mod template;
pub mod types;

pub use binder::{Args, Handler, Param, RequestContext, Routes, Signature, SignatureError};
pub use builder::AppBuilder;
pub use config::{
    ConfigError, ConfigProperties, ConfigValue, DefaultSecretResolver, FromConfigValue,
    QuillConfig, SecretResolver, ServerConfig,
};
pub use error::{ApiError, HandlerError, HttpError};
pub use layers::{catch_panic_layer, default_trace, init_tracing};
pub use middleware::{AuthSettings, ParsedBody};
pub use reply::{PendingTemplate, Reply};
pub use session::{CurrentUser, Identity, NoIdentity, NoSessions, SessionResolver};
pub use state::QuillState;
pub use template::{FileTemplates, TemplateRenderer};
pub use types::{ApiResult, ReplyResult};
