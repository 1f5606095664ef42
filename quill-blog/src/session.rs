use std::sync::Arc;

use quill_core::session::{Identity, SessionResolver};
use quill_data_sqlx::Repository;
use quill_security::{SessionCodec, SessionError};
use tracing::{error, info};

use crate::models::User;

impl Identity for User {
    fn sub(&self) -> &str {
        &self.email
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Resolves the `awesession` cookie to a signed-in [`User`] with the
/// password masked.
pub struct BlogSessions {
    codec: Arc<SessionCodec>,
    users: Repository<User>,
}

impl BlogSessions {
    pub fn new(codec: Arc<SessionCodec>, users: Repository<User>) -> Self {
        Self { codec, users }
    }
}

impl SessionResolver for BlogSessions {
    type User = User;

    fn cookie_name(&self) -> &str {
        self.codec.cookie_name()
    }

    async fn resolve(&self, cookie: &str) -> Option<User> {
        let claim = match self.codec.parse(cookie) {
            Ok(claim) => claim,
            Err(e) => {
                info!(error = %e, "session cookie rejected");
                return None;
            }
        };
        let user = match self.users.find(claim.uid.as_str()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                info!(error = %SessionError::UnknownUser(claim.uid), "session cookie rejected");
                return None;
            }
            Err(e) => {
                error!(error = %e, "session user lookup failed");
                return None;
            }
        };
        if let Err(e) = self.codec.verify(&claim, &user.passwd) {
            info!(error = %e, "session cookie rejected");
            return None;
        }
        Some(user.masked())
    }
}
