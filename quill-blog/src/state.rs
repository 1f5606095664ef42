use std::sync::Arc;

use quill_data::Model;
use quill_data_sqlx::{Database, Repository, SqlxResult};
use quill_security::SessionCodec;
use tracing::info;

use crate::models::{Blog, Comment, User};
use crate::session::BlogSessions;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub users: Repository<User>,
    pub blogs: Repository<Blog>,
    pub comments: Repository<Comment>,
    pub sessions: Arc<SessionCodec>,
}

impl AppState {
    pub fn new(db: Database, sessions: SessionCodec) -> Self {
        Self {
            users: Repository::new(db.clone()),
            blogs: Repository::new(db.clone()),
            comments: Repository::new(db.clone()),
            sessions: Arc::new(sessions),
            db,
        }
    }

    /// Create the `users`, `blogs` and `comments` tables when missing.
    pub async fn create_tables(&self) -> SqlxResult<()> {
        for descriptor in [User::schema()?, Blog::schema()?, Comment::schema()?] {
            info!(table = %descriptor.table(), "ensuring table");
            self.db
                .execute(&descriptor.create_table_sql(self.db.dialect()), &[], true)
                .await?;
        }
        Ok(())
    }

    /// The session resolver for the auth middleware.
    pub fn session_resolver(&self) -> BlogSessions {
        BlogSessions::new(self.sessions.clone(), self.users.clone())
    }
}
