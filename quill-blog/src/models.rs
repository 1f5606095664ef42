use std::time::{SystemTime, UNIX_EPOCH};

use quill_data::{Field, Model, ModelDescriptor, SchemaCell, SchemaError, Value};
use serde::{Deserialize, Serialize};

/// Stand-in for a password in anything sent to a client.
pub const MASKED_PASSWD: &str = "******";

/// A 50-character id: 15-digit millisecond timestamp, 32 random hex chars, `000`.
pub fn next_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{millis:015}{}000", uuid::Uuid::new_v4().simple())
}

/// Current Unix time in fractional seconds.
pub fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

fn id_default() -> Value {
    Value::from(next_id())
}

fn created_at_default() -> Value {
    Value::Float(now())
}

fn id_field() -> Field {
    Field::string()
        .primary_key()
        .ddl("varchar(50)")
        .default_fn(id_default)
}

fn created_at_field() -> Field {
    Field::float().default_fn(created_at_default)
}

fn unset(t: &f64) -> bool {
    *t == 0.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub email: String,
    pub passwd: String,
    #[serde(default)]
    pub admin: bool,
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "unset")]
    pub created_at: f64,
}

impl User {
    /// A copy safe to hand to clients.
    pub fn masked(&self) -> Self {
        Self {
            passwd: MASKED_PASSWD.into(),
            ..self.clone()
        }
    }
}

impl Model for User {
    fn schema() -> Result<&'static ModelDescriptor, SchemaError> {
        static SCHEMA: SchemaCell = SchemaCell::new();
        SCHEMA.get_or_register(|| {
            ModelDescriptor::builder("User")
                .table("users")
                .field("id", id_field())
                .field("email", Field::string().ddl("varchar(50)"))
                .field("passwd", Field::string().ddl("varchar(50)"))
                .field("admin", Field::boolean())
                .field("name", Field::string().ddl("varchar(50)"))
                .field("image", Field::string().ddl("varchar(500)"))
                .field("created_at", created_at_field())
                .build()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub name: String,
    pub summary: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "unset")]
    pub created_at: f64,
}

impl Model for Blog {
    fn schema() -> Result<&'static ModelDescriptor, SchemaError> {
        static SCHEMA: SchemaCell = SchemaCell::new();
        SCHEMA.get_or_register(|| {
            ModelDescriptor::builder("Blog")
                .table("blogs")
                .field("id", id_field())
                .field("user_id", Field::string().ddl("varchar(50)"))
                .field("user_name", Field::string().ddl("varchar(50)"))
                .field("user_image", Field::string().ddl("varchar(500)"))
                .field("name", Field::string().ddl("varchar(50)"))
                .field("summary", Field::string().ddl("varchar(200)"))
                .field("content", Field::text())
                .field("created_at", created_at_field())
                .build()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub blog_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "unset")]
    pub created_at: f64,
}

impl Model for Comment {
    fn schema() -> Result<&'static ModelDescriptor, SchemaError> {
        static SCHEMA: SchemaCell = SchemaCell::new();
        SCHEMA.get_or_register(|| {
            ModelDescriptor::builder("Comment")
                .table("comments")
                .field("id", id_field())
                .field("blog_id", Field::string().ddl("varchar(50)"))
                .field("user_id", Field::string().ddl("varchar(50)"))
                .field("user_name", Field::string().ddl("varchar(50)"))
                .field("user_image", Field::string().ddl("varchar(500)"))
                .field("content", Field::text())
                .field("created_at", created_at_field())
                .build()
        })
    }
}
