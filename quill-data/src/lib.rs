pub mod entity;
pub mod error;
pub mod field;
pub mod model;
pub mod page;
pub mod query;
pub mod record;
pub mod row;
pub mod value;

pub use entity::Model;
pub use error::{DataError, SchemaError};
pub use field::{Field, FieldDefault, FieldKind};
pub use model::{ModelBuilder, ModelDescriptor, SchemaCell};
pub use page::Page;
pub use query::{Dialect, FindAll, Limit};
pub use record::Record;
pub use row::Row;
pub use value::Value;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        DataError, Field, FindAll, Model, ModelDescriptor, Page, Record, SchemaCell, SchemaError,
        Value,
    };
}
