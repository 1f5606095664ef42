use std::sync::OnceLock;

use tracing::info;

use crate::error::SchemaError;
use crate::field::{Field, FieldKind};
use crate::query::Dialect;

/// Immutable, registered description of a model type: its table, its ordered
/// attribute→field mappings and the four SQL templates derived from them.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    name: String,
    table: String,
    dialect: Dialect,
    mappings: Vec<(String, Field)>,
    primary_key: usize,
    select_sql: String,
    insert_sql: String,
    update_sql: String,
    delete_sql: String,
}

impl ModelDescriptor {
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            name: name.into(),
            table: None,
            dialect: Dialect::default(),
            mappings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Attribute name of the primary key.
    pub fn primary_key_attr(&self) -> &str {
        &self.mappings[self.primary_key].0
    }

    pub fn primary_key(&self) -> &Field {
        &self.mappings[self.primary_key].1
    }

    /// All mappings in declaration order, primary key included.
    pub fn mappings(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.mappings.iter().map(|(a, f)| (a.as_str(), f))
    }

    /// Non-key mappings in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.mappings
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.primary_key)
            .map(|(_, (a, f))| (a.as_str(), f))
    }

    /// Attribute order used to bind arguments for the insert and update
    /// templates: every non-key attribute, then the primary key.
    pub fn write_order(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields().chain(std::iter::once((
            self.primary_key_attr(),
            self.primary_key(),
        )))
    }

    pub fn field(&self, attr: &str) -> Option<&Field> {
        self.mappings
            .iter()
            .find(|(a, _)| a == attr)
            .map(|(_, f)| f)
    }

    /// Map a result column back to the attribute that declared it.
    pub fn attr_for_column(&self, column: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|(_, f)| f.name() == column)
            .map(|(a, _)| a.as_str())
    }

    pub fn select_sql(&self) -> &str {
        &self.select_sql
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete_sql
    }

    /// `create table if not exists` statement for `dialect`, every column
    /// `not null` and typed by [`Dialect::storage_type`].
    pub fn create_table_sql(&self, dialect: Dialect) -> String {
        let q = |s: &str| dialect.quote(s);
        let columns: Vec<String> = self
            .mappings
            .iter()
            .map(|(_, f)| format!("{} {} not null", q(f.name()), dialect.storage_type(f)))
            .collect();
        format!(
            "create table if not exists {} ({}, primary key ({}))",
            q(&self.table),
            columns.join(", "),
            q(self.primary_key().name())
        )
    }
}

/// Collects field declarations and validates them into a [`ModelDescriptor`].
#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    table: Option<String>,
    dialect: Dialect,
    mappings: Vec<(String, Field)>,
}

impl ModelBuilder {
    /// Table name. Defaults to the model name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn field(mut self, attr: impl Into<String>, field: Field) -> Self {
        self.mappings.push((attr.into(), field));
        self
    }

    pub fn build(self) -> Result<ModelDescriptor, SchemaError> {
        let ModelBuilder {
            name,
            table,
            dialect,
            mut mappings,
        } = self;
        let table = table.unwrap_or_else(|| name.clone());
        info!(model = %name, table = %table, "found model");

        let mut primary_key: Option<usize> = None;
        for i in 0..mappings.len() {
            let (attr, field) = &mut mappings[i];
            field.fill_name(attr);
            info!(model = %name, attribute = %attr, %field, "found mapping");

            let attr = attr.clone();
            if mappings[..i].iter().any(|(a, _)| *a == attr) {
                return Err(SchemaError::DuplicateField {
                    model: name,
                    field: attr,
                });
            }
            let field = &mappings[i].1;
            if !field.is_primary_key() {
                continue;
            }
            if matches!(field.kind(), FieldKind::Boolean | FieldKind::Text) {
                return Err(SchemaError::InvalidPrimaryKey {
                    model: name,
                    field: attr,
                });
            }
            if let Some(first) = primary_key {
                let fields = vec![mappings[first].0.clone(), attr];
                return Err(SchemaError::DuplicatePrimaryKey {
                    model: name,
                    fields,
                });
            }
            primary_key = Some(i);
        }
        let primary_key = primary_key.ok_or_else(|| SchemaError::MissingPrimaryKey {
            model: name.clone(),
        })?;

        let q = |s: &str| dialect.quote(s);
        let pk = q(mappings[primary_key].1.name());
        let others: Vec<String> = mappings
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != primary_key)
            .map(|(_, (_, f))| q(f.name()))
            .collect();
        let quoted_table = q(&table);

        let select_sql = std::iter::once(pk.clone())
            .chain(others.iter().cloned())
            .collect::<Vec<_>>()
            .join(", ");
        let select_sql = format!("select {select_sql} from {quoted_table}");

        let insert_cols = others
            .iter()
            .cloned()
            .chain(std::iter::once(pk.clone()))
            .collect::<Vec<_>>();
        let insert_sql = format!(
            "insert into {quoted_table} ({}) values ({})",
            insert_cols.join(", "),
            vec!["?"; insert_cols.len()].join(", ")
        );

        let assignments = others
            .iter()
            .map(|c| format!("{c}=?"))
            .collect::<Vec<_>>()
            .join(", ");
        let update_sql = format!("update {quoted_table} set {assignments} where {pk}=?");
        let delete_sql = format!("delete from {quoted_table} where {pk}=?");

        Ok(ModelDescriptor {
            name,
            table,
            dialect,
            mappings,
            primary_key,
            select_sql,
            insert_sql,
            update_sql,
            delete_sql,
        })
    }
}

/// Process-wide registration slot for one model type.
///
/// ```ignore
/// static SCHEMA: SchemaCell = SchemaCell::new();
/// SCHEMA.get_or_register(|| ModelDescriptor::builder("User").table("users")...build())
/// ```
pub struct SchemaCell(OnceLock<Result<ModelDescriptor, SchemaError>>);

impl SchemaCell {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Run registration on first use; later calls observe the same outcome.
    pub fn get_or_register(
        &'static self,
        register: impl FnOnce() -> Result<ModelDescriptor, SchemaError>,
    ) -> Result<&'static ModelDescriptor, SchemaError> {
        self.0.get_or_init(register).as_ref().map_err(Clone::clone)
    }
}

impl Default for SchemaCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> ModelBuilder {
        ModelDescriptor::builder("User")
            .table("users")
            .field("id", Field::string().primary_key().ddl("varchar(50)"))
            .field("email", Field::string().ddl("varchar(50)"))
            .field("admin", Field::boolean())
            .field("created_at", Field::float())
    }

    #[test]
    fn templates_follow_declaration_order() {
        let d = users().build().unwrap();
        assert_eq!(
            d.select_sql(),
            "select `id`, `email`, `admin`, `created_at` from `users`"
        );
        assert_eq!(
            d.insert_sql(),
            "insert into `users` (`email`, `admin`, `created_at`, `id`) values (?, ?, ?, ?)"
        );
        assert_eq!(
            d.update_sql(),
            "update `users` set `email`=?, `admin`=?, `created_at`=? where `id`=?"
        );
        assert_eq!(d.delete_sql(), "delete from `users` where `id`=?");
        assert_eq!(d.primary_key_attr(), "id");
        let order: Vec<_> = d.write_order().map(|(a, _)| a).collect();
        assert_eq!(order, ["email", "admin", "created_at", "id"]);
    }

    #[test]
    fn create_table_uses_declared_types() {
        let d = users().build().unwrap();
        assert_eq!(
            d.create_table_sql(Dialect::MySql),
            "create table if not exists `users` (`id` varchar(50) not null, `email` varchar(50) not null, \
             `admin` smallint not null, `created_at` real not null, primary key (`id`))"
        );
        assert!(d
            .create_table_sql(Dialect::Sqlite)
            .contains("`admin` integer not null"));
    }

    #[test]
    fn missing_primary_key_fails() {
        let err = ModelDescriptor::builder("Note")
            .field("title", Field::string())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingPrimaryKey {
                model: "Note".into()
            }
        );
    }

    #[test]
    fn two_primary_keys_fail() {
        let err = users()
            .field("other", Field::string().primary_key())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicatePrimaryKey { .. }));
    }

    #[test]
    fn boolean_and_text_cannot_be_keys() {
        let err = ModelDescriptor::builder("Flag")
            .field("on", Field::boolean().primary_key())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPrimaryKey { .. }));
    }

    #[test]
    fn duplicate_attribute_fails() {
        let err = users().field("email", Field::text()).build().unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                model: "User".into(),
                field: "email".into()
            }
        );
    }

    #[test]
    fn table_defaults_to_model_name_and_columns_can_be_renamed() {
        let d = ModelDescriptor::builder("Tag")
            .field("id", Field::integer().primary_key())
            .field("label", Field::string().named("tag_label"))
            .build()
            .unwrap();
        assert_eq!(d.table(), "Tag");
        assert_eq!(d.select_sql(), "select `id`, `tag_label` from `Tag`");
        assert_eq!(d.attr_for_column("tag_label"), Some("label"));
    }

    #[test]
    fn schema_cell_registers_once() {
        static CELL: SchemaCell = SchemaCell::new();
        let first = CELL.get_or_register(|| users().build()).unwrap();
        let second = CELL
            .get_or_register(|| panic!("registered twice"))
            .unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
