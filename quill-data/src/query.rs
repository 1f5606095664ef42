//! SQL statement assembly for the model query surface.
//!
//! Statements are written with `?` placeholders, native to both supported
//! drivers.

use std::borrow::Cow;

use crate::field::{Field, FieldKind};
use crate::model::ModelDescriptor;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// MySQL: backtick quoting, booleans stored as `smallint`.
    #[default]
    MySql,
    /// SQLite: backtick quoting, booleans stored as `integer`.
    Sqlite,
}

impl Dialect {
    /// Guess the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("sqlite") {
            Dialect::Sqlite
        } else {
            Dialect::MySql
        }
    }

    /// Quote an identifier, doubling any embedded backtick.
    pub fn quote(self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    /// Column type used in DDL for `field`.
    ///
    /// The generic driver decodes neither SQLite `boolean` nor MySQL
    /// `tinyint(1)`, so a boolean field keeping its stock `boolean` DDL is
    /// stored as a plain integer column. An explicit `Field::ddl` is kept.
    pub fn storage_type(self, field: &Field) -> Cow<'_, str> {
        let declared = field.column_type();
        if field.kind() != FieldKind::Boolean || !declared.eq_ignore_ascii_case("boolean") {
            return Cow::Owned(declared.to_string());
        }
        match self {
            Dialect::MySql => Cow::Borrowed("smallint"),
            Dialect::Sqlite => Cow::Borrowed("integer"),
        }
    }
}

/// Row cap for [`FindAll`]: a plain count or an `(offset, count)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    Range(u64, u64),
}

impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Limit::Count(count)
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Limit::Range(offset, count)
    }
}

/// Options for `find_all`: optional where clause with its args, ordering and limit.
///
/// ```ignore
/// FindAll::new()
///     .filter("email=?", ["a@b.com"])
///     .order_by("created_at desc")
///     .limit((10, 5))
/// ```
#[derive(Debug, Clone, Default)]
pub struct FindAll {
    pub where_clause: Option<String>,
    pub args: Vec<Value>,
    pub order_by: Option<String>,
    pub limit: Option<Limit>,
}

impl FindAll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter<I, V>(mut self, clause: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.where_clause = Some(clause.into());
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = Some(expr.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Build the select statement and its arguments for `descriptor`.
    pub fn build(&self, descriptor: &ModelDescriptor) -> (String, Vec<Value>) {
        let mut sql = vec![descriptor.select_sql().to_string()];
        let mut args = self.args.clone();
        if let Some(clause) = non_blank(&self.where_clause) {
            sql.push("where".into());
            sql.push(clause.to_string());
        }
        if let Some(order) = non_blank(&self.order_by) {
            sql.push("order by".into());
            sql.push(order.to_string());
        }
        match self.limit {
            Some(Limit::Count(count)) => {
                sql.push("limit ?".into());
                args.push(Value::from(count));
            }
            Some(Limit::Range(offset, count)) => {
                sql.push("limit ?, ?".into());
                args.push(Value::from(offset));
                args.push(Value::from(count));
            }
            None => {}
        }
        (sql.join(" "), args)
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// `select <expr> _num_ from <table> [where ...]`
pub fn build_find_number(
    descriptor: &ModelDescriptor,
    select_field: &str,
    where_clause: Option<&str>,
) -> String {
    let mut sql = format!(
        "select {select_field} _num_ from {}",
        descriptor.dialect().quote(descriptor.table())
    );
    if let Some(clause) = where_clause.map(str::trim).filter(|c| !c.is_empty()) {
        sql.push_str(" where ");
        sql.push_str(clause);
    }
    sql
}

/// `<select template> where <pk>=?`
pub fn build_find(descriptor: &ModelDescriptor) -> String {
    format!(
        "{} where {}=?",
        descriptor.select_sql(),
        descriptor.dialect().quote(descriptor.primary_key().name())
    )
}

/// Interpolate arguments into a statement for log output only.
pub fn render_for_log(sql: &str, args: &[Value]) -> String {
    if args.is_empty() {
        return sql.to_string();
    }
    let mut out = String::with_capacity(sql.len() + args.len() * 8);
    let mut iter = args.iter();
    for c in sql.chars() {
        if c == '?' {
            match iter.next() {
                Some(arg) => out.push_str(&arg.to_string()),
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blogs() -> ModelDescriptor {
        ModelDescriptor::builder("Blog")
            .table("blogs")
            .field("id", Field::string().primary_key())
            .field("name", Field::string())
            .field("created_at", Field::float())
            .build()
            .unwrap()
    }

    #[test]
    fn find_all_without_options_is_the_select_template() {
        let (sql, args) = FindAll::new().build(&blogs());
        assert_eq!(sql, "select `id`, `name`, `created_at` from `blogs`");
        assert!(args.is_empty());
    }

    #[test]
    fn find_all_with_range_limit() {
        let (sql, args) = FindAll::new()
            .filter("name=?", ["rust"])
            .order_by("created_at desc")
            .limit((10, 5))
            .build(&blogs());
        assert_eq!(
            sql,
            "select `id`, `name`, `created_at` from `blogs` where name=? order by created_at desc limit ?, ?"
        );
        assert_eq!(
            args,
            vec![Value::from("rust"), Value::Int(10), Value::Int(5)]
        );
    }

    #[test]
    fn find_all_with_count_limit_and_no_order() {
        let (sql, args) = FindAll::new().limit(3u64).build(&blogs());
        assert!(sql.ends_with("from `blogs` limit ?"));
        assert_eq!(args, vec![Value::Int(3)]);
    }

    #[test]
    fn find_number_and_find() {
        let d = blogs();
        assert_eq!(
            build_find_number(&d, "count(id)", None),
            "select count(id) _num_ from `blogs`"
        );
        assert_eq!(
            build_find_number(&d, "count(id)", Some("name=?")),
            "select count(id) _num_ from `blogs` where name=?"
        );
        assert_eq!(
            build_find(&d),
            "select `id`, `name`, `created_at` from `blogs` where `id`=?"
        );
    }

    #[test]
    fn quoting_escapes_embedded_backticks() {
        assert_eq!(Dialect::MySql.quote("order"), "`order`");
        assert_eq!(Dialect::Sqlite.quote("we`ird"), "`we``ird`");
    }

    #[test]
    fn booleans_are_stored_as_integers() {
        let flag = Field::boolean();
        assert_eq!(Dialect::Sqlite.storage_type(&flag), "integer");
        assert_eq!(Dialect::MySql.storage_type(&flag), "smallint");
        let custom = Field::boolean().ddl("tinyint");
        assert_eq!(Dialect::Sqlite.storage_type(&custom), "tinyint");
        assert_eq!(Dialect::Sqlite.storage_type(&Field::float()), "real");
    }

    #[test]
    fn log_rendering_interpolates_args() {
        let rendered = render_for_log(
            "select * from t where a=? and b=?",
            &[Value::from("x"), Value::Int(2)],
        );
        assert_eq!(rendered, "select * from t where a=x and b=2");
    }

    #[test]
    fn dialect_from_url() {
        assert_eq!(Dialect::from_url("mysql://u@h/db"), Dialect::MySql);
        assert_eq!(Dialect::from_url("sqlite::memory:"), Dialect::Sqlite);
        assert_eq!(Dialect::from_url("sqlite://blog.db?mode=rwc"), Dialect::Sqlite);
    }
}
