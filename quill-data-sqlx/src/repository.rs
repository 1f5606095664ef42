use std::marker::PhantomData;

use quill_data::query::{build_find, build_find_number};
use quill_data::{DataError, FindAll, Model, ModelDescriptor, Record, Value};
use tracing::warn;

use crate::database::Database;
use crate::error::SqlxResult;

/// Affected-row report for a write. A mismatch is logged, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub expected: u64,
    pub affected: u64,
}

impl WriteOutcome {
    fn single(affected: u64) -> Self {
        Self {
            expected: 1,
            affected,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.expected == self.affected
    }
}

/// Model-level queries for `M` over a shared [`Database`].
///
/// ```ignore
/// let blogs = Repository::<Blog>::new(db.clone());
/// let recent = blogs.find_all(&FindAll::new().order_by("created_at desc").limit(5u64)).await?;
/// ```
pub struct Repository<M> {
    db: Database,
    _marker: PhantomData<fn() -> M>,
}

impl<M> Clone for Repository<M> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M: Model> Repository<M> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn descriptor(&self) -> SqlxResult<&'static ModelDescriptor> {
        Ok(M::schema()?)
    }

    pub async fn find_all(&self, options: &FindAll) -> SqlxResult<Vec<M>> {
        let descriptor = self.descriptor()?;
        let (sql, args) = options.build(descriptor);
        let rows = self.db.select(&sql, &args, None).await?;
        rows.into_iter()
            .map(|row| M::from_record(&Record::from_row(descriptor, row)))
            .collect()
    }

    /// `select <select_field> _num_ from <table> [where ...]`, returning the
    /// first row's `_num_` or `None` when no row comes back.
    pub async fn find_number(
        &self,
        select_field: &str,
        where_clause: Option<&str>,
        args: &[Value],
    ) -> SqlxResult<Option<Value>> {
        let sql = build_find_number(self.descriptor()?, select_field, where_clause);
        let rows = self.db.select(&sql, args, Some(1)).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.get("_num_").cloned()))
    }

    /// `count(<pk>)` over the optional where clause.
    ///
    /// An aggregate without `group by` always yields one row, so a missing or
    /// non-integer `_num_` is a decode error rather than zero.
    pub async fn count(&self, where_clause: Option<&str>, args: &[Value]) -> SqlxResult<u64> {
        let descriptor = self.descriptor()?;
        let expr = format!(
            "count({})",
            descriptor.dialect().quote(descriptor.primary_key().name())
        );
        let num = self.find_number(&expr, where_clause, args).await?;
        num.as_ref()
            .and_then(Value::as_i64)
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| {
                DataError::Decode(format!(
                    "count over `{}` returned {num:?} instead of a row count",
                    descriptor.table()
                ))
            })
    }

    pub async fn find(&self, pk: impl Into<Value>) -> SqlxResult<Option<M>> {
        let descriptor = self.descriptor()?;
        let rows = self
            .db
            .select(&build_find(descriptor), &[pk.into()], Some(1))
            .await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(M::from_record(&Record::from_row(descriptor, row))?)),
            None => Ok(None),
        }
    }

    /// Insert `entity`. Unset fields take their declared defaults, and the
    /// materialized values are written back into `entity`.
    pub async fn save(&self, entity: &mut M) -> SqlxResult<WriteOutcome> {
        let mut record = entity.to_record()?;
        let outcome = self.save_record(&mut record).await?;
        *entity = M::from_record(&record)?;
        Ok(outcome)
    }

    pub async fn save_record(&self, record: &mut Record) -> SqlxResult<WriteOutcome> {
        let descriptor = self.descriptor()?;
        let attrs: Vec<&str> = descriptor.write_order().map(|(attr, _)| attr).collect();
        let args: Vec<Value> = attrs
            .into_iter()
            .map(|attr| record.value_or_default(attr))
            .collect();
        let affected = self
            .db
            .execute(descriptor.insert_sql(), &args, self.db.autocommit())
            .await?;
        let outcome = WriteOutcome::single(affected);
        if !outcome.is_exact() {
            warn!(
                table = descriptor.table(),
                affected,
                "insert affected an unexpected number of rows"
            );
        }
        Ok(outcome)
    }

    /// Write the current values of every field. No defaults are applied.
    pub async fn update(&self, entity: &M) -> SqlxResult<WriteOutcome> {
        self.update_record(&entity.to_record()?).await
    }

    pub async fn update_record(&self, record: &Record) -> SqlxResult<WriteOutcome> {
        let descriptor = self.descriptor()?;
        let args: Vec<Value> = descriptor
            .write_order()
            .map(|(attr, _)| record.get(attr).cloned().unwrap_or_default())
            .collect();
        let affected = self
            .db
            .execute(descriptor.update_sql(), &args, self.db.autocommit())
            .await?;
        let outcome = WriteOutcome::single(affected);
        if !outcome.is_exact() {
            warn!(
                table = descriptor.table(),
                affected,
                "update by primary key affected an unexpected number of rows"
            );
        }
        Ok(outcome)
    }

    pub async fn remove(&self, entity: &M) -> SqlxResult<WriteOutcome> {
        self.remove_record(&entity.to_record()?).await
    }

    pub async fn remove_record(&self, record: &Record) -> SqlxResult<WriteOutcome> {
        let descriptor = self.descriptor()?;
        let affected = self
            .db
            .execute(
                descriptor.delete_sql(),
                &[record.primary_key()],
                self.db.autocommit(),
            )
            .await?;
        let outcome = WriteOutcome::single(affected);
        if !outcome.is_exact() {
            warn!(
                table = descriptor.table(),
                affected,
                "delete by primary key affected an unexpected number of rows"
            );
        }
        Ok(outcome)
    }
}
