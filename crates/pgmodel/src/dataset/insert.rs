use super::Target;
use crate::error::OrmResult;
use crate::field::Column;
use crate::model::Model;
use crate::qb::{BuiltQuery, InsertQb};
use crate::record::Record;
use crate::row::FromRow;
use tokio_postgres::Transaction;

/// INSERT of one or more records.
///
/// The column list comes from the first non-empty record. Later records are
/// rendered with their own values in column order and are not checked against
/// it, so every record should set the same fields. A single empty record
/// inserts `DEFAULT VALUES`; an empty record among several fails at `build`.
pub struct Insert<'a> {
    model: Model,
    qb: InsertQb,
    tx: Option<&'a Transaction<'a>>,
}

impl Insert<'static> {
    pub(crate) fn new(model: Model, records: Vec<Record>) -> Self {
        let rows: Vec<_> = records.iter().map(Record::to_map).collect();
        let mut qb = InsertQb::new(model.table_name());
        if let Some(first) = rows.iter().find(|row| !row.is_empty()) {
            qb = qb.columns(first.keys().cloned().collect());
        }
        for row in rows {
            qb = qb.values(row.into_values().collect());
        }
        Self {
            model,
            qb,
            tx: None,
        }
    }
}

impl<'a> Insert<'a> {
    pub fn returning(mut self, column: impl Into<Column>) -> Self {
        self.qb = self.qb.returning(&column.into().ident());
        self
    }

    pub fn with_tx<'b>(self, tx: &'b Transaction<'b>) -> Insert<'b> {
        Insert {
            model: self.model,
            qb: self.qb,
            tx: Some(tx),
        }
    }

    pub fn build(&self) -> OrmResult<BuiltQuery> {
        self.qb.validate()?;
        Ok(self.qb.build())
    }

    pub fn to_sql(&self) -> OrmResult<String> {
        Ok(self.build()?.sql)
    }

    fn target(&self) -> Target<'_> {
        Target::new(self.tx, self.model.db())
    }

    pub async fn exec(&self) -> OrmResult<u64> {
        let built = self.build()?;
        self.target().execute(&built).await
    }

    /// Rows produced by RETURNING.
    pub async fn scan<T: FromRow>(&self) -> OrmResult<Vec<T>> {
        let built = self.build()?;
        let rows = self.target().query(&built).await?;
        rows.iter().map(T::from_row).collect()
    }

    pub async fn scan_one<T: FromRow>(&self) -> OrmResult<T> {
        let built = self.build()?;
        let row = self.target().query_one(&built).await?;
        T::from_row(&row)
    }
}

impl std::fmt::Debug for Insert<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Insert")
            .field("table", &self.model.table_name())
            .field("qb", &self.qb)
            .field("in_tx", &self.tx.is_some())
            .finish()
    }
}
