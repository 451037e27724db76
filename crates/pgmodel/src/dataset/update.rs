use super::{Target, check};
use crate::condition::{Conditional, Scope};
use crate::error::{ConditionError, OrmResult};
use crate::field::Column;
use crate::model::Model;
use crate::qb::{BuiltQuery, UpdateQb};
use crate::record::Record;
use crate::row::FromRow;
use tokio_postgres::Transaction;

/// UPDATE of a model's table.
///
/// Nothing is joined. Conditions on nested fields compare the parent's local
/// key (`users.id` for a filter on `user.orders.id`), and SET entries for
/// nested fields write that same key.
pub struct Update<'a> {
    model: Model,
    qb: UpdateQb,
    error: Option<ConditionError>,
    tx: Option<&'a Transaction<'a>>,
}

impl Update<'static> {
    pub(crate) fn new(model: Model, record: Record) -> Self {
        let mut qb = UpdateQb::new(model.table_name());
        for (column, value) in record.to_map() {
            qb = qb.set(&column, value);
        }
        Self {
            model,
            qb,
            error: None,
            tx: None,
        }
    }
}

impl<'a> Update<'a> {
    pub fn filter(mut self, condition: impl Into<Conditional>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match condition.into().evaluate(Scope::Update) {
            Ok(expr) => self.qb = self.qb.and_where(expr),
            Err(err) => self.error = Some(err),
        }
        self
    }

    pub fn returning(mut self, column: impl Into<Column>) -> Self {
        self.qb = self.qb.returning(&column.into().ident());
        self
    }

    pub fn with_tx<'b>(self, tx: &'b Transaction<'b>) -> Update<'b> {
        Update {
            model: self.model,
            qb: self.qb,
            error: self.error,
            tx: Some(tx),
        }
    }

    /// Fails on a recorded condition error or an empty SET clause.
    pub fn build(&self) -> OrmResult<BuiltQuery> {
        check(&self.error)?;
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

impl std::fmt::Debug for Update<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Update")
            .field("table", &self.model.table_name())
            .field("qb", &self.qb)
            .field("error", &self.error)
            .field("in_tx", &self.tx.is_some())
            .finish()
    }
}
