use super::{Target, check};
use crate::condition::{Conditional, Scope};
use crate::error::{ConditionError, OrmResult};
use crate::field::Column;
use crate::model::Model;
use crate::qb::{BuiltQuery, DeleteQb};
use crate::row::FromRow;
use tokio_postgres::Transaction;

/// DELETE from a model's table.
///
/// Without a filter the statement renders `WHERE 1=0` and removes nothing;
/// call [`Delete::allow_delete_all`] to drop that guard.
pub struct Delete<'a> {
    model: Model,
    qb: DeleteQb,
    error: Option<ConditionError>,
    tx: Option<&'a Transaction<'a>>,
}

impl Delete<'static> {
    pub(crate) fn new(model: Model) -> Self {
        let qb = DeleteQb::new(model.table_name());
        Self {
            model,
            qb,
            error: None,
            tx: None,
        }
    }
}

impl<'a> Delete<'a> {
    pub fn filter(mut self, condition: impl Into<Conditional>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match condition.into().evaluate(Scope::Query) {
            Ok(expr) => self.qb = self.qb.and_where(expr),
            Err(err) => self.error = Some(err),
        }
        self
    }

    pub fn allow_delete_all(mut self) -> Self {
        self.qb = self.qb.allow_delete_all(true);
        self
    }

    pub fn returning(mut self, column: impl Into<Column>) -> Self {
        self.qb = self.qb.returning(&column.into().ident());
        self
    }

    pub fn with_tx<'b>(self, tx: &'b Transaction<'b>) -> Delete<'b> {
        Delete {
            model: self.model,
            qb: self.qb,
            error: self.error,
            tx: Some(tx),
        }
    }

    pub fn build(&self) -> OrmResult<BuiltQuery> {
        check(&self.error)?;
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

impl std::fmt::Debug for Delete<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delete")
            .field("table", &self.model.table_name())
            .field("qb", &self.qb)
            .field("error", &self.error)
            .field("in_tx", &self.tx.is_some())
            .finish()
    }
}
