use super::{Target, check};
use crate::condition::{Conditional, Scope, SubQuery};
use crate::error::{ConditionError, OrmResult};
use crate::expr::Expression;
use crate::model::{Joiner, Model};
use crate::qb::{BuiltQuery, SelectQb};
use crate::row::FromRow;
use crate::table::Table;
use std::collections::HashSet;
use tokio_postgres::Transaction;

/// SELECT over a model and whatever nested models its expressions reach.
///
/// Every joiner is added as a LEFT JOIN at most once, the first time an
/// expression, condition or ordering needs it.
pub struct Select<'a> {
    model: Model,
    qb: SelectQb,
    joined: HashSet<String>,
    error: Option<ConditionError>,
    tx: Option<&'a Transaction<'a>>,
}

impl Select<'static> {
    pub(crate) fn new(model: Model, exprs: Vec<Expression>) -> Self {
        let qb = SelectQb::new(&model.from_expr());
        // A nested model is its own FROM target, so its ancestors are never joined.
        let joined = model
            .joiner_chain()
            .iter()
            .map(|j| j.name().to_string())
            .collect();
        let mut select = Self {
            model,
            qb,
            joined,
            error: None,
            tx: None,
        };

        if exprs.is_empty() {
            for selector in select.model.all_selectors() {
                select.qb = select.qb.add_select(&selector);
            }
            for joiner in select.model.descendant_joiners() {
                select = select.join(&joiner);
            }
        } else {
            for expr in exprs {
                for selector in expr.selectors() {
                    select.qb = select.qb.add_select(&selector);
                }
                select = select.join_all(expr.joiners());
            }
        }
        select
    }
}

impl<'a> Select<'a> {
    fn join(mut self, joiner: &Joiner) -> Self {
        if self.joined.insert(joiner.name().to_string()) {
            tracing::trace!(target: "pgmodel.sql", joiner = joiner.name(), "left join added");
            self.qb = self.qb.left_join(&joiner.table_expr(), &joiner.on());
        }
        self
    }

    fn join_all(mut self, joiners: Vec<Joiner>) -> Self {
        for joiner in &joiners {
            self = self.join(joiner);
        }
        self
    }

    /// AND a condition onto WHERE, joining whatever it references.
    pub fn filter(mut self, condition: impl Into<Conditional>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let condition = condition.into();
        match condition.evaluate(Scope::Query) {
            Ok(expr) => {
                self = self.join_all(condition.joiners());
                self.qb = self.qb.and_where(expr);
            }
            Err(err) => self.error = Some(err),
        }
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.qb = self.qb.limit(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.qb = self.qb.offset(n);
        self
    }

    pub fn order_asc(mut self, expr: impl Into<Expression>) -> Self {
        let expr = expr.into();
        self = self.join_all(expr.joiners());
        self.qb = self.qb.order_by_asc(&expr.ident());
        self
    }

    pub fn order_desc(mut self, expr: impl Into<Expression>) -> Self {
        let expr = expr.into();
        self = self.join_all(expr.joiners());
        self.qb = self.qb.order_by_desc(&expr.ident());
        self
    }

    pub fn group_by(mut self, expr: impl Into<Expression>) -> Self {
        let expr = expr.into();
        self = self.join_all(expr.joiners());
        self.qb = self.qb.group_by(&expr.ident());
        self
    }

    /// Run on `tx` instead of a pooled connection.
    pub fn with_tx<'b>(self, tx: &'b Transaction<'b>) -> Select<'b> {
        Select {
            model: self.model,
            qb: self.qb,
            joined: self.joined,
            error: self.error,
            tx: Some(tx),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub(crate) fn into_subquery(self) -> SubQuery {
        SubQuery {
            qb: self.qb,
            error: self.error,
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

    /// Run the statement and discard rows; returns the row count.
    pub async fn exec(&self) -> OrmResult<u64> {
        let built = self.build()?;
        self.target().execute(&built).await
    }

    pub async fn scan<T: FromRow>(&self) -> OrmResult<Vec<T>> {
        let built = self.build()?;
        let rows = self.target().query(&built).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Exactly one row, mapped with [`FromRow`].
    pub async fn scan_one<T: FromRow>(&self) -> OrmResult<T> {
        let built = self.build()?;
        let row = self.target().query_one(&built).await?;
        T::from_row(&row)
    }

    /// Rows read back into copies of a bound record.
    pub async fn load<T: Table>(&self, handle: &T) -> OrmResult<Vec<T>> {
        let built = self.build()?;
        let rows = self.target().query(&built).await?;
        rows.iter().map(|row| handle.scan_row(row)).collect()
    }

    pub async fn load_one<T: Table>(&self, handle: &T) -> OrmResult<T> {
        let built = self.build()?;
        let row = self.target().query_one(&built).await?;
        handle.scan_row(&row)
    }
}

impl std::fmt::Debug for Select<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("table", &self.model.table_name())
            .field("qb", &self.qb)
            .field("error", &self.error)
            .field("in_tx", &self.tx.is_some())
            .finish()
    }
}
