//! Column cells bound to a model.

use crate::condition::{Condition, Op, Operand};
use crate::dataset::Select;
use crate::error::OrmResult;
use crate::expr::Expression;
use crate::ident::alias_sql;
use crate::model::{Joiner, Model};
use crate::row::RowExt;
use serde::{Serialize, Serializer};
use std::fmt;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

/// A column of a bound model, with an optional output alias.
#[derive(Clone, PartialEq)]
pub struct Column {
    model: Model,
    name: String,
    alias: Option<String>,
}

impl Column {
    pub(crate) fn new(model: Model, name: String) -> Self {
        Self {
            model,
            name,
            alias: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Explicit output alias, if one was set.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Copy of this column selected under `alias`.
    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    /// Qualified identifier: `users.name`, or `users__orders.amount` for a
    /// nested model.
    pub fn ident(&self) -> String {
        format!("{}.{}", self.model.node().reference(), self.name)
    }

    /// Identifier used by UPDATE statements, where nested tables are not
    /// joined: a nested column resolves to the parent's local key.
    pub fn update_ident(&self) -> String {
        match self.model.joiner() {
            Some(joiner) => format!("{}.{}", joiner.parent_table(), joiner.local_key()),
            None => self.ident(),
        }
    }

    /// Column a record value is written to: the column itself on the root, the
    /// parent's local key for nested models.
    pub fn record_key(&self) -> &str {
        match self.model.joiner() {
            Some(joiner) => joiner.local_key(),
            None => &self.name,
        }
    }

    /// Name the value comes back under in a result row.
    pub fn output_key(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None if self.model.prefix().is_empty() => self.name.clone(),
            None => format!("{}.{}", self.model.prefix(), self.name),
        }
    }

    /// `ident AS output_key`
    pub fn selector(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.ident(), alias_sql(alias)),
            None => format!("{} AS {}", self.ident(), self.model.selector_alias(&self.name)),
        }
    }

    /// Joiners needed to reference this column, outermost first.
    pub fn joiners(&self) -> Vec<Joiner> {
        self.model.joiner_chain()
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("ident", &self.ident())
            .field("alias", &self.alias)
            .finish()
    }
}

/// A typed column cell: the column it is bound to plus a value slot that
/// `scan` fills from result rows.
pub struct Field<T> {
    value: Option<T>,
    column: Column,
}

impl<T> Field<T> {
    pub(crate) fn new(column: Column) -> Self {
        Self {
            value: None,
            column,
        }
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn name(&self) -> &str {
        self.column.name()
    }

    pub fn ident(&self) -> String {
        self.column.ident()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// The column selected under `alias`.
    pub fn alias(&self, alias: impl Into<String>) -> Column {
        self.column.with_alias(alias)
    }

    pub fn expr(&self) -> Expression {
        Expression::Field(self.column.clone())
    }

    fn condition(&self, op: Op, operand: Operand) -> Condition {
        Condition::new(self.column.clone(), op.name(), operand)
    }

    pub fn is_null(&self) -> Condition {
        self.condition(Op::IsNull, Operand::None)
    }

    pub fn is_not_null(&self) -> Condition {
        self.condition(Op::IsNotNull, Operand::None)
    }

    pub fn like(&self, pattern: impl Into<String>) -> Condition {
        self.condition(Op::Like, Operand::value(pattern.into()))
    }

    pub fn not_like(&self, pattern: impl Into<String>) -> Condition {
        self.condition(Op::NotLike, Operand::value(pattern.into()))
    }

    pub fn regex(&self, pattern: impl Into<String>) -> Condition {
        self.condition(Op::Regex, Operand::value(pattern.into()))
    }

    pub fn regex_i(&self, pattern: impl Into<String>) -> Condition {
        self.condition(Op::RegexI, Operand::value(pattern.into()))
    }

    pub fn not_regex(&self, pattern: impl Into<String>) -> Condition {
        self.condition(Op::NotRegex, Operand::value(pattern.into()))
    }

    pub fn not_regex_i(&self, pattern: impl Into<String>) -> Condition {
        self.condition(Op::NotRegexI, Operand::value(pattern.into()))
    }

    pub fn eq_select(&self, query: Select<'_>) -> Condition {
        self.condition(Op::Eq, Operand::subquery(query))
    }

    /// Rendered as `!= (subquery)`.
    pub fn not_eq_select(&self, query: Select<'_>) -> Condition {
        self.condition(Op::NotEq, Operand::subquery(query))
    }

    pub fn in_select(&self, query: Select<'_>) -> Condition {
        self.condition(Op::In, Operand::subquery(query))
    }

    /// Rendered as `!= (subquery)`, not `NOT IN`.
    pub fn not_in_select(&self, query: Select<'_>) -> Condition {
        self.condition(Op::NotIn, Operand::subquery(query))
    }
}

impl<T> Field<T>
where
    T: ToSql + Send + Sync + 'static,
{
    pub fn eq(&self, value: impl Into<T>) -> Condition {
        self.condition(Op::Eq, Operand::value(value.into()))
    }

    pub fn not_eq(&self, value: impl Into<T>) -> Condition {
        self.condition(Op::NotEq, Operand::value(value.into()))
    }

    pub fn lt(&self, value: impl Into<T>) -> Condition {
        self.condition(Op::Lt, Operand::value(value.into()))
    }

    pub fn lte(&self, value: impl Into<T>) -> Condition {
        self.condition(Op::Lte, Operand::value(value.into()))
    }

    pub fn gt(&self, value: impl Into<T>) -> Condition {
        self.condition(Op::Gt, Operand::value(value.into()))
    }

    pub fn gte(&self, value: impl Into<T>) -> Condition {
        self.condition(Op::Gte, Operand::value(value.into()))
    }

    pub fn in_list(&self, values: impl IntoIterator<Item = T>) -> Condition {
        self.condition(Op::In, Operand::list(values))
    }

    pub fn not_in(&self, values: impl IntoIterator<Item = T>) -> Condition {
        self.condition(Op::NotIn, Operand::list(values))
    }
}

impl<T> Field<T>
where
    T: for<'a> FromSql<'a>,
{
    /// Copy of this field holding the value read from `row`. Rows that do not
    /// carry the column leave the value unset; SQL NULL is also unset.
    pub fn scan(&self, row: &Row) -> OrmResult<Self> {
        let key = self.column.output_key();
        let value = if row.has_column(&key) {
            row.try_get_column::<Option<T>>(&key)?
        } else {
            None
        };
        Ok(Self {
            value,
            column: self.column.clone(),
        })
    }
}

impl<T: Clone> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            column: self.column.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("column", &self.column.ident())
            .field("value", &self.value)
            .finish()
    }
}

/// Serializes the value alone; an unset field is `null`.
impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<T> From<&Field<T>> for Column {
    fn from(field: &Field<T>) -> Self {
        field.column.clone()
    }
}

impl From<&Column> for Column {
    fn from(column: &Column) -> Self {
        column.clone()
    }
}
