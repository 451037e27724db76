//! UPDATE statement draft.

use crate::error::{OrmError, OrmResult};
use crate::qb::BuiltQuery;
use crate::qb::expr::{Expr, ExprGroup};
use crate::qb::param::{Param, ParamList};

/// UPDATE with SET pairs, WHERE and optional RETURNING.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    table: String,
    set_fields: Vec<(String, Param)>,
    where_group: ExprGroup,
    returning_cols: Vec<String>,
}

impl UpdateQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            set_fields: Vec::new(),
            where_group: ExprGroup::new(),
            returning_cols: Vec::new(),
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: Param) -> Self {
        self.set_fields.push((column.to_string(), value));
        self
    }

    /// Add a WHERE expression (AND-ed with the previous ones).
    pub fn and_where(mut self, expr: Expr) -> Self {
        self.where_group.and_expr(expr);
        self
    }

    /// Append a RETURNING column.
    pub fn returning(mut self, col: &str) -> Self {
        self.returning_cols.push(col.to_string());
        self
    }

    pub fn validate(&self) -> OrmResult<()> {
        if self.set_fields.is_empty() {
            return Err(OrmError::validation("UpdateQb: SET clause cannot be empty"));
        }
        Ok(())
    }

    fn build_update(&self, params: &mut ParamList) -> String {
        let set_parts: Vec<String> = self
            .set_fields
            .iter()
            .map(|(col, value)| format!("{} = ${}", col, params.push_param(value.clone())))
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, set_parts.join(", "));

        let where_sql = self.where_group.build_into(params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.returning_cols.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning_cols.join(", "));
        }

        sql
    }

    pub fn build(&self) -> BuiltQuery {
        let mut params = ParamList::new();
        let sql = self.build_update(&mut params);
        BuiltQuery::new(sql, params.into_vec())
    }

    /// Get the built SQL string (for debugging).
    pub fn to_sql(&self) -> String {
        self.build().sql
    }
}
