//! DELETE statement draft.

use crate::qb::BuiltQuery;
use crate::qb::expr::{Expr, ExprGroup};
use crate::qb::param::ParamList;

/// DELETE with WHERE and optional RETURNING.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    table: String,
    where_group: ExprGroup,
    returning_cols: Vec<String>,
    /// Whether to allow DELETE without WHERE
    allow_delete_all: bool,
}

impl DeleteQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_group: ExprGroup::new(),
            returning_cols: Vec::new(),
            allow_delete_all: false,
        }
    }

    /// Allow DELETE without WHERE conditions.
    ///
    /// By default, DELETE without WHERE generates `WHERE 1=0` (no-op).
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
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

    fn build_delete(&self, params: &mut ParamList) -> String {
        let mut sql = format!("DELETE FROM {}", self.table);

        if self.where_group.is_empty() {
            if !self.allow_delete_all {
                sql.push_str(" WHERE 1=0");
            }
        } else {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_group.build_into(params));
        }

        if !self.returning_cols.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning_cols.join(", "));
        }

        sql
    }

    pub fn build(&self) -> BuiltQuery {
        let mut params = ParamList::new();
        let sql = self.build_delete(&mut params);
        BuiltQuery::new(sql, params.into_vec())
    }

    /// Get the built SQL string (for debugging).
    pub fn to_sql(&self) -> String {
        self.build().sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::param::Param;

    #[test]
    fn test_delete_with_where() {
        let qb = DeleteQb::new("users")
            .and_where(Expr::compare("users.id", "=", Param::new(1i64)))
            .returning("users.id");
        assert_eq!(
            qb.to_sql(),
            "DELETE FROM users WHERE users.id = $1 RETURNING users.id"
        );
    }

    #[test]
    fn test_delete_without_where_is_noop() {
        assert_eq!(DeleteQb::new("users").to_sql(), "DELETE FROM users WHERE 1=0");
    }

    #[test]
    fn test_delete_all_when_allowed() {
        let qb = DeleteQb::new("users").allow_delete_all(true);
        assert_eq!(qb.to_sql(), "DELETE FROM users");
    }
}
