//! SELECT statement draft.

use crate::qb::BuiltQuery;
use crate::qb::expr::{Expr, ExprGroup};
use crate::qb::param::ParamList;

/// SELECT statement with left joins, WHERE, ordering, grouping and paging.
#[derive(Clone, Debug)]
pub struct SelectQb {
    /// Table or FROM expression
    from_expr: String,
    /// SELECT columns (empty renders `*`)
    select_cols: Vec<String>,
    /// JOIN clauses
    join_clauses: Vec<String>,
    /// WHERE conditions
    where_group: ExprGroup,
    /// ORDER BY terms, in call order
    order_clauses: Vec<String>,
    /// GROUP BY terms
    group_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectQb {
    pub fn new(table: &str) -> Self {
        Self {
            from_expr: table.to_string(),
            select_cols: Vec::new(),
            join_clauses: Vec::new(),
            where_group: ExprGroup::new(),
            order_clauses: Vec::new(),
            group_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Append one SELECT column.
    pub fn add_select(mut self, col: &str) -> Self {
        self.select_cols.push(col.to_string());
        self
    }

    /// Add LEFT JOIN.
    pub fn left_join(mut self, table: &str, on: &str) -> Self {
        self.join_clauses.push(format!("LEFT JOIN {} ON {}", table, on));
        self
    }

    /// Add a WHERE expression (AND-ed with the previous ones).
    pub fn and_where(mut self, expr: Expr) -> Self {
        self.where_group.and_expr(expr);
        self
    }

    /// Add ORDER BY column ASC.
    pub fn order_by_asc(mut self, column: &str) -> Self {
        self.order_clauses.push(format!("{} ASC", column));
        self
    }

    /// Add ORDER BY column DESC.
    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.order_clauses.push(format!("{} DESC", column));
        self
    }

    /// Add a GROUP BY term.
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by.push(column.to_string());
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Render into an existing parameter list (used for sub-selects).
    pub fn build_into(&self, params: &mut ParamList) -> String {
        let select_part = if self.select_cols.is_empty() {
            "*".to_string()
        } else {
            self.select_cols.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", select_part, self.from_expr);

        for join in &self.join_clauses {
            sql.push(' ');
            sql.push_str(join);
        }

        let where_sql = self.where_group.build_into(params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clauses.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        sql
    }

    pub fn build(&self) -> BuiltQuery {
        let mut params = ParamList::new();
        let sql = self.build_into(&mut params);
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
    fn test_simple_select() {
        let qb = SelectQb::new("users");
        assert_eq!(qb.to_sql(), "SELECT * FROM users");
    }

    #[test]
    fn test_select_with_join_and_where() {
        let qb = SelectQb::new("users")
            .add_select("users.id AS id")
            .left_join("orders AS users__orders", "users.id = users__orders.user_id")
            .and_where(Expr::compare("users__orders.amount", "=", Param::new(5i32)));
        assert_eq!(
            qb.to_sql(),
            "SELECT users.id AS id FROM users LEFT JOIN orders AS users__orders ON users.id = users__orders.user_id WHERE users__orders.amount = $1"
        );
    }

    #[test]
    fn test_order_appends_in_call_order() {
        let qb = SelectQb::new("users")
            .order_by_desc("users.created_at")
            .order_by_asc("users.id")
            .limit(10)
            .offset(20);
        assert_eq!(
            qb.to_sql(),
            "SELECT * FROM users ORDER BY users.created_at DESC, users.id ASC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_group_by() {
        let qb = SelectQb::new("orders")
            .add_select("orders.user_id AS user_id")
            .add_select("COUNT(orders.id) AS n")
            .group_by("orders.user_id");
        assert_eq!(
            qb.to_sql(),
            "SELECT orders.user_id AS user_id, COUNT(orders.id) AS n FROM orders GROUP BY orders.user_id"
        );
    }

    #[test]
    fn test_build_collects_params() {
        let built = SelectQb::new("users")
            .and_where(Expr::compare("users.id", ">", Param::new(1i64)))
            .and_where(Expr::in_list("users.name", vec![Param::new("a"), Param::new("b")], true))
            .build();
        assert_eq!(
            built.sql,
            "SELECT * FROM users WHERE users.id > $1 AND users.name NOT IN ($2, $3)"
        );
        assert_eq!(built.params.len(), 3);
    }
}
