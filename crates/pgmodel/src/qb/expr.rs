//! Expression nodes for WHERE clauses.
//!
//! `Expr::build()` writes `$n` placeholders directly: indices come from the
//! shared [`ParamList`], so nested sub-selects number their parameters in
//! statement order without any string rewriting.

use crate::qb::param::{Param, ParamList};
use crate::qb::select::SelectQb;

/// Expression node for building WHERE clauses.
#[derive(Clone, Debug)]
pub enum Expr {
    /// AND group: all conditions must be true.
    And(Vec<Expr>),

    /// OR group: at least one condition must be true.
    Or(Vec<Expr>),

    /// Simple comparison: column op $n
    Compare {
        column: String,
        op: &'static str,
        value: Param,
    },

    /// NULL check: column IS NULL or column IS NOT NULL
    NullCheck { column: String, is_null: bool },

    /// IN list: column IN ($1, $2, ...) or column NOT IN (...)
    InList {
        column: String,
        values: Vec<Param>,
        negated: bool,
    },

    /// Comparison against a sub-select: column op (SELECT ...)
    Subquery {
        column: String,
        op: &'static str,
        query: Box<SelectQb>,
    },

    /// Raw SQL fragment without parameters.
    Raw(String),

    /// Always true (used for empty NOT IN lists).
    True,

    /// Always false (used for empty IN lists).
    False,
}

impl Expr {
    pub fn compare(column: impl Into<String>, op: &'static str, value: Param) -> Self {
        Expr::Compare {
            column: column.into(),
            op,
            value,
        }
    }

    pub fn null_check(column: impl Into<String>, is_null: bool) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null,
        }
    }

    /// IN / NOT IN over a literal list. Empty lists collapse to constants.
    pub fn in_list(column: impl Into<String>, values: Vec<Param>, negated: bool) -> Self {
        if values.is_empty() {
            return if negated { Expr::True } else { Expr::False };
        }
        Expr::InList {
            column: column.into(),
            values,
            negated,
        }
    }

    pub fn subquery(column: impl Into<String>, op: &'static str, query: SelectQb) -> Self {
        Expr::Subquery {
            column: column.into(),
            op,
            query: Box::new(query),
        }
    }

    /// Check if this expression is empty (contains no conditions).
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().all(|e| e.is_empty()),
            _ => false,
        }
    }

    /// Build the SQL fragment, pushing values into `params`.
    pub fn build(&self, params: &mut ParamList) -> String {
        match self {
            Expr::And(exprs) => build_group(exprs, " AND ", params),
            Expr::Or(exprs) => build_group(exprs, " OR ", params),
            Expr::Compare { column, op, value } => {
                let idx = params.push_param(value.clone());
                format!("{} {} ${}", column, op, idx)
            }
            Expr::NullCheck { column, is_null } => {
                if *is_null {
                    format!("{} IS NULL", column)
                } else {
                    format!("{} IS NOT NULL", column)
                }
            }
            Expr::InList {
                column,
                values,
                negated,
            } => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| format!("${}", params.push_param(v.clone())))
                    .collect();
                let op = if *negated { "NOT IN" } else { "IN" };
                format!("{} {} ({})", column, op, placeholders.join(", "))
            }
            Expr::Subquery { column, op, query } => {
                let sub = query.build_into(params);
                format!("{} {} ({})", column, op, sub)
            }
            Expr::Raw(sql) => sql.clone(),
            Expr::True => "1=1".to_string(),
            Expr::False => "1=0".to_string(),
        }
    }
}

fn build_group(exprs: &[Expr], joiner: &str, params: &mut ParamList) -> String {
    let parts: Vec<String> = exprs
        .iter()
        .filter(|e| !e.is_empty())
        .map(|e| {
            let sql = e.build(params);
            // Nested groups keep their own precedence
            if matches!(e, Expr::And(_) | Expr::Or(_)) {
                format!("({})", sql)
            } else {
                sql
            }
        })
        .collect();
    parts.join(joiner)
}

/// The AND-ed conditions of one WHERE clause.
#[derive(Clone, Debug, Default)]
pub struct ExprGroup {
    exprs: Vec<Expr>,
}

impl ExprGroup {
    pub fn new() -> Self {
        Self { exprs: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.iter().all(|e| e.is_empty())
    }

    /// Add an expression to be ANDed.
    pub fn and_expr(&mut self, expr: Expr) {
        self.exprs.push(expr);
    }

    /// Build the clause body (without the `WHERE` keyword).
    pub fn build_into(&self, params: &mut ParamList) -> String {
        build_group(&self.exprs, " AND ", params)
    }
}
