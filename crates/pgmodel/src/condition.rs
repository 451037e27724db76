//! Filter conditions over model fields.
//!
//! A [`Condition`] stores its operator by name and is only checked when a
//! builder evaluates it, so an unknown operator surfaces as a builder error on
//! the terminal call rather than at construction.

use crate::dataset::Select;
use crate::error::ConditionError;
use crate::expr::Literal;
use crate::field::Column;
use crate::model::Joiner;
use crate::qb::{Expr, Param, SelectQb};
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::ToSql;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    In,
    NotIn,
    Eq,
    NotEq,
    Like,
    NotLike,
    Regex,
    RegexI,
    NotRegex,
    NotRegexI,
    Lt,
    Lte,
    Gt,
    Gte,
    IsNotNull,
    IsNull,
}

impl Op {
    pub const ALL: [Op; 16] = [
        Op::In,
        Op::NotIn,
        Op::Eq,
        Op::NotEq,
        Op::Like,
        Op::NotLike,
        Op::Regex,
        Op::RegexI,
        Op::NotRegex,
        Op::NotRegexI,
        Op::Lt,
        Op::Lte,
        Op::Gt,
        Op::Gte,
        Op::IsNotNull,
        Op::IsNull,
    ];

    /// Name used in [`Condition::new`].
    pub fn name(self) -> &'static str {
        match self {
            Op::In => "in",
            Op::NotIn => "notIn",
            Op::Eq => "eq",
            Op::NotEq => "notEq",
            Op::Like => "like",
            Op::NotLike => "notLike",
            Op::Regex => "regex",
            Op::RegexI => "regexI",
            Op::NotRegex => "notRegex",
            Op::NotRegexI => "notRegexI",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::IsNotNull => "isNotNull",
            Op::IsNull => "isNull",
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Op::In => "IN",
            Op::NotIn => "NOT IN",
            Op::Eq => "=",
            Op::NotEq => "!=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::Regex => "~",
            Op::RegexI => "~*",
            Op::NotRegex => "!~",
            Op::NotRegexI => "!~*",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::IsNotNull => "IS NOT NULL",
            Op::IsNull => "IS NULL",
        }
    }

    fn is_membership(self) -> bool {
        matches!(self, Op::In | Op::NotIn)
    }
}

impl FromStr for Op {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Op::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| ConditionError::UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which identifier rule a condition renders its column with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// SELECT and DELETE: the qualified column.
    Query,
    /// UPDATE: nested columns resolve to the parent's local key.
    Update,
}

/// A rendered sub-select carried by a condition, together with any error the
/// sub-select recorded while it was built.
#[derive(Clone, Debug)]
pub struct SubQuery {
    pub(crate) qb: SelectQb,
    pub(crate) error: Option<ConditionError>,
}

/// Right-hand side of a condition.
#[derive(Clone, Debug)]
pub enum Operand {
    None,
    Value(Param),
    List(Vec<Param>),
    Subquery(SubQuery),
}

impl Operand {
    pub fn value<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Self::Value(Param::new(value))
    }

    pub fn list<T, I>(values: I) -> Self
    where
        T: ToSql + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        Self::List(values.into_iter().map(Param::new).collect())
    }

    pub fn subquery(query: Select<'_>) -> Self {
        Self::Subquery(query.into_subquery())
    }
}

/// `column <op> operand`
#[derive(Clone, Debug)]
pub struct Condition {
    column: Column,
    op: String,
    operand: Operand,
}

impl Condition {
    /// Build a condition from an operator name. The name is resolved when the
    /// condition is evaluated.
    pub fn new(column: impl Into<Column>, op: impl Into<String>, operand: Operand) -> Self {
        Self {
            column: column.into(),
            op: op.into(),
            operand,
        }
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn joiners(&self) -> Vec<Joiner> {
        self.column.joiners()
    }

    pub fn evaluate(&self, scope: Scope) -> Result<Expr, ConditionError> {
        let op: Op = self.op.parse()?;
        let column = match scope {
            Scope::Query => self.column.ident(),
            Scope::Update => self.column.update_ident(),
        };

        match (op, &self.operand) {
            (Op::IsNull, _) => Ok(Expr::null_check(column, true)),
            (Op::IsNotNull, _) => Ok(Expr::null_check(column, false)),
            (_, Operand::Subquery(sub)) => {
                if let Some(err) = &sub.error {
                    return Err(err.clone());
                }
                let sql_op = match op {
                    Op::In => "IN",
                    Op::Eq => "=",
                    Op::NotIn | Op::NotEq => "!=",
                    other => other.sql(),
                };
                Ok(Expr::subquery(column, sql_op, sub.qb.clone()))
            }
            (_, Operand::List(values)) if op.is_membership() => {
                Ok(Expr::in_list(column, values.clone(), op == Op::NotIn))
            }
            (_, Operand::Value(value)) if op.is_membership() => {
                Ok(Expr::in_list(column, vec![value.clone()], op == Op::NotIn))
            }
            (_, Operand::Value(value)) => Ok(Expr::compare(column, op.sql(), value.clone())),
            (_, Operand::List(_)) => Err(ConditionError::InvalidOperand {
                op: op.name().to_string(),
                expected: "a single value or a sub-select",
            }),
            (_, Operand::None) => Err(ConditionError::InvalidOperand {
                op: op.name().to_string(),
                expected: if op.is_membership() {
                    "a list, a value or a sub-select"
                } else {
                    "a single value or a sub-select"
                },
            }),
        }
    }
}

/// Disjunction of conditions.
#[derive(Clone, Debug)]
pub struct OrCondition {
    conditions: Vec<Condition>,
}

impl OrCondition {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn joiners(&self) -> Vec<Joiner> {
        self.conditions.iter().flat_map(Condition::joiners).collect()
    }

    /// Fails on the first child that fails.
    pub fn evaluate(&self, scope: Scope) -> Result<Expr, ConditionError> {
        let exprs = self
            .conditions
            .iter()
            .map(|c| c.evaluate(scope))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Expr::Or(exprs))
    }
}

/// `a OR b OR ...`
pub fn or(conditions: impl IntoIterator<Item = Condition>) -> OrCondition {
    OrCondition {
        conditions: conditions.into_iter().collect(),
    }
}

/// Anything a builder's `filter` accepts.
#[derive(Clone, Debug)]
pub enum Conditional {
    Condition(Condition),
    Or(OrCondition),
    /// Raw predicate; its `?` placeholders take column identifiers.
    Literal(Literal),
}

impl Conditional {
    pub fn joiners(&self) -> Vec<Joiner> {
        match self {
            Self::Condition(c) => c.joiners(),
            Self::Or(c) => c.joiners(),
            Self::Literal(l) => l.joiners(),
        }
    }

    pub fn evaluate(&self, scope: Scope) -> Result<Expr, ConditionError> {
        match self {
            Self::Condition(c) => c.evaluate(scope),
            Self::Or(c) => c.evaluate(scope),
            Self::Literal(l) => Ok(Expr::Raw(l.render_in(scope))),
        }
    }
}

impl From<Condition> for Conditional {
    fn from(c: Condition) -> Self {
        Self::Condition(c)
    }
}

impl From<OrCondition> for Conditional {
    fn from(c: OrCondition) -> Self {
        Self::Or(c)
    }
}

impl From<Literal> for Conditional {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_operator_name() {
        for op in Op::ALL {
            assert_eq!(op.name().parse::<Op>(), Ok(op));
        }
        assert_eq!(
            "equals".parse::<Op>(),
            Err(ConditionError::UnknownOperator("equals".to_string()))
        );
    }

    #[test]
    fn regex_operators_use_postgres_symbols() {
        assert_eq!(Op::Regex.sql(), "~");
        assert_eq!(Op::RegexI.sql(), "~*");
        assert_eq!(Op::NotRegex.sql(), "!~");
        assert_eq!(Op::NotRegexI.sql(), "!~*");
    }

    #[test]
    fn unknown_operator_message() {
        let err = "between".parse::<Op>().unwrap_err();
        assert_eq!(err.to_string(), "operator between can not be found");
    }
}
