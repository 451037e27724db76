//! Selectable expressions.

use crate::condition::Scope;
use crate::field::{Column, Field};
use crate::ident::alias_sql;
use crate::model::Joiner;

/// Something that can appear in a select list, ORDER BY or GROUP BY.
#[derive(Clone, Debug)]
pub enum Expression {
    Field(Column),
    Count(Count),
    Literal(Literal),
}

impl Expression {
    /// Expression text without an alias.
    pub fn ident(&self) -> String {
        match self {
            Self::Field(column) => column.ident(),
            Self::Count(count) => count.ident(),
            Self::Literal(literal) => literal.render(),
        }
    }

    /// Select-list entries.
    pub fn selectors(&self) -> Vec<String> {
        match self {
            Self::Field(column) => vec![column.selector()],
            Self::Count(count) => vec![count.selector()],
            Self::Literal(literal) => vec![literal.selector()],
        }
    }

    /// Joiners the expression needs, outermost first.
    pub fn joiners(&self) -> Vec<Joiner> {
        match self {
            Self::Field(column) => column.joiners(),
            Self::Count(count) => count.column.joiners(),
            Self::Literal(literal) => literal.joiners(),
        }
    }
}

impl<T> From<&Field<T>> for Expression {
    fn from(field: &Field<T>) -> Self {
        field.expr()
    }
}

impl From<Column> for Expression {
    fn from(column: Column) -> Self {
        Self::Field(column)
    }
}

impl From<&Column> for Expression {
    fn from(column: &Column) -> Self {
        Self::Field(column.clone())
    }
}

impl From<Count> for Expression {
    fn from(count: Count) -> Self {
        Self::Count(count)
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

/// `COUNT(column)`, optionally aliased.
#[derive(Clone, Debug)]
pub struct Count {
    column: Column,
    alias: Option<String>,
}

impl Count {
    pub fn new(column: impl Into<Column>) -> Self {
        Self {
            column: column.into(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn ident(&self) -> String {
        format!("COUNT({})", self.column.ident())
    }

    fn selector(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.ident(), alias_sql(alias)),
            None => self.ident(),
        }
    }
}

/// `COUNT(column)`
pub fn count(column: impl Into<Column>) -> Count {
    Count::new(column)
}

/// Raw SQL whose `?` placeholders are replaced, in order, by the qualified
/// identifiers of its column arguments.
///
/// Placeholders beyond the argument list are left untouched.
#[derive(Clone, Debug)]
pub struct Literal {
    sql: String,
    args: Vec<Column>,
    alias: Option<String>,
}

impl Literal {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
            alias: None,
        }
    }

    pub fn arg(mut self, column: impl Into<Column>) -> Self {
        self.args.push(column.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn render(&self) -> String {
        self.render_in(Scope::Query)
    }

    /// Render with identifiers resolved for `scope`; under [`Scope::Update`]
    /// nested columns become the parent's local key.
    pub fn render_in(&self, scope: Scope) -> String {
        let mut args = self.args.iter();
        let mut out = String::with_capacity(self.sql.len());
        for ch in self.sql.chars() {
            match ch {
                '?' => match args.next() {
                    Some(column) => out.push_str(&match scope {
                        Scope::Query => column.ident(),
                        Scope::Update => column.update_ident(),
                    }),
                    None => out.push('?'),
                },
                _ => out.push(ch),
            }
        }
        out
    }

    fn selector(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.render(), alias_sql(alias)),
            None => self.render(),
        }
    }

    pub fn joiners(&self) -> Vec<Joiner> {
        self.args.iter().flat_map(Column::joiners).collect()
    }
}

/// Shorthand for [`Literal::new`].
pub fn literal(sql: impl Into<String>) -> Literal {
    Literal::new(sql)
}
