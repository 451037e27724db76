//! Statement drafts rendered to `$n`-parameterized PostgreSQL.
//!
//! The model layer never formats SQL by hand: builders translate fields,
//! joiners and conditions into these drafts, which own clause ordering and
//! placeholder numbering. Identifiers are emitted as given.

mod delete;
mod expr;
mod insert;
mod param;
mod select;
mod update;

pub use delete::DeleteQb;
pub use expr::{Expr, ExprGroup};
pub use insert::InsertQb;
pub use param::{Param, ParamList};
pub use select::SelectQb;
pub use update::UpdateQb;

use tokio_postgres::types::ToSql;

/// The result of building a statement.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Param>,
}

impl BuiltQuery {
    pub fn new(sql: String, params: Vec<Param>) -> Self {
        Self { sql, params }
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
