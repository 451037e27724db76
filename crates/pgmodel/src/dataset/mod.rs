//! Statement builders bound to a model.
//!
//! Builders are created from a [`Model`](crate::Model) handle and consumed by
//! chaining. The first condition that fails to evaluate is kept, later
//! calls become no-ops, and every terminal returns that error. Terminals run
//! on the transaction given to `with_tx`, or on a pooled connection of the
//! model's database.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;

use crate::client::GenericClient;
use crate::db::Db;
use crate::error::{ConditionError, OrmError, OrmResult};
use crate::qb::BuiltQuery;
use tokio_postgres::{Row, Transaction};

/// Where a terminal call runs.
#[derive(Clone, Copy)]
pub(crate) struct Target<'t> {
    tx: Option<&'t Transaction<'t>>,
    db: Option<&'t Db>,
}

impl<'t> Target<'t> {
    pub(crate) fn new(tx: Option<&'t Transaction<'t>>, db: Option<&'t Db>) -> Self {
        Self { tx, db }
    }

    pub(crate) async fn query(&self, built: &BuiltQuery) -> OrmResult<Vec<Row>> {
        self.trace(built);
        let params = built.params_ref();
        match (self.tx, self.db) {
            (Some(tx), _) => GenericClient::query(tx, &built.sql, &params).await,
            (None, Some(db)) => {
                let client = db.client().await?;
                GenericClient::query(&client, &built.sql, &params).await
            }
            (None, None) => Err(detached()),
        }
    }

    /// Exactly one row.
    pub(crate) async fn query_one(&self, built: &BuiltQuery) -> OrmResult<Row> {
        self.trace(built);
        let params = built.params_ref();
        match (self.tx, self.db) {
            (Some(tx), _) => tx.query_one_strict(&built.sql, &params).await,
            (None, Some(db)) => {
                let client = db.client().await?;
                client.query_one_strict(&built.sql, &params).await
            }
            (None, None) => Err(detached()),
        }
    }

    pub(crate) async fn execute(&self, built: &BuiltQuery) -> OrmResult<u64> {
        self.trace(built);
        let params = built.params_ref();
        match (self.tx, self.db) {
            (Some(tx), _) => GenericClient::execute(tx, &built.sql, &params).await,
            (None, Some(db)) => {
                let client = db.client().await?;
                GenericClient::execute(&client, &built.sql, &params).await
            }
            (None, None) => Err(detached()),
        }
    }

    fn trace(&self, built: &BuiltQuery) {
        tracing::debug!(
            target: "pgmodel.sql",
            sql = %built.sql,
            param_count = built.params.len(),
            in_tx = self.tx.is_some(),
            "executing statement"
        );
    }
}

fn detached() -> OrmError {
    OrmError::Connection(
        "model is not attached to a database; initialize it with Db::init or pass a transaction"
            .to_string(),
    )
}

/// Return the recorded construction error, if any.
pub(crate) fn check(error: &Option<ConditionError>) -> OrmResult<()> {
    match error {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}
