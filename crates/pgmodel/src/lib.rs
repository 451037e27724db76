//! # pgmodel
//!
//! A PostgreSQL model layer driven by struct annotations.
//!
//! A record type declares its table, its columns and the nested records it can
//! join through foreign keys. [`init`] (or [`Db::init`]) turns it into a bound
//! handle whose fields build conditions, and whose marker [`Model`] builds
//! statements. Nested records referenced by a statement are LEFT JOINed
//! automatically, each at most once.
//!
//! ```ignore
//! use pgmodel::prelude::*;
//!
//! #[derive(Table)]
//! struct Order {
//!     #[orm(table = "orders")]
//!     model: Model,
//!     id: Field<i64>,
//!     amount: Field<i64>,
//! }
//!
//! #[derive(Table)]
//! struct User {
//!     #[orm(table = "users")]
//!     model: Model,
//!     id: Field<i64>,
//!     name: Field<String>,
//!     #[orm(column = "orders", fk = "id,user_id")]
//!     orders: Order,
//! }
//!
//! let db = Db::connect(&DbConfig::from_url("postgres://localhost/shop")?).await?;
//! let user = db.init::<User>()?;
//!
//! // SELECT users.name AS name FROM users
//! //   LEFT JOIN orders AS users__orders ON users.id = users__orders.user_id
//! //   WHERE users__orders.amount > $1
//! let users = user
//!     .model
//!     .select([&user.name])
//!     .filter(user.orders.amount.gt(100))
//!     .load(&user)
//!     .await?;
//! ```

extern crate self as pgmodel;

pub mod client;
pub mod condition;
pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod expr;
pub mod field;
pub mod ident;
pub mod model;
pub mod pool;
pub mod prelude;
pub mod qb;
pub mod record;
pub mod row;
pub mod table;

pub use client::GenericClient;
pub use condition::{Condition, Conditional, Op, OrCondition, Operand, Scope, or};
pub use config::DbConfig;
pub use dataset::{Delete, Insert, Select, Update};
pub use db::Db;
pub use error::{ConditionError, OrmError, OrmResult, SchemaError};
pub use expr::{Count, Expression, Literal, count, literal};
pub use field::{Column, Field};
pub use model::{Joiner, Model, ModelId, init};
pub use pool::{create_pool, create_pool_with_tls};
pub use qb::BuiltQuery;
pub use record::Record;
pub use row::{FromRow, RowExt};
pub use table::{Binder, FieldKind, FieldSpec, Table};

#[cfg(feature = "derive")]
pub use pgmodel_derive::Table;

// Generated code names rows through this path.
pub use tokio_postgres;
