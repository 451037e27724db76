//! Convenient imports for typical `pgmodel` usage.
//!
//! ```ignore
//! use pgmodel::prelude::*;
//! ```

pub use crate::{
    Count, Db, DbConfig, Field, FromRow, Model, OrmError, OrmResult, Record, RowExt, count, init,
    literal, or,
};

pub use crate::Table;
