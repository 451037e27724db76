//! Row mapping traits and utilities

use crate::error::{OrmError, OrmResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust struct.
///
/// Used by `scan` / `scan_one` on the statement builders. Implement it by hand
/// or with a small wrapper over [`RowExt::try_get_column`].
///
/// # Example
///
/// ```ignore
/// struct UserRow {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for UserRow {
///     fn from_row(row: &Row) -> OrmResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             name: row.try_get_column("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> OrmResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning OrmError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a>;

    /// Whether the row carries a column with this output name.
    fn has_column(&self, column: &str) -> bool;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| OrmError::decode(column, e.to_string()))
    }

    fn has_column(&self, column: &str) -> bool {
        self.columns().iter().any(|c| c.name() == column)
    }
}
