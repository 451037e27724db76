//! Column/value sets for INSERT and UPDATE.

use crate::field::{Column, Field};
use crate::qb::Param;
use std::collections::BTreeMap;
use tokio_postgres::types::ToSql;

/// Values keyed by field.
///
/// A nested field writes to the parent's local key, so
/// `Record::new().set(&user.orders.id, 7)` targets the column named by the
/// first half of the fk tag. Setting the same column twice keeps the later
/// value.
#[derive(Clone, Debug, Default)]
pub struct Record {
    entries: Vec<(Column, Param)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T>(mut self, field: &Field<T>, value: impl Into<T>) -> Self
    where
        T: ToSql + Send + Sync + 'static,
    {
        self.entries
            .push((field.column().clone(), Param::new(value.into())));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column name to value, sorted by column.
    pub fn to_map(&self) -> BTreeMap<String, Param> {
        self.entries
            .iter()
            .map(|(column, value)| (column.record_key().to_string(), value.clone()))
            .collect()
    }
}
