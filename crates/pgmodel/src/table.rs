//! Schema description consumed by model introspection.
//!
//! A record type describes itself through [`Table::fields`]: one
//! [`FieldSpec`] per declared member, in declaration order, carrying the same
//! tags a struct annotation would (`table`, `db`, `fk`). `#[derive(Table)]`
//! generates all three methods; hand-written impls are equally valid.
//!
//! ```ignore
//! #[derive(Table)]
//! struct User {
//!     #[orm(table = "users")]
//!     model: Model,
//!     id: Field<i64>,
//!     #[orm(column = "user_name")]
//!     name: Field<String>,
//!     #[orm(column = "orders", fk = "id,user_id")]
//!     orders: Order,
//!     #[orm(skip)]
//!     cache: Option<String>,
//! }
//! ```

use crate::error::{OrmResult, SchemaError};
use crate::field::Field;
use crate::model::{Model, ModelId, ModelTree};
use std::sync::Arc;
use tokio_postgres::Row;

/// Static descriptors of a nested record type.
pub type FieldsFn = fn() -> Vec<FieldSpec>;

/// What a declared member is.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// The model marker; carries the `table` tag.
    Marker,
    /// A column cell ([`Field`]).
    Column,
    /// A nested record that can be joined through an `fk` tag.
    Nested {
        record: &'static str,
        fields: FieldsFn,
    },
    /// Anything else. Must be excluded with `db = "-"`.
    Other,
}

/// Descriptor of one declared member and its tags.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) table: Option<String>,
    pub(crate) db: Option<String>,
    pub(crate) fk: Option<String>,
}

impl FieldSpec {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            table: None,
            db: None,
            fk: None,
        }
    }

    pub fn marker(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Marker)
    }

    pub fn column(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Column)
    }

    pub fn nested<T: Table>(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::Nested {
                record: std::any::type_name::<T>(),
                fields: T::fields,
            },
        )
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Other)
    }

    /// `table` tag (marker only).
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// `db` tag: column override, nested alias, or `"-"` to skip.
    pub fn db(mut self, db: impl Into<String>) -> Self {
        self.db = Some(db.into());
        self
    }

    /// Shorthand for `db("-")`.
    pub fn skip(self) -> Self {
        self.db("-")
    }

    /// `fk` tag: `"localKey,foreignKey"`.
    pub fn fk(mut self, fk: impl Into<String>) -> Self {
        self.fk = Some(fk.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub(crate) fn is_skipped(&self) -> bool {
        self.db.as_deref() == Some("-")
    }

    /// `db` tag, ignoring the skip marker and empty strings.
    pub(crate) fn db_name(&self) -> Option<&str> {
        self.db.as_deref().filter(|d| !d.is_empty() && *d != "-")
    }
}

/// A record type that maps onto a table.
pub trait Table: Sized {
    /// Declared members, in order.
    fn fields() -> Vec<FieldSpec>;

    /// Build the typed handle once the model tree exists.
    fn bind(binder: &mut Binder<'_>) -> OrmResult<Self>;

    /// Copy of `self` with every field value read from `row`.
    fn scan_row(&self, row: &Row) -> OrmResult<Self>;
}

/// Hands out bound model handles and fields while a record is being built.
pub struct Binder<'a> {
    tree: &'a Arc<ModelTree>,
    id: ModelId,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(tree: &'a Arc<ModelTree>, id: ModelId) -> Self {
        Self { tree, id }
    }

    /// The model this record describes.
    pub fn model(&self) -> Model {
        Model::new(Arc::clone(self.tree), self.id)
    }

    /// The column cell for a declared field.
    pub fn field<T>(&self, name: &str) -> OrmResult<Field<T>> {
        let model = self.model();
        let column = model.column(name).ok_or_else(|| self.unknown(name))?;
        Ok(Field::new(column))
    }

    /// The bound nested record for a declared fk field.
    pub fn nested<T: Table>(&self, name: &str) -> OrmResult<T> {
        let child = self
            .tree
            .node(self.id)
            .child(name)
            .ok_or_else(|| self.unknown(name))?;
        let mut binder = Binder::new(self.tree, child);
        T::bind(&mut binder)
    }

    fn unknown(&self, name: &str) -> SchemaError {
        SchemaError::UnknownField {
            record: self.tree.node(self.id).record.to_string(),
            field: name.to_string(),
        }
    }
}
