//! Derive macro for pgmodel
//!
//! Provides `#[derive(Table)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod table;

/// Derive `pgmodel::Table` for a struct.
///
/// # Example
///
/// ```ignore
/// use pgmodel::{Field, Model, Table};
///
/// #[derive(Table)]
/// struct User {
///     #[orm(table = "users")]
///     model: Model,
///     id: Field<i64>,
///     #[orm(column = "user_name")]
///     name: Field<String>,
///     #[orm(column = "orders", fk = "id,user_id")]
///     orders: Order,
///     #[orm(skip)]
///     cache: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Model marker field; the field must be a `Model`
/// - `#[orm(column = "name")]` - Column name of a `Field`, or alias of a nested record
/// - `#[orm(fk = "localKey,foreignKey")]` - Join a nested record
/// - `#[orm(skip)]` / `#[orm(column = "-")]` - Not a column; rebuilt with `Default`
#[proc_macro_derive(Table, attributes(orm))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    table::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
