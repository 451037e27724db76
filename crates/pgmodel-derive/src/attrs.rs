//! Field-level `#[orm(...)]` attribute parsing.

use syn::Result;
use syn::parse::{Parse, ParseStream};

/// Tags collected from every `#[orm(...)]` on one field.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub table: Option<String>,
    pub column: Option<String>,
    pub fk: Option<String>,
    pub skip: bool,
}

impl FieldAttr {
    pub fn from_field(field: &syn::Field) -> Result<Self> {
        let mut merged = FieldAttr::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("orm") {
                continue;
            }
            let parsed: FieldAttr = attr.parse_args()?;
            merged.table = parsed.table.or(merged.table);
            merged.column = parsed.column.or(merged.column);
            merged.fk = parsed.fk.or(merged.fk);
            merged.skip |= parsed.skip;
        }
        if merged.column.as_deref() == Some("-") {
            merged.skip = true;
        }
        Ok(merged)
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            if ident == "skip" {
                attr.skip = true;
            } else {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                match ident.to_string().as_str() {
                    "table" => attr.table = Some(value.value()),
                    // `db` is accepted as a synonym of `column`
                    "column" | "db" => attr.column = Some(value.value()),
                    "fk" => attr.fk = Some(value.value()),
                    other => {
                        return Err(syn::Error::new_spanned(
                            &ident,
                            format!("unknown orm attribute `{other}`"),
                        ));
                    }
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("expected `,`"));
        }
        Ok(attr)
    }
}

/// Whether the field's type is `Field<T>` (by last path segment).
pub(crate) fn is_field_type(ty: &syn::Type) -> bool {
    let syn::Type::Path(type_path) = ty else {
        return false;
    };
    type_path
        .path
        .segments
        .last()
        .is_some_and(|seg| seg.ident == "Field")
}
