//! Table derive macro implementation

use crate::attrs::{FieldAttr, is_field_type};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Table can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Table can only be derived for structs",
            ));
        }
    };

    let mut specs = Vec::new();
    let mut binds = Vec::new();
    let mut scans = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let declared = ident.to_string();
        let ty = &field.ty;
        let attr = FieldAttr::from_field(field)?;

        let db = attr.column.as_ref().map(|c| quote! { .db(#c) });
        let fk = attr.fk.as_ref().map(|f| quote! { .fk(#f) });

        if let Some(table) = &attr.table {
            specs.push(quote! { ::pgmodel::FieldSpec::marker(#declared).table(#table) });
            binds.push(quote! { #ident: binder.model() });
            scans.push(quote! { #ident: ::core::clone::Clone::clone(&self.#ident) });
        } else if attr.skip {
            specs.push(quote! { ::pgmodel::FieldSpec::other(#declared).skip() });
            binds.push(quote! { #ident: ::core::default::Default::default() });
            scans.push(quote! { #ident: ::core::default::Default::default() });
        } else if is_field_type(ty) {
            // an fk on a plain column is rejected when the model is built
            specs.push(quote! { ::pgmodel::FieldSpec::column(#declared) #db #fk });
            binds.push(quote! { #ident: binder.field(#declared)? });
            scans.push(quote! { #ident: self.#ident.scan(row)? });
        } else if attr.fk.is_some() {
            specs.push(quote! { ::pgmodel::FieldSpec::nested::<#ty>(#declared) #db #fk });
            binds.push(quote! { #ident: binder.nested::<#ty>(#declared)? });
            scans.push(quote! { #ident: ::pgmodel::Table::scan_row(&self.#ident, row)? });
        } else {
            return Err(syn::Error::new_spanned(
                field,
                "Table fields must be a `Field<T>`, a nested record with `fk`, \
                 the model marker with `table`, or marked `skip`",
            ));
        }
    }

    Ok(quote! {
        impl #impl_generics ::pgmodel::Table for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::pgmodel::FieldSpec> {
                ::std::vec![#(#specs),*]
            }

            #[allow(unused_variables)]
            fn bind(binder: &mut ::pgmodel::Binder<'_>) -> ::pgmodel::OrmResult<Self> {
                ::core::result::Result::Ok(Self {
                    #(#binds),*
                })
            }

            #[allow(unused_variables)]
            fn scan_row(
                &self,
                row: &::pgmodel::tokio_postgres::Row,
            ) -> ::pgmodel::OrmResult<Self> {
                ::core::result::Result::Ok(Self {
                    #(#scans),*
                })
            }
        }
    })
}
