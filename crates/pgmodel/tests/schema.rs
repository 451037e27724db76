#![allow(dead_code)]

mod common;

use pgmodel::tokio_postgres::Row;
use pgmodel::{Binder, Field, FieldSpec, Model, OrmError, OrmResult, SchemaError, Table, init};

fn schema_error<T: Table>() -> SchemaError {
    match init::<T>() {
        Err(OrmError::Schema(err)) => err,
        Err(other) => panic!("expected a schema error, got {other}"),
        Ok(_) => panic!("expected a schema error"),
    }
}

#[test]
fn derived_tree_matches_declarations() {
    let u = common::user();
    assert_eq!(u.model.table_name(), "users");
    assert_eq!(u.name.column().name(), "user_name");
    assert_eq!(u.orders.model.alias(), "orders");
    assert_eq!(u.orders.items.model.prefix(), "orders.items");
    assert_eq!(
        u.orders.items.model.joiner().map(|j| j.name().to_string()),
        Some("users__orders__items".to_string())
    );
    assert_eq!(u.model.children().len(), 1);
    assert!(u.cache.is_none());
}

#[test]
fn marker_may_come_last() {
    #[derive(Table)]
    struct Tag {
        label: Field<String>,
        #[orm(table = "tags")]
        model: Model,
    }

    let tag = init::<Tag>().unwrap();
    assert_eq!(tag.label.ident(), "tags.label");
}

#[test]
fn missing_marker() {
    #[derive(Table)]
    struct NoTable {
        id: Field<i64>,
    }
    assert!(matches!(
        schema_error::<NoTable>(),
        SchemaError::MissingTable { .. }
    ));
}

#[test]
fn empty_table_tag() {
    #[derive(Table)]
    struct Empty {
        #[orm(table = "")]
        model: Model,
    }
    assert!(matches!(
        schema_error::<Empty>(),
        SchemaError::MissingTable { .. }
    ));
}

#[test]
fn second_marker() {
    #[derive(Table)]
    struct Twice {
        #[orm(table = "a")]
        model: Model,
        #[orm(table = "b")]
        other: Model,
    }
    assert_eq!(
        schema_error::<Twice>(),
        SchemaError::DuplicateMarker {
            record: std::any::type_name::<Twice>().to_string(),
            field: "other".to_string(),
        }
    );
}

#[test]
fn fk_on_a_plain_column() {
    #[derive(Table)]
    struct Bad {
        #[orm(table = "bad")]
        model: Model,
        #[orm(column = "x", fk = "id,bad_id")]
        id: Field<i64>,
    }
    assert!(matches!(
        schema_error::<Bad>(),
        SchemaError::NotAModel { ref field, .. } if field == "id"
    ));
}

#[test]
fn fk_without_alias() {
    #[derive(Table)]
    struct Parent {
        #[orm(table = "parents")]
        model: Model,
        #[orm(fk = "id,parent_id")]
        child: common::Item,
    }
    assert!(matches!(
        schema_error::<Parent>(),
        SchemaError::MissingAlias { ref field, .. } if field == "child"
    ));
}

#[test]
fn malformed_fk() {
    #[derive(Table)]
    struct Parent {
        #[orm(table = "parents")]
        model: Model,
        #[orm(column = "child", fk = "id")]
        child: common::Item,
    }
    assert!(matches!(
        schema_error::<Parent>(),
        SchemaError::MalformedForeignKey { ref tag, .. } if tag == "id"
    ));
}

#[test]
fn reserved_separator_in_names() {
    #[derive(Table)]
    struct Sep {
        #[orm(table = "seps")]
        model: Model,
        #[orm(column = "first__name")]
        name: Field<String>,
    }
    assert!(matches!(
        schema_error::<Sep>(),
        SchemaError::ReservedSeparator { ref name, .. } if name == "first__name"
    ));
}

#[test]
fn invalid_identifiers() {
    #[derive(Table)]
    struct Spaced {
        #[orm(table = "my table")]
        model: Model,
    }
    assert!(matches!(
        schema_error::<Spaced>(),
        SchemaError::InvalidIdentifier { ref name, .. } if name == "my table"
    ));
}

#[test]
fn duplicate_nested_alias() {
    #[derive(Table)]
    struct Parent {
        #[orm(table = "parents")]
        model: Model,
        #[orm(column = "child", fk = "id,parent_id")]
        first: common::Item,
        #[orm(column = "child", fk = "id,other_id")]
        second: common::Item,
    }
    assert!(matches!(
        schema_error::<Parent>(),
        SchemaError::DuplicateAlias { ref alias, .. } if alias == "child"
    ));
}

struct Loose {
    model: Model,
}

impl Table for Loose {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::marker("model").table("loose"),
            FieldSpec::other("cache"),
        ]
    }

    fn bind(binder: &mut Binder<'_>) -> OrmResult<Self> {
        Ok(Self {
            model: binder.model(),
        })
    }

    fn scan_row(&self, _row: &Row) -> OrmResult<Self> {
        Ok(Self {
            model: self.model.clone(),
        })
    }
}

struct Unjoined {
    model: Model,
}

impl Table for Unjoined {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::marker("model").table("unjoined"),
            FieldSpec::nested::<common::Item>("items").db("items"),
        ]
    }

    fn bind(binder: &mut Binder<'_>) -> OrmResult<Self> {
        Ok(Self {
            model: binder.model(),
        })
    }

    fn scan_row(&self, _row: &Row) -> OrmResult<Self> {
        Ok(Self {
            model: self.model.clone(),
        })
    }
}

#[test]
fn unmapped_fields_are_rejected() {
    assert!(matches!(
        schema_error::<Loose>(),
        SchemaError::UnknownField { ref field, .. } if field == "cache"
    ));
    assert!(matches!(
        schema_error::<Unjoined>(),
        SchemaError::UnknownField { ref field, .. } if field == "items"
    ));
}

#[test]
fn skipped_fields_are_ignored() {
    struct Skipping {
        model: Model,
    }

    impl Table for Skipping {
        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::other("cache").db("-"),
                FieldSpec::column("Ignored").skip(),
                FieldSpec::marker("model").table("skipping"),
            ]
        }

        fn bind(binder: &mut Binder<'_>) -> OrmResult<Self> {
            Ok(Self {
                model: binder.model(),
            })
        }

        fn scan_row(&self, _row: &Row) -> OrmResult<Self> {
            Ok(Self {
                model: self.model.clone(),
            })
        }
    }

    let s = init::<Skipping>().unwrap();
    assert!(s.model.columns().is_empty());
}

#[test]
fn column_names_default_to_snake_case() {
    struct Camel {
        model: Model,
        user_id: Field<i64>,
        status: Field<String>,
    }

    impl Table for Camel {
        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::marker("model").table("camels"),
                FieldSpec::column("UserID"),
                FieldSpec::column("HTTPStatus"),
            ]
        }

        fn bind(binder: &mut Binder<'_>) -> OrmResult<Self> {
            Ok(Self {
                model: binder.model(),
                user_id: binder.field("UserID")?,
                status: binder.field("HTTPStatus")?,
            })
        }

        fn scan_row(&self, row: &Row) -> OrmResult<Self> {
            Ok(Self {
                model: self.model.clone(),
                user_id: self.user_id.scan(row)?,
                status: self.status.scan(row)?,
            })
        }
    }

    let c = init::<Camel>().unwrap();
    assert_eq!(c.user_id.ident(), "camels.user_id");
    assert_eq!(c.status.ident(), "camels.http_status");
}

#[test]
fn schema_errors_name_the_record() {
    #[derive(Table)]
    struct Nameless {
        id: Field<i64>,
    }
    let message = schema_error::<Nameless>().to_string();
    assert!(message.contains("Nameless"));
    assert!(message.contains("no table name found"));
}
