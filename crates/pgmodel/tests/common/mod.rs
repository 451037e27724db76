#![allow(dead_code)]

use pgmodel::{Field, Model, Table};

#[derive(Table)]
pub struct Item {
    #[orm(table = "items")]
    pub model: Model,
    pub id: Field<i64>,
    pub sku: Field<String>,
}

#[derive(Table)]
pub struct Order {
    #[orm(table = "orders")]
    pub model: Model,
    pub id: Field<i64>,
    pub user_id: Field<i64>,
    pub amount: Field<i64>,
    #[orm(column = "items", fk = "id,order_id")]
    pub items: Item,
}

#[derive(Table)]
pub struct User {
    #[orm(table = "users")]
    pub model: Model,
    pub id: Field<i64>,
    #[orm(column = "user_name")]
    pub name: Field<String>,
    pub email: Field<String>,
    #[orm(column = "orders", fk = "id,user_id")]
    pub orders: Order,
    #[orm(skip)]
    pub cache: Option<String>,
}

pub fn user() -> User {
    pgmodel::init::<User>().expect("User model")
}
