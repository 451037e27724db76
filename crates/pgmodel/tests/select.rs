mod common;

use common::user;
use pgmodel::{
    Condition, ConditionError, Expression, Field, Model, Operand, OrmError, Table, count, literal,
    or,
};

const JOIN_ORDERS: &str = "LEFT JOIN orders AS users__orders ON users.id = users__orders.user_id";
const JOIN_ITEMS: &str =
    "LEFT JOIN items AS users__orders__items ON users__orders.id = users__orders__items.order_id";

#[test]
fn select_all_joins_every_nested_model() {
    let u = user();
    let sql = u.model.select_all().to_sql().unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT users.id AS id, users.user_name AS user_name, users.email AS email, \
             users__orders.id AS \"orders.id\", users__orders.user_id AS \"orders.user_id\", \
             users__orders.amount AS \"orders.amount\", users__orders__items.id AS \"orders.items.id\", \
             users__orders__items.sku AS \"orders.items.sku\" \
             FROM users {JOIN_ORDERS} {JOIN_ITEMS}"
        )
    );
}

#[test]
fn filter_on_nested_field_joins_it() {
    let u = user();
    let built = u
        .model
        .select([&u.name])
        .filter(u.orders.amount.gt(100))
        .build()
        .unwrap();
    assert_eq!(
        built.sql,
        format!(
            "SELECT users.user_name AS user_name FROM users {JOIN_ORDERS} \
             WHERE users__orders.amount > $1"
        )
    );
    assert_eq!(built.params.len(), 1);
}

#[test]
fn root_only_select_has_no_joins() {
    let u = user();
    let sql = u
        .model
        .select([u.id.expr(), u.email.expr()])
        .filter(u.email.is_not_null())
        .order_asc(&u.id)
        .limit(10)
        .offset(20)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT users.id AS id, users.email AS email FROM users \
         WHERE users.email IS NOT NULL ORDER BY users.id ASC LIMIT 10 OFFSET 20"
    );
}

#[test]
fn each_joiner_is_added_once() {
    let u = user();
    let sql = u
        .model
        .select([&u.orders.amount])
        .filter(u.orders.id.eq(1))
        .filter(u.orders.user_id.gte(2))
        .order_desc(&u.orders.amount)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT users__orders.amount AS \"orders.amount\" FROM users {JOIN_ORDERS} \
             WHERE users__orders.id = $1 AND users__orders.user_id >= $2 \
             ORDER BY users__orders.amount DESC"
        )
    );
    assert_eq!(sql.matches("LEFT JOIN").count(), 1);
}

#[test]
fn deep_condition_joins_the_whole_chain() {
    let u = user();
    let sql = u
        .model
        .select([&u.name])
        .filter(u.orders.items.sku.like("A%"))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT users.user_name AS user_name FROM users {JOIN_ORDERS} {JOIN_ITEMS} \
             WHERE users__orders__items.sku LIKE $1"
        )
    );
}

#[test]
fn or_groups_conditions_and_their_joins() {
    let u = user();
    let sql = u
        .model
        .select([&u.id])
        .filter(or([u.name.eq("a"), u.orders.amount.lt(5)]))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT users.id AS id FROM users {JOIN_ORDERS} \
             WHERE (users.user_name = $1 OR users__orders.amount < $2)"
        )
    );
}

#[test]
fn operators_render_postgres_syntax() {
    let u = user();
    let cases = [
        (u.name.regex("^a"), "users.user_name ~ $1"),
        (u.name.regex_i("^a"), "users.user_name ~* $1"),
        (u.name.not_regex("^a"), "users.user_name !~ $1"),
        (u.name.not_regex_i("^a"), "users.user_name !~* $1"),
        (u.name.not_like("a%"), "users.user_name NOT LIKE $1"),
        (u.id.not_eq(3), "users.id != $1"),
        (u.id.lte(3), "users.id <= $1"),
        (u.email.is_null(), "users.email IS NULL"),
        (u.id.in_list([1, 2, 3]), "users.id IN ($1, $2, $3)"),
        (u.id.not_in([4]), "users.id NOT IN ($1)"),
        (u.id.in_list(Vec::<i64>::new()), "1=0"),
    ];
    for (condition, expected) in cases {
        let sql = u.model.select([&u.id]).filter(condition).to_sql().unwrap();
        assert_eq!(sql, format!("SELECT users.id AS id FROM users WHERE {expected}"));
    }
}

#[test]
fn in_with_single_value_becomes_a_list() {
    let u = user();
    let sql = u
        .model
        .select([&u.id])
        .filter(Condition::new(&u.id, "in", Operand::value(9i64)))
        .to_sql()
        .unwrap();
    assert_eq!(sql, "SELECT users.id AS id FROM users WHERE users.id IN ($1)");
}

#[test]
fn subqueries_share_parameter_numbering() {
    let u = user();
    let ids = u
        .orders
        .model
        .select([&u.orders.user_id])
        .filter(u.orders.amount.gt(10));
    let sql = u
        .model
        .select([&u.name])
        .filter(u.name.eq("bob"))
        .filter(u.id.in_select(ids))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT users.user_name AS user_name FROM users WHERE users.user_name = $1 \
         AND users.id IN (SELECT users__orders.user_id AS \"orders.user_id\" \
         FROM orders AS users__orders WHERE users__orders.amount > $2)"
    );
}

#[test]
fn negated_subqueries_render_not_equal() {
    let u = user();
    let sub = || u.orders.model.select([&u.orders.user_id]);

    let not_in = u.model.select([&u.id]).filter(u.id.not_in_select(sub()));
    let not_eq = u.model.select([&u.id]).filter(u.id.not_eq_select(sub()));
    let eq = u.model.select([&u.id]).filter(u.id.eq_select(sub()));

    let inner = "SELECT users__orders.user_id AS \"orders.user_id\" FROM orders AS users__orders";
    assert_eq!(
        not_in.to_sql().unwrap(),
        format!("SELECT users.id AS id FROM users WHERE users.id != ({inner})")
    );
    assert_eq!(not_eq.to_sql().unwrap(), not_in.to_sql().unwrap());
    assert_eq!(
        eq.to_sql().unwrap(),
        format!("SELECT users.id AS id FROM users WHERE users.id = ({inner})")
    );
}

#[test]
fn subquery_error_propagates_to_outer_select() {
    let u = user();
    let broken = u
        .orders
        .model
        .select([&u.orders.user_id])
        .filter(Condition::new(&u.orders.amount, "between", Operand::value(1i64)));
    let err = u
        .model
        .select([&u.id])
        .filter(u.id.in_select(broken))
        .to_sql()
        .unwrap_err();
    assert!(matches!(
        err,
        OrmError::Condition(ConditionError::UnknownOperator(ref op)) if op == "between"
    ));
}

#[test]
fn first_condition_error_sticks() {
    let u = user();
    let select = u
        .model
        .select([&u.id])
        .filter(Condition::new(&u.id, "bogus", Operand::value(1i64)))
        .filter(Condition::new(&u.orders.id, "nope", Operand::value(1i64)))
        .filter(u.orders.amount.gt(1));

    let err = select.to_sql().unwrap_err();
    assert_eq!(err.to_string(), "operator bogus can not be found");
    assert!(select.build().is_err());
}

#[test]
fn operand_shape_is_checked() {
    let u = user();
    let err = u
        .model
        .select([&u.id])
        .filter(Condition::new(&u.id, "eq", Operand::list([1i64, 2])))
        .to_sql()
        .unwrap_err();
    assert!(matches!(
        err,
        OrmError::Condition(ConditionError::InvalidOperand { .. })
    ));

    let err = u
        .model
        .select([&u.id])
        .filter(Condition::new(&u.id, "gt", Operand::None))
        .to_sql()
        .unwrap_err();
    assert!(matches!(
        err,
        OrmError::Condition(ConditionError::InvalidOperand { .. })
    ));
}

#[test]
fn aliases_counts_and_literals() {
    let u = user();
    let sql = u
        .model
        .select([
            Expression::from(u.name.alias("n")),
            count(&u.orders.id).alias("order_count").into(),
            literal("COALESCE(?, 0)").arg(&u.orders.amount).alias("amt").into(),
        ])
        .group_by(&u.name)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT users.user_name AS n, COUNT(users__orders.id) AS order_count, \
             COALESCE(users__orders.amount, 0) AS amt FROM users {JOIN_ORDERS} \
             GROUP BY users.user_name"
        )
    );
}

#[test]
fn literal_predicate_joins_its_arguments() {
    let u = user();
    let sql = u
        .model
        .select([&u.id])
        .filter(literal("lower(?) = lower(?)").arg(&u.name).arg(&u.orders.items.sku))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT users.id AS id FROM users {JOIN_ORDERS} {JOIN_ITEMS} \
             WHERE lower(users.user_name) = lower(users__orders__items.sku)"
        )
    );
}

#[test]
fn nested_model_selects_from_its_own_alias() {
    let u = user();
    let sql = u.orders.model.select_all().to_sql().unwrap();
    assert_eq!(
        sql,
        "SELECT users__orders.id AS \"orders.id\", users__orders.user_id AS \"orders.user_id\", \
         users__orders.amount AS \"orders.amount\", users__orders__items.id AS \"orders.items.id\", \
         users__orders__items.sku AS \"orders.items.sku\" FROM orders AS users__orders \
         LEFT JOIN items AS users__orders__items ON users__orders.id = users__orders__items.order_id"
    );
}

#[test]
fn find_is_select_all_with_a_filter() {
    let u = user();
    let sql = u.model.find(u.id.eq(1)).to_sql().unwrap();
    assert!(sql.starts_with("SELECT users.id AS id, users.user_name AS user_name"));
    assert!(sql.ends_with("WHERE users.id = $1"));
}

#[test]
fn mixed_case_columns_keep_their_output_key() {
    #[derive(Table)]
    struct Account {
        #[orm(table = "accts")]
        model: Model,
        #[orm(column = "UserName")]
        name: Field<String>,
        id: Field<i64>,
    }

    let acct = pgmodel::init::<Account>().unwrap();
    assert_eq!(acct.name.column().output_key(), "UserName");
    assert_eq!(acct.name.alias("Display").output_key(), "Display");

    let sql = acct.model.select_all().to_sql().unwrap();
    assert_eq!(
        sql,
        "SELECT accts.UserName AS \"UserName\", accts.id AS id FROM accts"
    );

    let sql = acct
        .model
        .select([acct.name.alias("Display")])
        .to_sql()
        .unwrap();
    assert_eq!(sql, "SELECT accts.UserName AS \"Display\" FROM accts");
}
