//! INSERT statement draft.

use crate::error::{OrmError, OrmResult};
use crate::qb::BuiltQuery;
use crate::qb::param::{Param, ParamList};

/// Single- or multi-row INSERT with optional RETURNING.
#[derive(Clone, Debug)]
pub struct InsertQb {
    table: String,
    columns: Vec<String>,
    /// One entry per VALUES tuple
    rows: Vec<Vec<Param>>,
    returning_cols: Vec<String>,
}

impl InsertQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            returning_cols: Vec::new(),
        }
    }

    /// Set the column list.
    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Append one VALUES tuple.
    ///
    /// Rows are rendered as given; their width is not checked against the
    /// column list.
    pub fn values(mut self, row: Vec<Param>) -> Self {
        self.rows.push(row);
        self
    }

    /// Append a RETURNING column.
    pub fn returning(mut self, col: &str) -> Self {
        self.returning_cols.push(col.to_string());
        self
    }

    /// `DEFAULT VALUES` only covers a single row: an empty tuple is rejected
    /// when more than one row is given, and so is a column list with no rows.
    pub fn validate(&self) -> OrmResult<()> {
        if self.rows.len() > 1 && self.rows.iter().any(Vec::is_empty) {
            return Err(OrmError::validation(
                "InsertQb: multi-row insert cannot contain an empty row",
            ));
        }
        if !self.columns.is_empty() && self.rows.is_empty() {
            return Err(OrmError::validation("InsertQb: column list given without values"));
        }
        Ok(())
    }

    fn build_insert(&self, params: &mut ParamList) -> String {
        let mut sql = if self.columns.is_empty() || self.rows.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", self.table)
        } else {
            let tuples: Vec<String> = self
                .rows
                .iter()
                .map(|row| {
                    let placeholders: Vec<String> = row
                        .iter()
                        .map(|p| format!("${}", params.push_param(p.clone())))
                        .collect();
                    format!("({})", placeholders.join(", "))
                })
                .collect();

            format!(
                "INSERT INTO {} ({}) VALUES {}",
                self.table,
                self.columns.join(", "),
                tuples.join(", ")
            )
        };

        if !self.returning_cols.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning_cols.join(", "));
        }

        sql
    }

    pub fn build(&self) -> BuiltQuery {
        let mut params = ParamList::new();
        let sql = self.build_insert(&mut params);
        BuiltQuery::new(sql, params.into_vec())
    }

    /// Get the built SQL string (for debugging).
    pub fn to_sql(&self) -> String {
        self.build().sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_insert() {
        let qb = InsertQb::new("users")
            .columns(vec!["id".into(), "name".into()])
            .values(vec![Param::new(1i64), Param::new("alice")]);
        assert_eq!(qb.to_sql(), "INSERT INTO users (id, name) VALUES ($1, $2)");
    }

    #[test]
    fn test_multi_row_insert_with_returning() {
        let built = InsertQb::new("users")
            .columns(vec!["id".into(), "name".into()])
            .values(vec![Param::new(1i64), Param::new("a")])
            .values(vec![Param::new(2i64), Param::new("b")])
            .returning("users.id")
            .build();
        assert_eq!(
            built.sql,
            "INSERT INTO users (id, name) VALUES ($1, $2), ($3, $4) RETURNING users.id"
        );
        assert_eq!(built.params.len(), 4);
    }

    #[test]
    fn test_insert_default_values() {
        let qb = InsertQb::new("audit_log");
        assert!(qb.validate().is_ok());
        assert_eq!(qb.to_sql(), "INSERT INTO audit_log DEFAULT VALUES");

        let one_empty_row = InsertQb::new("audit_log").values(Vec::new());
        assert!(one_empty_row.validate().is_ok());
        assert_eq!(one_empty_row.to_sql(), "INSERT INTO audit_log DEFAULT VALUES");
    }

    #[test]
    fn test_validate_rejects_empty_rows_in_multi_row_insert() {
        let qb = InsertQb::new("users")
            .values(Vec::new())
            .values(Vec::new());
        assert!(matches!(qb.validate(), Err(OrmError::Validation(_))));

        let qb = InsertQb::new("users")
            .columns(vec!["name".into()])
            .values(vec![Param::new("x")])
            .values(Vec::new());
        assert!(matches!(qb.validate(), Err(OrmError::Validation(_))));
    }
}
