//! SQL identifier rules shared by introspection and rendering.
//!
//! Table names, column names and nested aliases are emitted unquoted, so they
//! must match `[A-Za-z_][A-Za-z0-9_$]*`. Generated join aliases are built by
//! joining alias segments with [`SEPARATOR`], which user-chosen names may not
//! contain.

use crate::error::SchemaError;
use heck::ToSnakeCase;

/// Separator between alias segments of a generated join alias.
pub const SEPARATOR: &str = "__";

/// Check a name against the unquoted identifier grammar.
pub fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '_' || first.is_ascii_alphabetic()) {
        return false;
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

/// Validate a user-chosen table/column/alias name.
pub(crate) fn check_name(record: &str, name: &str) -> Result<(), SchemaError> {
    if !is_valid_ident(name) {
        return Err(SchemaError::InvalidIdentifier {
            record: record.to_string(),
            name: name.to_string(),
        });
    }
    if name.contains(SEPARATOR) {
        return Err(SchemaError::ReservedSeparator {
            record: record.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Render an output alias, quoting it when it is not a plain identifier
/// (e.g. the dotted `orders.amount` keys of nested fields) or when it has
/// uppercase letters, which the server would otherwise fold to lowercase.
pub(crate) fn alias_sql(alias: &str) -> String {
    if is_valid_ident(alias) && !alias.chars().any(|c| c.is_ascii_uppercase()) {
        return alias.to_string();
    }
    let mut out = String::with_capacity(alias.len() + 2);
    out.push('"');
    for ch in alias.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Convert a declared field name into a column name.
///
/// `UserID` → `user_id`, `HTTPStatus` → `http_status`, `userName` → `user_name`.
/// Snake_case input is returned unchanged.
pub fn to_snake_case(name: &str) -> String {
    name.to_snake_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_simple_words() {
        assert_eq!(to_snake_case("Name"), "name");
        assert_eq!(to_snake_case("UserName"), "user_name");
        assert_eq!(to_snake_case("userName"), "user_name");
    }

    #[test]
    fn snake_case_uppercase_runs() {
        assert_eq!(to_snake_case("UserID"), "user_id");
        assert_eq!(to_snake_case("HTTPStatus"), "http_status");
        assert_eq!(to_snake_case("ID"), "id");
        assert_eq!(to_snake_case("ParseURLPath"), "parse_url_path");
    }

    #[test]
    fn snake_case_digits() {
        assert_eq!(to_snake_case("Address2"), "address2");
        assert_eq!(to_snake_case("Line2Text"), "line2_text");
    }

    #[test]
    fn snake_case_is_idempotent() {
        for name in ["UserID", "HTTPStatus", "created_at", "already_snake", "X"] {
            let once = to_snake_case(name);
            assert_eq!(to_snake_case(&once), once);
        }
    }

    #[test]
    fn ident_grammar() {
        assert!(is_valid_ident("users"));
        assert!(is_valid_ident("_tmp$1"));
        assert!(!is_valid_ident(""));
        assert!(!is_valid_ident("1users"));
        assert!(!is_valid_ident("user name"));
        assert!(!is_valid_ident("orders.amount"));
    }

    #[test]
    fn check_name_rejects_separator() {
        let err = check_name("User", "user__name").unwrap_err();
        assert!(matches!(err, SchemaError::ReservedSeparator { .. }));
        assert!(check_name("User", "user_name").is_ok());
    }

    #[test]
    fn alias_quoting() {
        assert_eq!(alias_sql("total"), "total");
        assert_eq!(alias_sql("orders.amount"), "\"orders.amount\"");
        assert_eq!(alias_sql("UserName"), "\"UserName\"");
        assert_eq!(alias_sql("orders.Amount"), "\"orders.Amount\"");
    }
}
