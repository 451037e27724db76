//! Error types for pgmodel

use thiserror::Error;

/// Result type alias for pgmodel operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for model construction and database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// More rows than the caller asked for
    #[error("Expected {expected} row(s), got {got}")]
    TooManyRows { expected: usize, got: usize },

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Model introspection error
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Condition evaluation error recorded by a builder
    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a too-many-rows error
    pub fn too_many_rows(expected: usize, got: usize) -> Self {
        Self::TooManyRows { expected, got }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Parse a tokio_postgres error into a more specific OrmError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

/// Errors raised while deriving a model tree from a record type.
///
/// These point at a defect in the record definition and are never retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{record}: no table name found (missing model marker with a `table` tag)")]
    MissingTable { record: String },

    #[error("{record}: field `{field}` is a second model marker")]
    DuplicateMarker { record: String, field: String },

    #[error("{record}: field `{field}` has malformed fk tag `{tag}` (expected `localKey,foreignKey`)")]
    MalformedForeignKey {
        record: String,
        field: String,
        tag: String,
    },

    #[error("{record}: field `{field}` has an fk tag but no column tag to alias the nested model")]
    MissingAlias { record: String, field: String },

    #[error("{record}: fk field `{field}` is not a model")]
    NotAModel { record: String, field: String },

    #[error("{record}: nested alias `{alias}` is used by more than one field")]
    DuplicateAlias { record: String, alias: String },

    #[error("{record}: unknown field `{field}`")]
    UnknownField { record: String, field: String },

    #[error("{record}: `{name}` contains the reserved alias separator `__`")]
    ReservedSeparator { record: String, name: String },

    #[error("{record}: `{name}` is not a valid SQL identifier")]
    InvalidIdentifier { record: String, name: String },
}

/// Errors raised while turning a condition into an expression.
///
/// Builders keep the first one they see and return it from every terminal call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("operator {0} can not be found")]
    UnknownOperator(String),

    #[error("operator {op} expects {expected}")]
    InvalidOperand { op: String, expected: &'static str },
}
