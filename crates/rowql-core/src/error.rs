//! Core error types.

use rowql_proto::RecordId;
use thiserror::Error;

/// Errors raised by the store, the catalog and the query layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] rowql_proto::Error),

    /// Insert with an identifier that is already stored.
    #[error("duplicate key: record {0} already exists")]
    DuplicateKey(RecordId),

    /// Lookup of an identifier that is not stored.
    #[error("record {0} not found")]
    NotFound(RecordId),

    /// A value does not fit the declared type of a field.
    #[error("type mismatch on {entity}.{field}: expected {expected}, found {found}")]
    TypeMismatch {
        entity: String,
        field: String,
        expected: String,
        found: String,
    },

    /// `fetch_one` matched more than one row.
    #[error("expected at most one result, found {0}")]
    NonUniqueResult(usize),

    /// The query cannot be turned into an executable plan.
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// Entity name not registered in the catalog.
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    /// Field not declared on the entity.
    #[error("unknown field `{field}` on entity `{entity}`")]
    UnknownField { entity: String, field: String },

    /// A required field has no value.
    #[error("missing required field `{field}` on entity `{entity}`")]
    MissingField { entity: String, field: String },

    /// Every generated identifier has been handed out.
    #[error("record identifiers exhausted")]
    IdsExhausted,

    /// Invalid schema definition.
    #[error("schema error: {0}")]
    Schema(String),

    /// A page would materialize more rows than the configured budget.
    #[error("query would return {rows} rows, exceeding budget of {max}")]
    BudgetExceeded { rows: usize, max: usize },
}

impl Error {
    pub(crate) fn unknown_field(entity: &str, field: &str) -> Self {
        Error::UnknownField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }
}
