//! Protocol error types.

use thiserror::Error;

/// Errors raised while converting protocol values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A value could not be converted to the requested Rust type.
    #[error("cannot convert {found} value to {expected}")]
    Conversion {
        expected: &'static str,
        found: &'static str,
    },

    /// A record has no value for the requested field.
    #[error("field `{0}` is absent")]
    MissingField(String),
}
