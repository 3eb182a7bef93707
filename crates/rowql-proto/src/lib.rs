//! rowql protocol types.
//!
//! This crate defines the plain data shared by every rowql layer. Nothing
//! here touches a store or a schema.
//!
//! # Modules
//!
//! - [`value`] - Runtime values and record identifiers
//! - [`record`] - The stored record shape
//! - [`query`] - Query IR: predicates, sort keys, pagination
//! - [`result`] - Result sets returned by the executor
//! - [`error`] - Conversion error types
//!
//! All types derive `serde::Serialize` and `serde::Deserialize`.

pub mod error;
pub mod query;
pub mod record;
pub mod result;
pub mod value;

pub use error::Error;

// Re-export commonly used types at crate root
pub use query::{CompareOp, NullOrdering, Pagination, Predicate, SortDirection, SortKey};
pub use record::Record;
pub use result::ResultSet;
pub use value::{FromValue, RecordId, Value};
