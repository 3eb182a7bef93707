//! Catalog of entity shapes.
//!
//! The catalog declares which fields each entity has and their types. The
//! store checks inserts against it and the query layer type-checks
//! predicates, sort keys and projections with it.

mod catalog;
mod entity;
mod field;
mod types;

pub use catalog::Catalog;
pub use entity::EntityDef;
pub use field::FieldDef;
pub use types::{FieldType, ScalarType};
