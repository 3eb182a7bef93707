//! Field definitions for entities.

use super::types::{FieldType, ScalarType};
use serde::{Deserialize, Serialize};

/// A field definition within an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
}

impl FieldDef {
    /// Create a new field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Create a non-nullable scalar field.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(scalar))
    }

    /// Create a nullable scalar field.
    pub fn optional_scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::OptionalScalar(scalar))
    }

    /// Create a nullable reference to another entity.
    pub fn reference(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::new(name, FieldType::optional_reference(entity))
    }

    /// Whether a record must carry a non-null value for this field.
    pub fn is_required(&self) -> bool {
        !self.field_type.is_nullable()
    }
}
