//! Core type definitions for the catalog.

use std::fmt;

use rowql_proto::Value;
use serde::{Deserialize, Serialize};

/// Scalar data types a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
}

/// Field types - flat representation without recursion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// A scalar value.
    Scalar(ScalarType),
    /// An optional scalar value (nullable).
    OptionalScalar(ScalarType),
    /// A reference to a record of another entity.
    Reference {
        /// Name of the referenced entity.
        entity: String,
    },
    /// An optional reference.
    OptionalReference {
        /// Name of the referenced entity.
        entity: String,
    },
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32 | ScalarType::Int64 | ScalarType::Float64
        )
    }

    /// Check if values of this type support `<`, `<=`, `>`, `>=`.
    pub fn is_orderable(&self) -> bool {
        !matches!(self, ScalarType::Bool)
    }

    /// Check whether a non-null value fits this type.
    ///
    /// Integers widen into `Int64` and `Float64`.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ScalarType::Bool, Value::Bool(_))
                | (ScalarType::Int32, Value::Int32(_))
                | (ScalarType::Int64, Value::Int32(_) | Value::Int64(_))
                | (
                    ScalarType::Float64,
                    Value::Int32(_) | Value::Int64(_) | Value::Float64(_)
                )
                | (ScalarType::String, Value::String(_))
                | (ScalarType::Timestamp, Value::Timestamp(_))
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Bool => "bool",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float64 => "float64",
            ScalarType::String => "string",
            ScalarType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

impl FieldType {
    /// Create a scalar field type.
    pub fn scalar(scalar: ScalarType) -> Self {
        FieldType::Scalar(scalar)
    }

    /// Create an optional scalar field type.
    pub fn optional_scalar(scalar: ScalarType) -> Self {
        FieldType::OptionalScalar(scalar)
    }

    /// Create a reference field type.
    pub fn reference(entity: impl Into<String>) -> Self {
        FieldType::Reference {
            entity: entity.into(),
        }
    }

    /// Create an optional reference field type.
    pub fn optional_reference(entity: impl Into<String>) -> Self {
        FieldType::OptionalReference {
            entity: entity.into(),
        }
    }

    /// Check if this type is nullable.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            FieldType::OptionalScalar(_) | FieldType::OptionalReference { .. }
        )
    }

    /// Get the inner scalar type if this is a scalar-based type.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            FieldType::Scalar(s) | FieldType::OptionalScalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Get the referenced entity if this is a reference type.
    pub fn referenced_entity(&self) -> Option<&str> {
        match self {
            FieldType::Reference { entity } | FieldType::OptionalReference { entity } => {
                Some(entity)
            }
            _ => None,
        }
    }

    /// Check if values of this type support ordering comparisons.
    pub fn is_orderable(&self) -> bool {
        self.scalar_type().map(|s| s.is_orderable()).unwrap_or(false)
    }

    /// Check whether a value fits this type, null included.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => self.is_nullable(),
            (FieldType::Scalar(s) | FieldType::OptionalScalar(s), v) => s.accepts(v),
            (FieldType::Reference { .. } | FieldType::OptionalReference { .. }, v) => {
                matches!(v, Value::Ref(_))
            }
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{}", s),
            FieldType::OptionalScalar(s) => write!(f, "{}?", s),
            FieldType::Reference { entity } => write!(f, "ref<{}>", entity),
            FieldType::OptionalReference { entity } => write!(f, "ref<{}>?", entity),
        }
    }
}
