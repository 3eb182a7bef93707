//! Record type shared by the store, the executor and result sets.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value::{FromValue, RecordId, Value};

/// A single stored entity with named field values.
///
/// Fields keep their insertion order. A field that is not present reads the
/// same as an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique, immutable identifier.
    pub id: RecordId,
    /// Entity (table) name.
    pub entity: String,
    /// Field values in declaration order.
    pub fields: Vec<(String, Value)>,
}

impl Record {
    /// Create a record with no fields.
    pub fn new(id: RecordId, entity: impl Into<String>) -> Self {
        Self {
            id,
            entity: entity.into(),
            fields: Vec::new(),
        }
    }

    /// Create a record from a field list.
    pub fn with_fields(
        id: RecordId,
        entity: impl Into<String>,
        fields: Vec<(String, Value)>,
    ) -> Self {
        Self {
            id,
            entity: entity.into(),
            fields,
        }
    }

    /// Set a field, replacing any previous value.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    /// Get a field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    /// Check whether a field is null or absent.
    pub fn is_null(&self, field: &str) -> bool {
        matches!(self.get(field), None | Some(Value::Null))
    }

    /// Get a field converted to a Rust type.
    ///
    /// An absent field converts like null, so `Option<T>` yields `None`.
    pub fn get_as<T: FromValue>(&self, field: &str) -> Result<T, Error> {
        match self.get(field) {
            Some(value) => T::from_value(value),
            None => T::from_value(&Value::Null).map_err(|_| Error::MissingField(field.into())),
        }
    }

    /// Keep only the named fields, in the order given.
    ///
    /// An empty list keeps every field.
    pub fn project(&self, fields: &[String]) -> Record {
        if fields.is_empty() {
            return self.clone();
        }
        let projected = fields
            .iter()
            .map(|name| (name.clone(), self.get(name).cloned().unwrap_or(Value::Null)))
            .collect();
        Record::with_fields(self.id, self.entity.clone(), projected)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
