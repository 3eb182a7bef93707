//! Entity definitions.

use super::field::FieldDef;
use crate::error::Error;
use rowql_proto::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An entity definition (table schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity name (unique within the catalog).
    pub name: String,
    /// Field definitions.
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the entity.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a field by name, failing with `UnknownField`.
    pub fn field(&self, name: &str) -> Result<&FieldDef, Error> {
        self.get_field(name)
            .ok_or_else(|| Error::unknown_field(&self.name, name))
    }

    /// Check that field names are unique.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::Schema(format!(
                    "entity `{}` declares field `{}` twice",
                    self.name, field.name
                )));
            }
        }
        Ok(())
    }

    /// Check a record against this definition.
    ///
    /// Every stored field must be declared and fit its type, and every
    /// required field must be present and non-null.
    pub fn check_record(&self, record: &Record) -> Result<(), Error> {
        if record.entity != self.name {
            return Err(Error::Schema(format!(
                "record {} belongs to `{}`, not `{}`",
                record.id, record.entity, self.name
            )));
        }

        for (name, value) in &record.fields {
            let def = self.field(name)?;
            if !def.field_type.accepts(value) {
                return Err(Error::TypeMismatch {
                    entity: self.name.clone(),
                    field: name.clone(),
                    expected: def.field_type.to_string(),
                    found: value.kind().to_string(),
                });
            }
        }

        for def in self.fields.iter().filter(|f| f.is_required()) {
            if record.is_null(&def.name) {
                return Err(Error::MissingField {
                    entity: self.name.clone(),
                    field: def.name.clone(),
                });
            }
        }

        Ok(())
    }
}
