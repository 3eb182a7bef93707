//! Catalog of entity definitions.

use std::collections::HashMap;

use super::EntityDef;
use crate::error::Error;
use crate::model::Entity;

/// The set of entities a store knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Entity definitions keyed by name.
    entities: HashMap<String, EntityDef>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, replacing any definition with the same name.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Add the definition of a typed entity.
    pub fn with_entity_type<E: Entity>(self) -> Self {
        self.with_entity(E::definition())
    }

    /// Register an entity, failing if the name is taken or the definition is invalid.
    pub fn register(&mut self, entity: EntityDef) -> Result<(), Error> {
        if self.entities.contains_key(&entity.name) {
            return Err(Error::Schema(format!(
                "entity `{}` is already registered",
                entity.name
            )));
        }
        entity.validate()?;
        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// Get an entity by name, failing with `UnknownEntity`.
    pub fn entity(&self, name: &str) -> Result<&EntityDef, Error> {
        self.get_entity(name)
            .ok_or_else(|| Error::UnknownEntity(name.to_string()))
    }

    /// List all entity names, sorted.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if no entity is registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Validate every definition and every reference target.
    pub fn validate(&self) -> Result<(), Error> {
        for entity in self.entities.values() {
            entity.validate()?;
            for field in &entity.fields {
                if let Some(target) = field.field_type.referenced_entity() {
                    if !self.entities.contains_key(target) {
                        return Err(Error::Schema(format!(
                            "field `{}.{}` references unknown entity `{}`",
                            entity.name, field.name, target
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
