//! Mapping between Rust types and stored records.

use rowql_proto::{Record, RecordId, Value};

use crate::catalog::EntityDef;
use crate::error::Error;

/// A Rust type persisted as records of one entity.
///
/// Implementations declare the entity shape once; the store and the query
/// builder use it to persist values and to decode fetched rows.
pub trait Entity: Sized {
    /// Entity (table) name.
    const NAME: &'static str;

    /// Catalog definition for this entity.
    fn definition() -> EntityDef;

    /// Field values to persist, in declaration order.
    fn to_fields(&self) -> Vec<(String, Value)>;

    /// Rebuild a value from a stored record.
    fn from_record(record: &Record) -> Result<Self, Error>;

    /// Build the record stored under `id`.
    fn to_record(&self, id: RecordId) -> Record {
        Record::with_fields(id, Self::NAME, self.to_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, ScalarType};

    #[derive(Debug, PartialEq)]
    struct Team {
        name: String,
    }

    impl Entity for Team {
        const NAME: &'static str = "Team";

        fn definition() -> EntityDef {
            EntityDef::new(Self::NAME).with_field(FieldDef::scalar("name", ScalarType::String))
        }

        fn to_fields(&self) -> Vec<(String, Value)> {
            vec![("name".into(), self.name.clone().into())]
        }

        fn from_record(record: &Record) -> Result<Self, Error> {
            Ok(Self {
                name: record.get_as("name")?,
            })
        }
    }

    #[test]
    fn test_entity_record_mapping() {
        let team = Team {
            name: "teamA".into(),
        };
        let record = team.to_record(RecordId(5));
        assert_eq!(record.entity, "Team");
        assert_eq!(record.id, RecordId(5));
        assert!(Team::definition().check_record(&record).is_ok());
        assert_eq!(Team::from_record(&record).unwrap(), team);
    }

    #[test]
    fn test_from_record_propagates_conversion_error() {
        let record = Record::new(RecordId(1), "Team").set("name", 3);
        assert!(matches!(
            Team::from_record(&record),
            Err(Error::Protocol(_))
        ));
    }
}
