//! In-memory record store.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rowql_proto::{Record, RecordId, Value};
use tracing::{debug, instrument};

use super::{StoreConfig, Transaction};
use crate::catalog::Catalog;
use crate::error::Error;
use crate::model::Entity;

/// Backing state of a store.
///
/// Records are kept in insertion order under a monotonically increasing
/// sequence number; `index` maps identifiers to sequence numbers.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    rows: BTreeMap<u64, Arc<Record>>,
    index: HashMap<RecordId, u64>,
    next_seq: u64,
}

/// A table of records with lookup by identifier.
///
/// Every operation takes the internal lock for its own duration only, so a
/// reader never observes a partially written record. Sequencing several
/// operations atomically is left to the caller.
pub struct RecordStore {
    catalog: Catalog,
    config: StoreConfig,
    tables: RwLock<Tables>,
    next_id: AtomicU64,
}

impl RecordStore {
    /// Create a store with the default configuration.
    pub fn new(catalog: Catalog) -> Result<Self, Error> {
        Self::open(catalog, StoreConfig::default())
    }

    /// Create a store with the given configuration.
    ///
    /// The catalog is validated up front.
    pub fn open(catalog: Catalog, config: StoreConfig) -> Result<Self, Error> {
        catalog.validate()?;
        debug!(entities = catalog.len(), "opening record store");
        let next_id = AtomicU64::new(config.first_id);
        Ok(Self {
            catalog,
            config,
            tables: RwLock::new(Tables::default()),
            next_id,
        })
    }

    /// The catalog this store validates against.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Reserve a fresh identifier.
    ///
    /// Fails with `IdsExhausted` once the counter reaches `u64::MAX`; the
    /// counter never wraps.
    pub fn next_id(&self) -> Result<RecordId, Error> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map(RecordId)
            .map_err(|_| Error::IdsExhausted)
    }

    /// Insert a record under its own identifier.
    ///
    /// Fails with `DuplicateKey` if the identifier is already stored.
    #[instrument(level = "debug", skip(self, record), fields(entity = %record.entity, id = %record.id))]
    pub fn insert(&self, record: Record) -> Result<RecordId, Error> {
        if self.config.validate_on_insert {
            self.catalog.entity(&record.entity)?.check_record(&record)?;
        }

        let id = record.id;
        {
            let mut tables = self.tables.write();
            if tables.index.contains_key(&id) {
                return Err(Error::DuplicateKey(id));
            }
            let seq = tables.next_seq;
            tables.next_seq += 1;
            tables.index.insert(id, seq);
            tables.rows.insert(seq, Arc::new(record));
        }

        // Keep generated identifiers clear of explicitly chosen ones.
        self.next_id
            .fetch_max(id.get().saturating_add(1), Ordering::SeqCst);
        Ok(id)
    }

    /// Insert a new record of `entity` under a generated identifier.
    pub fn persist(
        &self,
        entity: &str,
        fields: Vec<(String, Value)>,
    ) -> Result<RecordId, Error> {
        let id = self.next_id()?;
        self.insert(Record::with_fields(id, entity, fields))
    }

    /// Insert a typed entity under a generated identifier.
    pub fn persist_entity<E: Entity>(&self, entity: &E) -> Result<RecordId, Error> {
        let id = self.next_id()?;
        self.insert(entity.to_record(id))
    }

    /// Get a record by identifier.
    pub fn get(&self, id: RecordId) -> Result<Record, Error> {
        self.lookup(id).ok_or(Error::NotFound(id))
    }

    /// Get a record by identifier and decode it as `E`.
    pub fn load<E: Entity>(&self, id: RecordId) -> Result<E, Error> {
        let record = self.get(id)?;
        if record.entity != E::NAME {
            return Err(Error::Schema(format!(
                "record {} belongs to `{}`, not `{}`",
                id,
                record.entity,
                E::NAME
            )));
        }
        E::from_record(&record)
    }

    /// Check whether an identifier is stored.
    pub fn contains(&self, id: RecordId) -> bool {
        self.tables.read().index.contains_key(&id)
    }

    /// Remove a record.
    ///
    /// Records referencing it are left untouched; their references resolve
    /// to nothing afterwards.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&self, id: RecordId) -> Result<Record, Error> {
        let mut tables = self.tables.write();
        let seq = tables.index.remove(&id).ok_or(Error::NotFound(id))?;
        let record = tables.rows.remove(&seq).ok_or(Error::NotFound(id))?;
        Ok(Arc::unwrap_or_clone(record))
    }

    /// Number of stored records across all entities.
    pub fn len(&self) -> usize {
        self.tables.read().rows.len()
    }

    /// Check if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.tables.read().rows.is_empty()
    }

    /// Lazily scan every record in insertion order.
    pub fn scan(&self) -> Scan<'_> {
        Scan::new(self, None)
    }

    /// Lazily scan the records of one entity in insertion order.
    pub fn scan_entity(&self, entity: &str) -> Scan<'_> {
        Scan::new(self, Some(entity.to_string()))
    }

    /// Resolve a reference field to the record it points at.
    ///
    /// Returns `None` when the field is null or absent, or when the
    /// referenced record no longer exists.
    pub fn follow(&self, record: &Record, field: &str) -> Result<Option<Record>, Error> {
        match record.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Ref(id)) => Ok(self.lookup(*id)),
            Some(other) => Err(Error::TypeMismatch {
                entity: record.entity.clone(),
                field: field.to_string(),
                expected: "ref".to_string(),
                found: other.kind().to_string(),
            }),
        }
    }

    /// Start a transaction that rolls the store back when dropped.
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::new(self)
    }

    fn lookup(&self, id: RecordId) -> Option<Record> {
        let tables = self.tables.read();
        let seq = tables.index.get(&id)?;
        tables.rows.get(seq).map(|r| Record::clone(r))
    }

    pub(crate) fn snapshot(&self) -> (Tables, u64) {
        let tables = self.tables.read().clone();
        (tables, self.next_id.load(Ordering::SeqCst))
    }

    pub(crate) fn restore(&self, tables: Tables, next_id: u64) {
        *self.tables.write() = tables;
        self.next_id.store(next_id, Ordering::SeqCst);
    }

    /// Next record after `cursor` (exclusive), optionally of one entity.
    fn next_after(&self, cursor: Option<u64>, entity: Option<&str>) -> Option<(u64, Record)> {
        let tables = self.tables.read();
        let lower = match cursor {
            Some(seq) => Bound::Excluded(seq),
            None => Bound::Unbounded,
        };
        tables
            .rows
            .range((lower, Bound::Unbounded))
            .find(|(_, record)| entity.map_or(true, |e| record.entity == e))
            .map(|(seq, record)| (*seq, Record::clone(record)))
    }
}

/// Lazy, restartable scan over a store.
///
/// Each step re-reads the store, so records inserted ahead of the cursor
/// during the scan are visible and removed ones are skipped. Every yielded
/// record is a complete copy.
#[derive(Clone)]
pub struct Scan<'a> {
    store: &'a RecordStore,
    entity: Option<String>,
    cursor: Option<u64>,
}

impl<'a> Scan<'a> {
    fn new(store: &'a RecordStore, entity: Option<String>) -> Self {
        Self {
            store,
            entity,
            cursor: None,
        }
    }
}

impl Iterator for Scan<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let (seq, record) = self.store.next_after(self.cursor, self.entity.as_deref())?;
        self.cursor = Some(seq);
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, FieldDef, ScalarType};

    fn test_store() -> RecordStore {
        let catalog = Catalog::new()
            .with_entity(
                EntityDef::new("Team").with_field(FieldDef::scalar("name", ScalarType::String)),
            )
            .with_entity(
                EntityDef::new("Member")
                    .with_field(FieldDef::optional_scalar("username", ScalarType::String))
                    .with_field(FieldDef::scalar("age", ScalarType::Int32))
                    .with_field(FieldDef::reference("team", "Team")),
            );
        RecordStore::new(catalog).unwrap()
    }

    fn member(username: &str, age: i32) -> Vec<(String, Value)> {
        vec![
            ("username".into(), username.into()),
            ("age".into(), age.into()),
        ]
    }

    #[test]
    fn test_insert_and_get() {
        let store = test_store();
        let id = store.persist("Member", member("member1", 10)).unwrap();

        let record = store.get(id).unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.get("username"), Some(&Value::String("member1".into())));
        assert!(store.contains(id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_key() {
        let store = test_store();
        let record = Record::new(RecordId(7), "Member").set("age", 1);
        store.insert(record.clone()).unwrap();
        assert_eq!(store.insert(record), Err(Error::DuplicateKey(RecordId(7))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_generated_ids_skip_explicit_ones() {
        let store = test_store();
        store
            .insert(Record::new(RecordId(10), "Member").set("age", 1))
            .unwrap();
        let id = store.persist("Member", member("m", 2)).unwrap();
        assert_eq!(id, RecordId(11));
    }

    #[test]
    fn test_ids_exhausted_does_not_wrap() {
        let store = test_store();
        let last = RecordId(u64::MAX);
        store
            .insert(Record::new(last, "Member").set("age", 1))
            .unwrap();

        assert_eq!(store.next_id(), Err(Error::IdsExhausted));
        assert_eq!(
            store.persist("Member", member("late", 2)),
            Err(Error::IdsExhausted)
        );
        assert_eq!(store.next_id(), Err(Error::IdsExhausted));
        assert_eq!(store.len(), 1);

        // Explicit identifiers are still accepted.
        store
            .insert(Record::new(RecordId(5), "Member").set("age", 3))
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_not_found() {
        let store = test_store();
        assert_eq!(store.get(RecordId(99)), Err(Error::NotFound(RecordId(99))));
        assert_eq!(store.remove(RecordId(99)), Err(Error::NotFound(RecordId(99))));
    }

    #[test]
    fn test_insert_validates_against_catalog() {
        let store = test_store();
        assert!(matches!(
            store.persist("Order", vec![]),
            Err(Error::UnknownEntity(_))
        ));
        assert!(matches!(
            store.persist("Member", vec![("age".into(), "old".into())]),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(store.is_empty());

        let lax = RecordStore::open(Catalog::new(), StoreConfig::new().without_validation())
            .unwrap();
        assert!(lax.persist("Anything", vec![("x".into(), Value::Int32(1))]).is_ok());
    }

    #[test]
    fn test_scan_is_ordered_and_restartable() {
        let store = test_store();
        let team = store
            .persist("Team", vec![("name".into(), "teamA".into())])
            .unwrap();
        let a = store.persist("Member", member("a", 1)).unwrap();
        let b = store.persist("Member", member("b", 2)).unwrap();

        let all: Vec<RecordId> = store.scan().map(|r| r.id).collect();
        assert_eq!(all, vec![team, a, b]);

        let members: Vec<RecordId> = store.scan_entity("Member").map(|r| r.id).collect();
        assert_eq!(members, vec![a, b]);

        // A fresh scan reflects later mutations.
        store.remove(a).unwrap();
        let members: Vec<RecordId> = store.scan_entity("Member").map(|r| r.id).collect();
        assert_eq!(members, vec![b]);
    }

    #[test]
    fn test_scan_sees_records_inserted_ahead_of_cursor() {
        let store = test_store();
        store.persist("Member", member("a", 1)).unwrap();

        let mut scan = store.scan_entity("Member");
        assert!(scan.next().is_some());
        let late = store.persist("Member", member("late", 2)).unwrap();
        assert_eq!(scan.next().map(|r| r.id), Some(late));
        assert!(scan.next().is_none());
    }

    #[test]
    fn test_follow_reference() {
        let store = test_store();
        let team = store
            .persist("Team", vec![("name".into(), "teamA".into())])
            .unwrap();
        let mut fields = member("member1", 10);
        fields.push(("team".into(), team.into()));
        let id = store.persist("Member", fields).unwrap();
        let record = store.get(id).unwrap();

        let resolved = store.follow(&record, "team").unwrap().unwrap();
        assert_eq!(resolved.get("name"), Some(&Value::String("teamA".into())));

        // No cascade: the member survives and the reference dangles.
        store.remove(team).unwrap();
        assert!(store.contains(id));
        assert_eq!(store.follow(&record, "team").unwrap(), None);

        assert!(matches!(
            store.follow(&record, "age"),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_concurrent_inserts() {
        let store = Arc::new(test_store());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store
                            .persist("Member", member(&format!("m{}-{}", t, i), i))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 200);
        assert_eq!(store.scan_entity("Member").count(), 200);
    }
}
