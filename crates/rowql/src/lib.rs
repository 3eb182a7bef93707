//! rowql - typed, composable queries over an in-process record store.
//!
//! Declare entities in a [`Catalog`], seed records into a [`Database`], then
//! build queries fluently and run one of the terminal operations.
//!
//! ```
//! use rowql::prelude::*;
//!
//! const USERNAME: Path<Option<String>> = Path::new("username");
//! const AGE: Path<i32> = Path::new("age");
//!
//! let catalog = Catalog::new().with_entity(
//!     EntityDef::new("Member")
//!         .with_field(FieldDef::optional_scalar("username", ScalarType::String))
//!         .with_field(FieldDef::scalar("age", ScalarType::Int32)),
//! );
//! let db = Database::open(catalog)?;
//! db.store().persist(
//!     "Member",
//!     vec![("username".into(), "member1".into()), ("age".into(), Value::Int32(10))],
//! )?;
//!
//! let found = db
//!     .query()
//!     .select_from("Member")
//!     .where_all([USERNAME.eq("member1"), AGE.eq(10)])
//!     .fetch_one()?;
//! assert!(found.is_some());
//! # Ok::<(), rowql::Error>(())
//! ```

use tracing::info;

pub use rowql_core::catalog::{Catalog, EntityDef, FieldDef, FieldType, ScalarType};
pub use rowql_core::query::{
    like_match, EntityPath, FieldKind, FilterEvaluator, Matches, Orderable, Path, Query,
    QueryConfig, QueryExecutor, QueryFactory, QueryPlan, QueryPlanner, SortComparator,
};
pub use rowql_core::{Entity, Error, RecordStore, Scan, StoreConfig, Transaction};
pub use rowql_proto::{
    CompareOp, FromValue, NullOrdering, Pagination, Predicate, Record, RecordId, ResultSet,
    SortDirection, SortKey, Value,
};

/// Re-export of the protocol crate.
pub use rowql_proto as proto;

/// Everything needed to declare entities and run queries.
pub mod prelude {
    pub use crate::{
        Catalog, CompareOp, Database, Entity, EntityDef, Error, FieldDef, Path, Predicate,
        Query, QueryConfig, Record, RecordId, ResultSet, ScalarType, SortKey, StoreConfig,
        Value,
    };
}

/// A record store bundled with the configuration its queries run under.
pub struct Database {
    store: RecordStore,
    query_config: QueryConfig,
}

impl Database {
    /// Open an empty database with default configuration.
    pub fn open(catalog: Catalog) -> Result<Self, Error> {
        Self::open_with(catalog, StoreConfig::default(), QueryConfig::default())
    }

    /// Open an empty database with explicit configuration.
    pub fn open_with(
        catalog: Catalog,
        store_config: StoreConfig,
        query_config: QueryConfig,
    ) -> Result<Self, Error> {
        let entities = catalog.len();
        let store = RecordStore::open(catalog, store_config)?;
        info!(entities, max_rows = query_config.max_rows, "opened database");
        Ok(Self {
            store,
            query_config,
        })
    }

    /// The underlying record store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Query configuration applied to every query.
    pub fn query_config(&self) -> &QueryConfig {
        &self.query_config
    }

    /// Start building queries.
    pub fn query(&self) -> QueryFactory<'_> {
        QueryFactory::with_config(&self.store, self.query_config.clone())
    }

    /// Persist a typed entity under a fresh identifier.
    pub fn persist<E: Entity>(&self, entity: &E) -> Result<RecordId, Error> {
        self.store.persist_entity(entity)
    }

    /// Load a typed entity by identifier.
    pub fn find<E: Entity>(&self, id: RecordId) -> Result<E, Error> {
        self.store.load(id)
    }

    /// Start a transaction that rolls back unless committed.
    pub fn begin(&self) -> Transaction<'_> {
        self.store.begin()
    }
}
