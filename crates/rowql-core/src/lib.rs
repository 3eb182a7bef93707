//! rowql core - Record store, catalog, and query execution.
//!
//! This crate holds everything that needs a schema or a store: the
//! [`Catalog`], the in-memory [`RecordStore`], and the typed query builder
//! and executor in [`query`].

pub mod catalog;
pub mod error;
pub mod model;
pub mod query;
pub mod storage;

pub use catalog::{Catalog, EntityDef, FieldDef, FieldType, ScalarType};
pub use error::Error;
pub use model::Entity;
pub use query::{
    EntityPath, Matches, Path, Query, QueryConfig, QueryExecutor, QueryFactory, QueryPlan,
    QueryPlanner, SortComparator,
};
pub use storage::{RecordStore, Scan, StoreConfig, Transaction};

/// Re-export protocol types.
pub use rowql_proto as proto;
