//! Query construction and execution.
//!
//! Queries are built with [`QueryFactory`] and [`Query`], checked against the
//! catalog by [`QueryPlanner`], and run by [`QueryExecutor`]: a scan of one
//! entity, filtered by a conjunctive [`Predicate`](rowql_proto::Predicate),
//! ordered by [`SortComparator`], then windowed and projected.

mod builder;
mod executor;
mod filter;
mod path;
mod plan;
mod sort;
mod validate;

pub use builder::{Query, QueryFactory};
pub use executor::{QueryConfig, QueryExecutor};
pub use filter::{like_match, FilterEvaluator, Matches};
pub use path::{EntityPath, FieldKind, Orderable, Path};
pub use plan::{QueryPlan, QueryPlanner};
pub use sort::SortComparator;
pub use validate::{validate_predicate, validate_projection, validate_sort};
