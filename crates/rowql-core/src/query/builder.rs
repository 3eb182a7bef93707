//! Fluent query construction.
//!
//! A [`Query`] accumulates clauses by value. Terminal operations borrow it,
//! build a fresh [`QueryPlan`] each time and never change the builder, so
//! the same query can be fetched repeatedly.

use rowql_proto::{Pagination, Predicate, Record, ResultSet, SortKey};
use tracing::debug;

use super::executor::{QueryConfig, QueryExecutor};
use super::plan::QueryPlan;
use crate::error::Error;
use crate::model::Entity;
use crate::storage::RecordStore;

/// Entry point for building queries over a store.
///
/// ```
/// use rowql_core::catalog::{Catalog, EntityDef, FieldDef, ScalarType};
/// use rowql_core::query::{Path, QueryFactory};
/// use rowql_core::proto::Value;
/// use rowql_core::RecordStore;
///
/// let catalog = Catalog::new().with_entity(
///     EntityDef::new("Member").with_field(FieldDef::scalar("age", ScalarType::Int32)),
/// );
/// let store = RecordStore::new(catalog).unwrap();
/// store.persist("Member", vec![("age".into(), Value::Int32(10))]).unwrap();
///
/// const AGE: Path<i32> = Path::new("age");
/// let query = QueryFactory::new(&store).select_from("Member").where_(AGE.eq(10));
/// assert_eq!(query.fetch_count().unwrap(), 1);
/// ```
#[derive(Clone)]
pub struct QueryFactory<'a> {
    store: &'a RecordStore,
    config: QueryConfig,
}

impl<'a> QueryFactory<'a> {
    /// Create a factory with the default executor configuration.
    pub fn new(store: &'a RecordStore) -> Self {
        Self::with_config(store, QueryConfig::default())
    }

    /// Create a factory whose queries run with `config`.
    pub fn with_config(store: &'a RecordStore, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// Start an empty query.
    pub fn query(&self) -> Query<'a> {
        Query::new(self.store, self.config.clone())
    }

    /// Start a query projecting `fields`.
    pub fn select<I, S>(&self, fields: I) -> Query<'a>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query().select(fields)
    }

    /// Start a query over `entity`.
    pub fn from(&self, entity: impl Into<String>) -> Query<'a> {
        self.query().from(entity)
    }

    /// Start a query returning whole records of `entity`.
    pub fn select_from(&self, entity: impl Into<String>) -> Query<'a> {
        self.query().select_from(entity)
    }

    /// Start a query returning whole records of a typed entity.
    pub fn select_from_entity<E: Entity>(&self) -> Query<'a> {
        self.select_from(E::NAME)
    }
}

/// A query under construction.
#[derive(Clone)]
pub struct Query<'a> {
    store: &'a RecordStore,
    config: QueryConfig,
    projection: Vec<String>,
    entity: Option<String>,
    predicates: Vec<Predicate>,
    order_by: Vec<SortKey>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl<'a> Query<'a> {
    fn new(store: &'a RecordStore, config: QueryConfig) -> Self {
        Self {
            store,
            config,
            projection: Vec::new(),
            entity: None,
            predicates: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Project `fields`. Without a projection, whole records are returned.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the entity to query.
    pub fn from(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Query whole records of `entity`.
    pub fn select_from(self, entity: impl Into<String>) -> Self {
        self.select(Vec::<String>::new()).from(entity)
    }

    /// Add a condition. Repeated calls are conjoined.
    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Add several conditions at once, all of which must hold.
    pub fn where_all(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    /// Append sort keys, most significant first.
    pub fn order_by(mut self, keys: impl IntoIterator<Item = SortKey>) -> Self {
        self.order_by.extend(keys);
        self
    }

    /// Keep at most `limit` rows. Negative values make the plan invalid.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` rows. Negative values make the plan invalid.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build the plan the terminal operations execute.
    pub fn plan(&self) -> Result<QueryPlan, Error> {
        let entity = self.entity.clone().ok_or_else(|| {
            Error::InvalidPlan("no entity to query: call `from` or `select_from`".into())
        })?;

        let limit = self
            .limit
            .map(|limit| {
                u64::try_from(limit)
                    .map_err(|_| Error::InvalidPlan(format!("negative limit {}", limit)))
            })
            .transpose()?;
        let offset = match self.offset {
            Some(offset) => u64::try_from(offset)
                .map_err(|_| Error::InvalidPlan(format!("negative offset {}", offset)))?,
            None => 0,
        };

        let mut plan = QueryPlan::new(entity)
            .with_projection(self.projection.clone())
            .with_pagination(Pagination { limit, offset });
        plan.predicate = Predicate::all(self.predicates.iter().cloned());
        plan.order_by = self.order_by.clone();
        Ok(plan)
    }

    fn executor(&self) -> QueryExecutor<'a> {
        QueryExecutor::with_config(self.store, self.config.clone())
    }

    /// Fetch every row in the window.
    pub fn fetch(&self) -> Result<ResultSet, Error> {
        self.executor().execute(&self.plan()?)
    }

    /// Fetch the only row in the window.
    ///
    /// Returns `None` when nothing matches and fails with `NonUniqueResult`
    /// when more than one row does.
    pub fn fetch_one(&self) -> Result<Option<Record>, Error> {
        let plan = self.plan()?;
        // Two rows are enough to tell the result is not unique.
        let result = self.executor().execute_with_total(&plan.capped(2))?;
        if result.len() > 1 {
            let matched = plan.window_len(result.total.unwrap_or_default());
            debug!(matched, "fetch_one matched several rows");
            return Err(Error::NonUniqueResult(
                usize::try_from(matched).unwrap_or(usize::MAX),
            ));
        }
        Ok(result.into_records().pop())
    }

    /// Fetch the first row of the window, if any.
    pub fn fetch_first(&self) -> Result<Option<Record>, Error> {
        let plan = self.plan()?.capped(1);
        Ok(self.executor().execute(&plan)?.into_records().pop())
    }

    /// Fetch the window along with the number of rows matching overall.
    pub fn fetch_results(&self) -> Result<ResultSet, Error> {
        self.executor().execute_with_total(&self.plan()?)
    }

    /// Count the rows matching the conditions, ignoring limit and offset.
    pub fn fetch_count(&self) -> Result<u64, Error> {
        self.executor().count(&self.plan()?)
    }

    /// Fetch every row in the window decoded as `E`.
    pub fn fetch_as<E: Entity>(&self) -> Result<Vec<E>, Error> {
        self.fetch()?.iter().map(E::from_record).collect()
    }

    /// Fetch the only row in the window decoded as `E`.
    pub fn fetch_one_as<E: Entity>(&self) -> Result<Option<E>, Error> {
        self.fetch_one()?.as_ref().map(E::from_record).transpose()
    }
}
