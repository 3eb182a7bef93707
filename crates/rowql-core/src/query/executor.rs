//! Query executor for running plans against a record store.
//!
//! Execution is scan, filter, sort, window, then projection. Unsorted plans
//! stream through the scan and stop as soon as the window is full.

use rowql_proto::{NullOrdering, Record, ResultSet};
use tracing::{debug, instrument, warn};

use super::filter::FilterEvaluator;
use super::plan::{QueryPlan, QueryPlanner};
use super::sort::SortComparator;
use crate::error::Error;
use crate::storage::RecordStore;

/// Limits and defaults applied to every execution.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Maximum number of rows a single page may hold. Unbounded by default.
    pub max_rows: usize,
    /// Null placement for sort keys that do not choose one.
    pub default_nulls: NullOrdering,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_rows: usize::MAX,
            default_nulls: NullOrdering::Default,
        }
    }
}

impl QueryConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of rows a page may hold.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Set the default null placement.
    pub fn with_default_nulls(mut self, nulls: NullOrdering) -> Self {
        self.default_nulls = nulls;
        self
    }
}

/// Runs query plans against a store.
pub struct QueryExecutor<'a> {
    store: &'a RecordStore,
    config: QueryConfig,
}

impl<'a> QueryExecutor<'a> {
    /// Create an executor with the default configuration.
    pub fn new(store: &'a RecordStore) -> Self {
        Self::with_config(store, QueryConfig::default())
    }

    /// Create an executor with a custom configuration.
    pub fn with_config(store: &'a RecordStore, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Execute a plan and return the requested page.
    #[instrument(level = "debug", skip(self, plan), fields(entity = %plan.entity))]
    pub fn execute(&self, plan: &QueryPlan) -> Result<ResultSet, Error> {
        self.run(plan, false)
    }

    /// Execute a plan and also count every match, ignoring pagination.
    #[instrument(level = "debug", skip(self, plan), fields(entity = %plan.entity))]
    pub fn execute_with_total(&self, plan: &QueryPlan) -> Result<ResultSet, Error> {
        self.run(plan, true)
    }

    /// Count the records matching a plan's predicate, ignoring pagination.
    #[instrument(level = "debug", skip(self, plan), fields(entity = %plan.entity))]
    pub fn count(&self, plan: &QueryPlan) -> Result<u64, Error> {
        QueryPlanner::new(self.store.catalog()).validate(plan)?;
        let count = self.matches(plan).count() as u64;
        debug!(count, "counted matches");
        Ok(count)
    }

    fn run(&self, plan: &QueryPlan, with_total: bool) -> Result<ResultSet, Error> {
        QueryPlanner::new(self.store.catalog()).validate(plan)?;
        debug!(%plan, "executing plan");

        let (page, total) = if plan.order_by.is_empty() && !with_total {
            (self.stream_page(plan)?, None)
        } else {
            let mut rows: Vec<Record> = self.matches(plan).collect();
            let total = rows.len() as u64;
            SortComparator::new(&plan.order_by)
                .with_default_nulls(self.config.default_nulls)
                .sort(&mut rows);
            let window = plan.pagination.window(rows.len());
            self.check_budget(window.len())?;
            rows.truncate(window.end);
            rows.drain(..window.start);
            (rows, Some(total))
        };

        let records: Vec<Record> = if plan.projection.is_empty() {
            page
        } else {
            page.iter().map(|r| r.project(&plan.projection)).collect()
        };
        debug!(rows = records.len(), ?total, "plan executed");

        let result = ResultSet::new(records)
            .with_window(plan.pagination.limit, plan.pagination.offset);
        Ok(match total {
            Some(total) if with_total => result.with_total(total),
            _ => result,
        })
    }

    /// Collect an unsorted window without materializing the full match set.
    fn stream_page(&self, plan: &QueryPlan) -> Result<Vec<Record>, Error> {
        let offset = usize::try_from(plan.pagination.offset).unwrap_or(usize::MAX);
        let limit = plan
            .pagination
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        // One row past the budget is enough to know it is exceeded.
        let take = limit.min(self.config.max_rows.saturating_add(1));
        let page: Vec<Record> = self.matches(plan).skip(offset).take(take).collect();
        self.check_budget(page.len())?;
        Ok(page)
    }

    fn matches<'p>(&self, plan: &'p QueryPlan) -> Box<dyn Iterator<Item = Record> + 'p>
    where
        'a: 'p,
    {
        let scan = self.store.scan_entity(&plan.entity);
        match &plan.predicate {
            Some(predicate) => {
                Box::new(scan.filter(move |record| FilterEvaluator::evaluate(predicate, record)))
            }
            None => Box::new(scan),
        }
    }

    fn check_budget(&self, rows: usize) -> Result<(), Error> {
        if rows > self.config.max_rows {
            warn!(rows, max = self.config.max_rows, "row budget exceeded");
            return Err(Error::BudgetExceeded {
                rows,
                max: self.config.max_rows,
            });
        }
        Ok(())
    }
}
