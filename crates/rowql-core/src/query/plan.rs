//! Query plans and their validation.

use std::fmt;

use rowql_proto::{NullOrdering, Pagination, Predicate, SortDirection, SortKey};
use serde::{Deserialize, Serialize};

use super::validate::{validate_predicate, validate_projection, validate_sort};
use crate::catalog::{Catalog, EntityDef};
use crate::error::Error;

/// An immutable, executable description of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Entity to scan.
    pub entity: String,
    /// Fields to project (empty = all fields).
    pub projection: Vec<String>,
    /// Filter over scanned records.
    pub predicate: Option<Predicate>,
    /// Ordering, applied before pagination.
    pub order_by: Vec<SortKey>,
    /// Window over the ordered matches.
    pub pagination: Pagination,
}

impl QueryPlan {
    /// Create a plan returning every record of `entity`.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            projection: Vec::new(),
            predicate: None,
            order_by: Vec::new(),
            pagination: Pagination::default(),
        }
    }

    /// Set the projected fields.
    pub fn with_projection(mut self, fields: Vec<String>) -> Self {
        self.projection = fields;
        self
    }

    /// Conjoin a predicate with any existing one.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Append a sort key.
    pub fn with_order(mut self, key: SortKey) -> Self {
        self.order_by.push(key);
        self
    }

    /// Set the pagination window.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// The same plan with the limit capped at `max`.
    pub fn capped(&self, max: u64) -> Self {
        let mut plan = self.clone();
        plan.pagination.limit = Some(plan.pagination.limit.map_or(max, |l| l.min(max)));
        plan
    }

    /// Number of rows the window keeps out of `total` matches.
    pub fn window_len(&self, total: u64) -> u64 {
        let available = total.saturating_sub(self.pagination.offset);
        self.pagination.limit.map_or(available, |l| l.min(available))
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.projection.is_empty() {
            write!(f, "select * from {}", self.entity)?;
        } else {
            write!(f, "select {} from {}", self.projection.join(", "), self.entity)?;
        }
        if let Some(predicate) = &self.predicate {
            write!(f, " where {}", predicate)?;
        }
        for (i, key) in self.order_by.iter().enumerate() {
            f.write_str(if i == 0 { " order by " } else { ", " })?;
            let direction = match key.direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            write!(f, "{} {}", key.field, direction)?;
            match key.nulls {
                NullOrdering::Default => {}
                NullOrdering::NullsFirst => f.write_str(" nulls first")?,
                NullOrdering::NullsLast => f.write_str(" nulls last")?,
            }
        }
        if let Some(limit) = self.pagination.limit {
            write!(f, " limit {}", limit)?;
        }
        if self.pagination.offset > 0 {
            write!(f, " offset {}", self.pagination.offset)?;
        }
        Ok(())
    }
}

/// Checks plans against a catalog.
pub struct QueryPlanner<'a> {
    catalog: &'a Catalog,
}

impl<'a> QueryPlanner<'a> {
    /// Create a planner over `catalog`.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Validate a plan and resolve its entity.
    ///
    /// An unknown entity makes the plan invalid; unknown fields and
    /// ill-typed operands are reported as such.
    pub fn validate(&self, plan: &QueryPlan) -> Result<&'a EntityDef, Error> {
        let entity = self.catalog.get_entity(&plan.entity).ok_or_else(|| {
            Error::InvalidPlan(format!("unknown entity `{}`", plan.entity))
        })?;

        validate_projection(entity, &plan.projection)?;
        if let Some(predicate) = &plan.predicate {
            validate_predicate(entity, predicate)?;
        }
        validate_sort(entity, &plan.order_by)?;
        Ok(entity)
    }
}
