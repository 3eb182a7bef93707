//! Query IR: predicates, sort keys and pagination.
//!
//! These are plain data. Type checking against a schema and evaluation live in
//! `rowql-core`; the constructors here do no validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Comparison operators usable in [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CompareOp {
    /// Whether the operator needs an ordering rather than just equality.
    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Ne)
    }

    /// SQL-style symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// A boolean condition over record fields.
///
/// Composition is conjunction only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Field equals value.
    Eq { field: String, value: Value },
    /// Field compared to value with an operator.
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    /// Field is null or absent.
    IsNull { field: String },
    /// Field is present and not null.
    IsNotNull { field: String },
    /// String field matches a LIKE pattern.
    Like { field: String, pattern: String },
    /// Both sides must hold.
    And(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// Create an equality predicate.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a comparison predicate.
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Create an IS NULL predicate.
    pub fn is_null(field: impl Into<String>) -> Self {
        Predicate::IsNull {
            field: field.into(),
        }
    }

    /// Create an IS NOT NULL predicate.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Predicate::IsNotNull {
            field: field.into(),
        }
    }

    /// Create a LIKE predicate.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Predicate::Like {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Conjoin with another predicate.
    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// Conjoin a list of predicates, left to right.
    ///
    /// Returns `None` for an empty list.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        predicates.into_iter().reduce(Predicate::and)
    }

    /// Visit every atomic (non-`And`) predicate, left to right.
    pub fn atoms(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            Predicate::And(left, right) => {
                left.collect_atoms(out);
                right.collect_atoms(out);
            }
            atom => out.push(atom),
        }
    }

    /// Field referenced by an atomic predicate; `None` for `And`.
    pub fn field(&self) -> Option<&str> {
        match self {
            Predicate::Eq { field, .. }
            | Predicate::Compare { field, .. }
            | Predicate::IsNull { field }
            | Predicate::IsNotNull { field }
            | Predicate::Like { field, .. } => Some(field),
            Predicate::And(..) => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq { field, value } => write!(f, "{} = {}", field, value),
            Predicate::Compare { field, op, value } => {
                write!(f, "{} {} {}", field, op.symbol(), value)
            }
            Predicate::IsNull { field } => write!(f, "{} is null", field),
            Predicate::IsNotNull { field } => write!(f, "{} is not null", field),
            Predicate::Like { field, pattern } => write!(f, "{} like {:?}", field, pattern),
            Predicate::And(left, right) => write!(f, "({} and {})", left, right),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Placement of null values within a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NullOrdering {
    /// Null sorts as the lowest value, so the direction applies to it.
    #[default]
    Default,
    /// Nulls before every present value, in either direction.
    NullsFirst,
    /// Nulls after every present value, in either direction.
    NullsLast,
}

/// One key of an ORDER BY clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    /// Field to order by.
    pub field: String,
    /// Sort direction.
    pub direction: SortDirection,
    /// Null placement.
    pub nulls: NullOrdering,
}

impl SortKey {
    /// Create an ascending sort key.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
            nulls: NullOrdering::Default,
        }
    }

    /// Create a descending sort key.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
            nulls: NullOrdering::Default,
        }
    }

    /// Place nulls before present values.
    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullOrdering::NullsFirst;
        self
    }

    /// Place nulls after present values.
    pub fn nulls_last(mut self) -> Self {
        self.nulls = NullOrdering::NullsLast;
        self
    }
}

/// Offset/limit window over an ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of rows to return; `None` is unbounded.
    pub limit: Option<u64>,
    /// Number of rows to skip.
    pub offset: u64,
}

impl Pagination {
    /// Create pagination with limit and offset.
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    /// Create pagination with just a limit.
    pub fn limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: 0,
        }
    }

    /// Whether this window keeps every row.
    pub fn is_unbounded(&self) -> bool {
        self.limit.is_none() && self.offset == 0
    }

    /// Index range selected from a sequence of `len` rows.
    pub fn window(&self, len: usize) -> std::ops::Range<usize> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(len);
        let end = match self.limit {
            Some(limit) => start.saturating_add(usize::try_from(limit).unwrap_or(usize::MAX)),
            None => len,
        };
        start..end.min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_chain() {
        let pred = Predicate::eq("username", "member1").and(Predicate::eq("age", 10));
        let atoms = pred.atoms();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].field(), Some("username"));
        assert_eq!(atoms[1].field(), Some("age"));
        assert_eq!(pred.field(), None);
        assert_eq!(pred.to_string(), "(username = \"member1\" and age = 10)");
    }

    #[test]
    fn test_all() {
        assert!(Predicate::all(vec![]).is_none());
        let pred = Predicate::all(vec![
            Predicate::eq("a", 1),
            Predicate::compare("b", CompareOp::Gt, 2),
            Predicate::is_null("c"),
        ])
        .unwrap();
        assert_eq!(pred.atoms().len(), 3);
        assert_eq!(pred.to_string(), "((a = 1 and b > 2) and c is null)");
    }

    #[test]
    fn test_sort_key_builders() {
        let key = SortKey::asc("username").nulls_last();
        assert_eq!(key.direction, SortDirection::Asc);
        assert_eq!(key.nulls, NullOrdering::NullsLast);
        assert_eq!(SortKey::desc("age").nulls, NullOrdering::Default);
    }

    #[test]
    fn test_pagination_window() {
        assert_eq!(Pagination::default().window(5), 0..5);
        assert!(Pagination::default().is_unbounded());
        assert_eq!(Pagination::limit(2).window(5), 0..2);
        assert_eq!(Pagination::new(2, 4).window(5), 4..5);
        assert_eq!(Pagination::new(2, 9).window(5), 5..5);
        assert_eq!(Pagination::new(u64::MAX, 1).window(5), 1..5);
    }

    #[test]
    fn test_predicate_serialization() {
        let pred = Predicate::eq("age", 100).and(Predicate::is_not_null("username"));
        let json = serde_json::to_string(&pred).unwrap();
        let back: Predicate = serde_json::from_str(&json).unwrap();
        assert_eq!(pred, back);
    }
}
