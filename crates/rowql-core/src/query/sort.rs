//! Multi-key record ordering.

use std::cmp::Ordering;

use rowql_proto::{NullOrdering, Record, SortDirection, SortKey, Value};

use super::filter::compare_values;

/// Compares records lexicographically over a list of sort keys.
#[derive(Debug, Clone)]
pub struct SortComparator<'a> {
    keys: &'a [SortKey],
    default_nulls: NullOrdering,
}

impl<'a> SortComparator<'a> {
    /// Create a comparator over `keys`.
    pub fn new(keys: &'a [SortKey]) -> Self {
        Self {
            keys,
            default_nulls: NullOrdering::Default,
        }
    }

    /// Placement used for keys that leave null ordering at `Default`.
    pub fn with_default_nulls(mut self, nulls: NullOrdering) -> Self {
        self.default_nulls = nulls;
        self
    }

    /// Compare two records. `Equal` means every key ties.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for key in self.keys {
            let ord = self.compare_key(key, a.get(&key.field), b.get(&key.field));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Sort records in place. Records that tie on every key keep their
    /// relative order.
    pub fn sort(&self, records: &mut [Record]) {
        if self.keys.is_empty() {
            return;
        }
        records.sort_by(|a, b| self.compare(a, b));
    }

    fn compare_key(&self, key: &SortKey, a: Option<&Value>, b: Option<&Value>) -> Ordering {
        let a = a.filter(|v| !v.is_null());
        let b = b.filter(|v| !v.is_null());

        let nulls = match key.nulls {
            NullOrdering::Default => self.default_nulls,
            explicit => explicit,
        };

        match (a, b) {
            (None, None) => Ordering::Equal,
            (Some(a), Some(b)) => directed(key.direction, order_present(a, b)),
            (None, Some(_)) => match nulls {
                NullOrdering::NullsFirst => Ordering::Less,
                NullOrdering::NullsLast => Ordering::Greater,
                NullOrdering::Default => directed(key.direction, Ordering::Less),
            },
            (Some(_), None) => match nulls {
                NullOrdering::NullsFirst => Ordering::Greater,
                NullOrdering::NullsLast => Ordering::Less,
                NullOrdering::Default => directed(key.direction, Ordering::Greater),
            },
        }
    }
}

fn directed(direction: SortDirection, ord: Ordering) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Total order over present values. Incomparable pairs tie.
///
/// If either side is a float, both widen to `f64` and compare with
/// `total_cmp`, so NaN has a fixed place among numbers.
fn order_present(a: &Value, b: &Value) -> Ordering {
    if matches!(a, Value::Float64(_)) || matches!(b, Value::Float64(_)) {
        if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
            return x.total_cmp(&y);
        }
    }
    compare_values(a, b).unwrap_or(Ordering::Equal)
}
