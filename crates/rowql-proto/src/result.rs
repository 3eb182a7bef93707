//! Result types for query execution.

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::value::Value;

/// Ordered output of a query.
///
/// `total` counts every row matching the predicate, independent of the page
/// held in `records`. It is only filled in when the caller asked for it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    /// Rows of the requested page, in order.
    pub records: Vec<Record>,
    /// Total matching rows ignoring pagination, when requested.
    pub total: Option<u64>,
    /// Limit that produced this page.
    pub limit: Option<u64>,
    /// Offset that produced this page.
    pub offset: u64,
}

impl ResultSet {
    /// Create a result set holding a page of records.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            total: None,
            limit: None,
            offset: 0,
        }
    }

    /// Attach the total match count.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Record the window that produced this page.
    pub fn with_window(mut self, limit: Option<u64>, offset: u64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Number of rows in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if this page is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First row of the page.
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Values of one field across the page, null where absent.
    pub fn column(&self, field: &str) -> Vec<Value> {
        self.records
            .iter()
            .map(|r| r.get(field).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Take the rows out of the result set.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RecordId;

    #[test]
    fn test_result_set_accessors() {
        let rows = vec![
            Record::new(RecordId(1), "Member").set("username", "member1"),
            Record::new(RecordId(2), "Member"),
        ];
        let result = ResultSet::new(rows).with_total(7).with_window(Some(2), 3);

        assert_eq!(result.len(), 2);
        assert_eq!(result.total, Some(7));
        assert_eq!(result.limit, Some(2));
        assert_eq!(result.offset, 3);
        assert_eq!(result.first().map(|r| r.id), Some(RecordId(1)));
        assert_eq!(
            result.column("username"),
            vec![Value::String("member1".into()), Value::Null]
        );
        let ids: Vec<RecordId> = result.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(1), RecordId(2)]);
    }

    #[test]
    fn test_empty_result() {
        let result = ResultSet::default();
        assert!(result.is_empty());
        assert!(result.first().is_none());
        assert_eq!(result.total, None);
    }
}
