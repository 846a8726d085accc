//! Partition predicates and rank ranges
//!
//! A partition is the set of records whose partition-key fields all hold the
//! same values. It is never stored; it is described by a [`Predicate`], a
//! conjunction of `field = value` tests built fresh from a record's current
//! field values. An empty predicate matches every record (global ordering).
//!
//! Bulk rank shifts address a slice of a partition through a [`RangeFilter`]:
//! the partition predicate plus a [`RankRange`] on the rank field.

use crate::types::Record;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Bound;

/// Conjunction of field equality tests
///
/// A `Null` test matches a record whose field is unset or `Null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    conditions: Vec<(String, Value)>,
}

impl Predicate {
    /// The predicate that matches every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Build the partition predicate of `record` over `fields`
    ///
    /// # Examples
    ///
    /// ```
    /// use sortable_core::{Predicate, Record};
    ///
    /// let record = Record::new().with("company_id", 2).with("author_id", 3);
    /// let p = Predicate::for_record(&["company_id", "author_id"], &record);
    /// assert_eq!(p.to_string(), "company_id = 2 AND author_id = 3");
    /// ```
    pub fn for_record<S: AsRef<str>>(fields: &[S], record: &Record) -> Self {
        let conditions = fields
            .iter()
            .map(|f| {
                let f = f.as_ref();
                (f.to_string(), record.get(f).clone())
            })
            .collect();
        Self { conditions }
    }

    /// Add an equality test
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// The equality tests, in the order they were added
    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// True if this predicate matches every record
    pub fn is_all(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate against a record
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| record.get(field) == value)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "*");
        }
        for (i, (field, value)) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            if value.is_null() {
                write!(f, "{} IS NULL", field)?;
            } else {
                write!(f, "{} = {}", field, value)?;
            }
        }
        Ok(())
    }
}

/// Range condition on a rank value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRange {
    /// Lower bound
    pub lower: Bound<i64>,
    /// Upper bound
    pub upper: Bound<i64>,
}

impl RankRange {
    /// Every rank
    pub fn full() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Ranks strictly greater than `rank`
    pub fn above(rank: i64) -> Self {
        Self {
            lower: Bound::Excluded(rank),
            upper: Bound::Unbounded,
        }
    }

    /// `(lower, upper]`
    pub fn left_open(lower: i64, upper: i64) -> Self {
        Self {
            lower: Bound::Excluded(lower),
            upper: Bound::Included(upper),
        }
    }

    /// `[lower, upper)`
    pub fn right_open(lower: i64, upper: i64) -> Self {
        Self {
            lower: Bound::Included(lower),
            upper: Bound::Excluded(upper),
        }
    }

    /// Check whether `rank` falls in the range
    pub fn contains(&self, rank: i64) -> bool {
        let above = match self.lower {
            Bound::Included(l) => rank >= l,
            Bound::Excluded(l) => rank > l,
            Bound::Unbounded => true,
        };
        let below = match self.upper {
            Bound::Included(u) => rank <= u,
            Bound::Excluded(u) => rank < u,
            Bound::Unbounded => true,
        };
        above && below
    }
}

impl fmt::Display for RankRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lower {
            Bound::Included(l) => write!(f, "[{}", l)?,
            Bound::Excluded(l) => write!(f, "({}", l)?,
            Bound::Unbounded => write!(f, "(-inf")?,
        }
        match self.upper {
            Bound::Included(u) => write!(f, ", {}]", u),
            Bound::Excluded(u) => write!(f, ", {})", u),
            Bound::Unbounded => write!(f, ", +inf)"),
        }
    }
}

/// Target of a bulk rank shift: one partition, one rank field, one range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    /// Partition the shift is confined to
    pub partition: Predicate,
    /// Name of the rank field
    pub field: String,
    /// Ranks to shift
    pub range: RankRange,
}

impl RangeFilter {
    /// Create a filter
    pub fn new(partition: Predicate, field: impl Into<String>, range: RankRange) -> Self {
        Self {
            partition,
            field: field.into(),
            range,
        }
    }
}

impl fmt::Display for RangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} where {}", self.field, self.range, self.partition)
    }
}

/// Direction of a bulk ±1 rank adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// rank = rank + 1
    Increment,
    /// rank = rank - 1
    Decrement,
}

impl Shift {
    /// The signed delta applied to each rank
    pub fn delta(self) -> i64 {
        match self {
            Shift::Increment => 1,
            Shift::Decrement => -1,
        }
    }
}
