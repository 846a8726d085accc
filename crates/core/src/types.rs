//! Record types
//!
//! This module defines the fundamental types the ordering layer works with:
//! - [`RecordKey`]: Primary key of a stored record
//! - [`Record`]: A keyed bag of named fields, one of which is the rank

use crate::error::{Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Primary key of a stored record
///
/// Keys are assigned by the store on insert unless the caller supplies one.
///
/// # Examples
///
/// ```
/// use sortable_core::RecordKey;
///
/// let key = RecordKey::new(7);
/// assert_eq!(key.as_i64(), 7);
/// assert_eq!(key.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey(i64);

impl RecordKey {
    /// Create a key from its raw integer id
    pub fn new(id: i64) -> Self {
        RecordKey(id)
    }

    /// Get the raw integer id
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RecordKey {
    fn from(id: i64) -> Self {
        RecordKey(id)
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record: an optional key plus named fields
///
/// A record is new ([`Record::is_new`]) while it has no key. A record built
/// with [`Record::with_key`] is not new; whether it is inserted or updated is
/// decided by the table at save time. Reading a field that is not set yields
/// [`Value::Null`].
///
/// # Examples
///
/// ```
/// use sortable_core::{Record, Value};
///
/// let record = Record::new()
///     .with("company_id", 2)
///     .with("title", "bar1");
/// assert!(record.is_new());
/// assert_eq!(record.get("company_id"), &Value::Int(2));
/// assert!(record.get("missing").is_null());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key, `None` until assigned by the caller or the store
    pub key: Option<RecordKey>,
    /// Field values by name
    pub fields: BTreeMap<String, Value>,
}

static NULL: Value = Value::Null;

impl Record {
    /// Create an empty record with no key
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record addressed by `key`
    pub fn with_key(key: impl Into<RecordKey>) -> Self {
        Self {
            key: Some(key.into()),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// True while the record has no key
    pub fn is_new(&self) -> bool {
        self.key.is_none()
    }

    /// Read a field; unset fields read as `Null`
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Set a field, returning the previous value if any
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Remove a field, returning its value if it was set
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// The key of the record
    ///
    /// Fails with `MissingField` for a new record.
    pub fn require_key(&self) -> Result<RecordKey> {
        self.key.ok_or_else(|| Error::MissingField {
            field: "key".to_string(),
        })
    }

    /// Read an integer field
    ///
    /// # Errors
    ///
    /// - `MissingField` if the field is unset or `Null`
    /// - `TypeMismatch` if the field holds a non-integer value
    pub fn int(&self, field: &str) -> Result<i64> {
        match self.get(field) {
            Value::Int(i) => Ok(*i),
            Value::Null => Err(Error::MissingField {
                field: field.to_string(),
            }),
            other => Err(Error::TypeMismatch {
                field: field.to_string(),
                expected: "Int",
                actual: other.type_name(),
            }),
        }
    }
}
