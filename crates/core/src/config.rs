//! Ordering configuration
//!
//! One [`OrderingConfig`] describes one ordered table: which field carries the
//! rank and which fields define the partition. Configuration is passed
//! explicitly to each orderer; there is no global registry.
//!
//! ```ignore
//! use sortable_core::OrderingConfig;
//!
//! // Global ordering on `display_order`
//! let sections = OrderingConfig::default();
//!
//! // Per company+author ordering on `position`
//! let articles = OrderingConfig::new()
//!     .field("position")
//!     .condition_fields(["company_id", "author_id"]);
//!
//! // Or from TOML
//! let articles = OrderingConfig::from_toml_str(r#"
//!     field = "position"
//!     condition_fields = ["company_id", "author_id"]
//! "#)?;
//! ```

use crate::error::{Error, Result};
use crate::predicate::Predicate;
use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default name of the rank field
pub const DEFAULT_RANK_FIELD: &str = "display_order";

/// What a move does with a target rank outside `[1, N]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRange {
    /// Fail with `RankOutOfRange`; nothing changes
    #[default]
    Reject,
    /// Clamp the target into `[1, N]`
    Clamp,
    /// Apply the range shift as computed, without validation
    Unchecked,
}

/// Rank field and partition fields of one ordered table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderingConfig {
    /// Name of the rank field
    pub field: String,
    /// Partition-key fields; empty means one global partition
    pub condition_fields: Vec<String>,
    /// Handling of out-of-range move targets
    pub out_of_range: OutOfRange,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            field: DEFAULT_RANK_FIELD.to_string(),
            condition_fields: Vec::new(),
            out_of_range: OutOfRange::default(),
        }
    }
}

impl OrderingConfig {
    /// Default configuration: `display_order`, global partition
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rank field name
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Set the partition-key fields
    pub fn condition_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.condition_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the out-of-range policy
    pub fn out_of_range(mut self, policy: OutOfRange) -> Self {
        self.out_of_range = policy;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    ///
    /// The rank field must be non-empty, partition fields must be non-empty
    /// and distinct, and the rank field cannot also be a partition field.
    pub fn validate(&self) -> Result<()> {
        if self.field.trim().is_empty() {
            return Err(Error::config("rank field name is empty"));
        }
        let mut seen = HashSet::new();
        for f in &self.condition_fields {
            if f.trim().is_empty() {
                return Err(Error::config("empty partition field name"));
            }
            if f == &self.field {
                return Err(Error::config(format!(
                    "rank field '{}' cannot be a partition field",
                    f
                )));
            }
            if !seen.insert(f.as_str()) {
                return Err(Error::config(format!("duplicate partition field '{}'", f)));
            }
        }
        Ok(())
    }

    /// The partition predicate of `record` under this configuration
    pub fn partition_of(&self, record: &Record) -> Predicate {
        Predicate::for_record(&self.condition_fields, record)
    }
}
