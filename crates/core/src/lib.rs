//! Core types for sortable
//!
//! This crate defines the vocabulary shared by the store and the orderer:
//! - [`Value`] and [`Record`]: schemaless records with named fields
//! - [`Predicate`], [`RankRange`], [`RangeFilter`], [`Shift`]: how partitions
//!   and rank slices are addressed
//! - [`OrderingConfig`]: rank field and partition fields of one table
//! - [`Error`] / [`Result`]: the error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod predicate;
pub mod types;
pub mod value;

pub use config::{OrderingConfig, OutOfRange, DEFAULT_RANK_FIELD};
pub use error::{Error, Result};
pub use predicate::{Predicate, RangeFilter, RankRange, Shift};
pub use types::{Record, RecordKey};
pub use value::Value;
