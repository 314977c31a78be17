//! Strata schema layer
//!
//! This crate describes record types to the Strata codec:
//! - Field declarations with inclusion flags (properties are included by
//!   default, bare fields opt in explicitly)
//! - Naming policies that derive externally visible wire-names
//! - Compiled [`RecordSchema`]s with O(1) wire-name lookup
//! - A process-wide schema cache keyed by type name
//!
//! Schemas are built once from an explicit [`RecordDescription`] supplied by
//! the caller; there is no runtime type introspection.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod error;
pub mod field;
pub mod naming;
pub mod schema;

pub use cache::SchemaCache;
pub use error::SchemaError;
pub use field::{FieldDescriptor, FieldKind};
pub use naming::NamingPolicy;
pub use schema::{RecordDescription, RecordSchema, SchemaOptions};

/// Schema construction result
pub type SchemaResult<T> = Result<T, SchemaError>;
