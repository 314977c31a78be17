//! Storage layer for strata records
//!
//! Couples the codec to durable storage behind the [`StorageProvider`]
//! trait: [`DiskStore`] persists records as files under a root directory,
//! [`MemoryStore`] keeps them in-process. [`save_record`] and
//! [`load_record`] move whole records between a provider and the value
//! graph, one entry per record.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod persist;
mod provider;

pub use persist::{load_record, save_record, PersistError, PersistResult};
pub use provider::{DiskStore, Entry, MemoryStore, StorageProvider, StoreError, StoreResult};
