//! Record persistence
//!
//! Thin glue between the codec and a [`StorageProvider`]: a record is one
//! entry in the store, holding the UTF-8 textual form the codec emits.
//! Encoding happens fully in memory before any byte reaches the provider,
//! so a failed save leaves the previous contents untouched.

use strata_codec::{decode_str, encode_to_string, CodecError, DecodeOptions, ValueNode};
use strata_schema::RecordSchema;
use thiserror::Error;

use crate::provider::{StorageProvider, StoreError};

/// Errors raised while saving or loading records
#[derive(Debug, Error)]
pub enum PersistError {
    /// The storage provider failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The record could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Persistence operation result
pub type PersistResult<T> = Result<T, PersistError>;

/// Encode the value through the schema and write it to the store
///
/// Returns the number of bytes written.
pub fn save_record(
    store: &dyn StorageProvider,
    path: &str,
    schema: &RecordSchema,
    value: &ValueNode,
) -> PersistResult<usize> {
    let text = encode_to_string(schema, value)?;
    store.write(path, text.as_bytes())?;
    tracing::debug!(path, bytes = text.len(), "saved record");
    Ok(text.len())
}

/// Read the entry from the store and decode it through the schema
pub fn load_record(
    store: &dyn StorageProvider,
    path: &str,
    schema: &RecordSchema,
    options: &DecodeOptions,
) -> PersistResult<ValueNode> {
    let data = store.read(path)?;
    let text = String::from_utf8(data).map_err(|e| CodecError::Syntax {
        position: e.utf8_error().valid_up_to(),
        message: "stored record is not valid utf-8".to_string(),
    })?;
    Ok(decode_str(schema, &text, options)?)
}
