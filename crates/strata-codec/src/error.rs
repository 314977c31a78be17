//! Codec errors
//!
//! Every error is terminal for the operation that raised it; nothing is
//! retried or swallowed internally. Variants carry the field name, graph
//! path, or input position needed for an actionable diagnostic.

use strata_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur during encode or decode
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value graph references itself; encoding would never terminate
    #[error("cyclic value graph detected at {path}")]
    CyclicGraph {
        /// Path from the root to the repeated node
        path: String,
    },

    /// Strict decode met a wire-name the schema does not know
    #[error("unknown field '{wire_name}' in record '{type_name}'")]
    UnknownField {
        /// Record type being decoded
        type_name: String,
        /// The unrecognized wire-name
        wire_name: String,
    },

    /// A value's kind contradicts what the schema declares for the field
    #[error("type mismatch on field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Field (or graph path) where the mismatch occurred
        field: String,
        /// Kind the schema declares
        expected: String,
        /// Kind actually found
        actual: String,
    },

    /// A non-optional included field was absent from the input
    #[error("missing field '{field}' in record '{type_name}'")]
    MissingField {
        /// Record type being decoded
        type_name: String,
        /// The absent field's internal name
        field: String,
    },

    /// The reader was exhausted in the middle of a structure
    #[error("input ended mid-structure: expected {expected}")]
    IncompleteInput {
        /// What the parser was waiting for
        expected: String,
    },

    /// The input bytes do not form the textual tree grammar
    #[error("syntax error at byte {position}: {message}")]
    Syntax {
        /// Byte offset into the input
        position: usize,
        /// What went wrong
        message: String,
    },

    /// A nested field names a record type with no cached schema
    #[error("no schema registered for nested type '{type_name}'")]
    UnknownSchema {
        /// The unresolvable type name
        type_name: String,
    },

    /// Schema construction failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The caller-supplied reader or writer failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Codec operation result
pub type CodecResult<T> = Result<T, CodecError>;
