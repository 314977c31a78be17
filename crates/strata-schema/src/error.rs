//! Schema construction errors

use thiserror::Error;

/// Errors that can occur while building a [`RecordSchema`](crate::RecordSchema)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields collapse to the same wire-name under the naming policy
    #[error("duplicate wire-name '{wire_name}' in '{type_name}': fields '{first}' and '{second}' collide")]
    DuplicateWireName {
        /// Record type whose schema was being built
        type_name: String,
        /// The colliding wire-name after policy application
        wire_name: String,
        /// First field mapped to the wire-name
        first: String,
        /// Second field mapped to the same wire-name
        second: String,
    },

    /// The type has no zero-argument construction path and one cannot be synthesized
    #[error("type '{type_name}' is not constructible: no zero-argument construction path and field '{field}' is not optional")]
    UnconstructibleType {
        /// Record type whose schema was being built
        type_name: String,
        /// First included field that prevents synthesis
        field: String,
    },
}
