//! Field kinds and compiled field descriptors

use serde::{Deserialize, Serialize};

/// Kind of value a field holds
///
/// The kind also declares the numeric width: `Float` fields decode as f64,
/// `Decimal` fields decode as exact arbitrary-precision decimals and are
/// never silently truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Boolean scalar
    Bool,

    /// Double-precision floating point scalar
    Float,

    /// Arbitrary-precision decimal scalar (monetary-style fields)
    Decimal,

    /// Text value
    Text,

    /// Nested record; the name resolves to a sub-schema through the schema cache
    Nested(String),

    /// Homogeneous collection of the element kind
    Collection(Box<FieldKind>),

    /// Optional value of the inner kind; absence is encoded as an explicit null
    Optional(Box<FieldKind>),
}

impl FieldKind {
    /// Human-readable kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Float => "float",
            FieldKind::Decimal => "decimal",
            FieldKind::Text => "text",
            FieldKind::Nested(_) => "record",
            FieldKind::Collection(_) => "collection",
            FieldKind::Optional(_) => "optional",
        }
    }

    /// Whether the field tolerates an absent value
    pub fn is_optional(&self) -> bool {
        matches!(self, FieldKind::Optional(_))
    }

    /// Convenience constructor for a collection of `elem`
    pub fn collection(elem: FieldKind) -> FieldKind {
        FieldKind::Collection(Box::new(elem))
    }

    /// Convenience constructor for an optional `inner`
    pub fn optional(inner: FieldKind) -> FieldKind {
        FieldKind::Optional(Box::new(inner))
    }

    /// Convenience constructor for a nested record field
    pub fn nested(type_name: impl Into<String>) -> FieldKind {
        FieldKind::Nested(type_name.into())
    }
}

/// One compiled field of a [`RecordSchema`](crate::RecordSchema)
///
/// Descriptors are immutable after schema construction. Excluded fields keep
/// a descriptor so the codec can recognize and skip them on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    wire_name: String,
    kind: FieldKind,
    included: bool,
}

impl FieldDescriptor {
    pub(crate) fn new(name: String, wire_name: String, kind: FieldKind, included: bool) -> Self {
        Self {
            name,
            wire_name,
            kind,
            included,
        }
    }

    /// Internal field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Externally visible name after naming-policy application
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Kind of value the field holds
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field participates in encode/decode
    pub fn included(&self) -> bool {
        self.included
    }
}
