//! Record descriptions and compiled schemas
//!
//! A [`RecordDescription`] is the caller-supplied, statically declared shape
//! of one record type: an ordered list of field declarations with inclusion
//! flags. [`RecordSchema::build`] compiles it against [`SchemaOptions`] into
//! an immutable schema with wire-names derived by the naming policy and an
//! O(1) reverse lookup from wire-name to field.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::field::{FieldDescriptor, FieldKind};
use crate::naming::NamingPolicy;
use crate::SchemaResult;

/// One declared field of a [`RecordDescription`]
#[derive(Debug, Clone)]
struct FieldDecl {
    name: String,
    kind: FieldKind,
    /// Properties are included by default; bare fields opt in explicitly.
    property: bool,
    /// Explicit inclusion marker for bare fields.
    include_marker: bool,
}

/// Caller-supplied description of one record type
///
/// Declarations keep their order; that order becomes the schema's field
/// order and therefore the encode order.
///
/// # Example
///
/// ```
/// use strata_schema::{FieldKind, RecordDescription, RecordSchema, SchemaOptions};
///
/// let desc = RecordDescription::new("Person")
///     .property("first_name", FieldKind::Text)
///     .property("age", FieldKind::Float)
///     .field("internal_tag", FieldKind::Text);
///
/// let schema = RecordSchema::build(&desc, &SchemaOptions::default()).unwrap();
/// assert!(schema.lookup("first_name").is_some());
/// // Bare fields without an inclusion marker are excluded.
/// assert!(!schema.lookup("internal_tag").unwrap().included());
/// ```
#[derive(Debug, Clone)]
pub struct RecordDescription {
    type_name: String,
    fields: Vec<FieldDecl>,
    zero_arg_constructible: bool,
}

impl RecordDescription {
    /// Start a description for the named record type
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            zero_arg_constructible: true,
        }
    }

    /// Declare a property: included by default
    pub fn property(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            kind,
            property: true,
            include_marker: false,
        });
        self
    }

    /// Declare a bare field: excluded unless explicitly marked or
    /// `include_all_fields` is set
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            kind,
            property: false,
            include_marker: false,
        });
        self
    }

    /// Declare a bare field carrying the explicit inclusion marker
    pub fn field_included(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            kind,
            property: false,
            include_marker: true,
        });
        self
    }

    /// State that the type has no zero-argument construction path
    ///
    /// Building the schema then fails with
    /// [`SchemaError::UnconstructibleType`] unless every included field is
    /// optional (in which case the codec can synthesize an empty record).
    pub fn no_zero_arg_constructor(mut self) -> Self {
        self.zero_arg_constructible = false;
        self
    }

    /// Name of the described record type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Options controlling schema compilation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaOptions {
    /// Include every declared field regardless of flags
    pub include_all_fields: bool,

    /// Wire-name derivation policy
    pub naming_policy: NamingPolicy,

    /// Resolve wire-names case-insensitively on decode
    pub case_insensitive_lookup: bool,
}

/// Compiled, immutable schema for one record type
///
/// Field order is the declaration order. Wire-names are unique after policy
/// application; construction fails otherwise.
#[derive(Debug)]
pub struct RecordSchema {
    type_name: String,
    fields: Vec<FieldDescriptor>,
    /// Reverse lookup wire-name -> field index. Keys are lowercased when
    /// `case_insensitive` is set.
    by_wire: FxHashMap<String, usize>,
    case_insensitive: bool,
}

impl RecordSchema {
    /// Compile a description against the given options
    pub fn build(description: &RecordDescription, options: &SchemaOptions) -> SchemaResult<Self> {
        let mut fields = Vec::with_capacity(description.fields.len());
        let mut by_wire: FxHashMap<String, usize> = FxHashMap::default();

        for (index, decl) in description.fields.iter().enumerate() {
            let included = options.include_all_fields || decl.property || decl.include_marker;
            let wire_name = options.naming_policy.apply(&decl.name);

            let key = if options.case_insensitive_lookup {
                wire_name.to_lowercase()
            } else {
                wire_name.clone()
            };
            if let Some(&other) = by_wire.get(&key) {
                let first = &description.fields[other];
                return Err(SchemaError::DuplicateWireName {
                    type_name: description.type_name.clone(),
                    wire_name,
                    first: first.name.clone(),
                    second: decl.name.clone(),
                });
            }
            by_wire.insert(key, index);

            fields.push(FieldDescriptor::new(
                decl.name.clone(),
                wire_name,
                decl.kind.clone(),
                included,
            ));
        }

        if !description.zero_arg_constructible {
            if let Some(field) = fields
                .iter()
                .find(|f| f.included() && !f.kind().is_optional())
            {
                return Err(SchemaError::UnconstructibleType {
                    type_name: description.type_name.clone(),
                    field: field.name().to_string(),
                });
            }
        }

        Ok(Self {
            type_name: description.type_name.clone(),
            fields,
            by_wire,
            case_insensitive: options.case_insensitive_lookup,
        })
    }

    /// Name of the record type this schema describes
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by wire-name
    ///
    /// Honors the case-insensitive option the schema was built with.
    pub fn lookup(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.lookup_index(wire_name).map(|i| &self.fields[i])
    }

    /// Look up a field index by wire-name
    pub fn lookup_index(&self, wire_name: &str) -> Option<usize> {
        if self.case_insensitive {
            self.by_wire.get(&wire_name.to_lowercase()).copied()
        } else {
            self.by_wire.get(wire_name).copied()
        }
    }
}
