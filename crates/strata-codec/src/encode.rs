//! Schema-driven encoder
//!
//! Walks a value graph depth-first and writes the textual tree format.
//! Record fields are emitted in schema order, excluded fields are skipped,
//! and an absent optional value becomes an explicit `null` so the decoded
//! shape matches the encoded one. Pass-through fields captured by a
//! previous non-strict decode are re-emitted after the schema fields with
//! their original wire-names.
//!
//! Shared handles ([`ValueNode::Link`]) are followed through an identity
//! set: re-entering a handle that is still being encoded means the graph is
//! cyclic and encoding fails instead of looping.

use std::fmt::Write as _;
use std::io::Write;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use strata_schema::{FieldKind, RecordSchema, SchemaCache};

use crate::error::{CodecError, CodecResult};
use crate::value::{Number, SharedNode, ValueNode};

/// Encode a value graph through the schema into the writer
///
/// Returns the number of bytes written.
pub fn encode(
    schema: &RecordSchema,
    value: &ValueNode,
    writer: &mut dyn Write,
) -> CodecResult<usize> {
    let text = encode_to_string(schema, value)?;
    writer.write_all(text.as_bytes())?;
    Ok(text.len())
}

/// Encode a value graph through the schema into a string
pub fn encode_to_string(schema: &RecordSchema, value: &ValueNode) -> CodecResult<String> {
    tracing::trace!(type_name = schema.type_name(), "encoding record");
    let mut encoder = Encoder {
        cache: SchemaCache::global(),
        out: String::new(),
        active: FxHashSet::default(),
        path: Vec::new(),
    };
    encoder.root(schema, value)?;
    Ok(encoder.out)
}

/// Encoder state threaded through the recursive walk
struct Encoder {
    cache: &'static SchemaCache,
    out: String,
    /// Identity set of live shared handles on the current walk path
    active: FxHashSet<usize>,
    path: Vec<String>,
}

impl Encoder {
    fn root(&mut self, schema: &RecordSchema, value: &ValueNode) -> CodecResult<()> {
        match value {
            ValueNode::Link(handle) => self.follow(handle, |enc, inner| enc.root(schema, inner)),
            ValueNode::Record(pairs) => self.record_body(schema, pairs),
            other => Err(self.mismatch("record", other)),
        }
    }

    fn record_body(
        &mut self,
        schema: &RecordSchema,
        pairs: &[(String, ValueNode)],
    ) -> CodecResult<()> {
        self.out.push('{');
        let mut first = true;

        for desc in schema.fields() {
            if !desc.included() {
                continue;
            }
            if !first {
                self.out.push_str(", ");
            }
            first = false;

            self.push_key(desc.wire_name());
            self.out.push_str(": ");
            self.path.push(desc.name().to_string());
            match pairs.iter().find(|(name, _)| name == desc.name()) {
                Some((_, value)) => self.node(desc.kind(), value)?,
                None if desc.kind().is_optional() => self.out.push_str("null"),
                None => {
                    return Err(CodecError::MissingField {
                        type_name: schema.type_name().to_string(),
                        field: desc.name().to_string(),
                    });
                }
            }
            self.path.pop();
        }

        let known: FxHashSet<&str> = schema.fields().iter().map(|f| f.name()).collect();
        for (name, value) in pairs {
            if known.contains(name.as_str()) {
                continue;
            }
            if !first {
                self.out.push_str(", ");
            }
            first = false;
            self.push_key(name);
            self.out.push_str(": ");
            self.path.push(name.clone());
            self.untyped(value)?;
            self.path.pop();
        }

        self.out.push('}');
        Ok(())
    }

    fn node(&mut self, kind: &FieldKind, value: &ValueNode) -> CodecResult<()> {
        if let ValueNode::Link(handle) = value {
            return self.follow(handle, |enc, inner| enc.node(kind, inner));
        }

        match kind {
            FieldKind::Optional(inner) => {
                if value.is_null() {
                    self.out.push_str("null");
                    Ok(())
                } else {
                    self.node(inner, value)
                }
            }
            FieldKind::Bool => match value {
                ValueNode::Bool(b) => {
                    self.out.push_str(if *b { "true" } else { "false" });
                    Ok(())
                }
                other => Err(self.mismatch("bool", other)),
            },
            FieldKind::Float => match value {
                ValueNode::Number(Number::Float(n)) if n.is_finite() => {
                    // f64 Display round-trips through the grammar's decimal
                    // literals.
                    write!(self.out, "{}", n).unwrap();
                    Ok(())
                }
                ValueNode::Number(Number::Float(_)) => Err(CodecError::TypeMismatch {
                    field: self.path_string(),
                    expected: "finite float".to_string(),
                    actual: "non-finite float".to_string(),
                }),
                other => Err(self.mismatch("float", other)),
            },
            FieldKind::Decimal => match value {
                ValueNode::Number(Number::Decimal(d)) => {
                    write!(self.out, "{}", d).unwrap();
                    Ok(())
                }
                other => Err(self.mismatch("decimal", other)),
            },
            FieldKind::Text => match value {
                ValueNode::Text(s) => {
                    self.push_quoted(s);
                    Ok(())
                }
                other => Err(self.mismatch("text", other)),
            },
            FieldKind::Collection(elem) => match value {
                ValueNode::Collection(items) => {
                    self.out.push('[');
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.path.push(format!("[{}]", i));
                        self.node(elem, item)?;
                        self.path.pop();
                    }
                    self.out.push(']');
                    Ok(())
                }
                other => Err(self.mismatch("collection", other)),
            },
            FieldKind::Nested(type_name) => match value {
                ValueNode::Record(pairs) => {
                    let sub = self.cache.get(type_name).ok_or_else(|| {
                        CodecError::UnknownSchema {
                            type_name: type_name.clone(),
                        }
                    })?;
                    self.record_body(&sub, pairs)
                }
                other => Err(self.mismatch("record", other)),
            },
        }
    }

    /// Emit a node without schema guidance (pass-through children)
    fn untyped(&mut self, value: &ValueNode) -> CodecResult<()> {
        match value {
            ValueNode::Null => {
                self.out.push_str("null");
                Ok(())
            }
            ValueNode::Bool(b) => {
                self.out.push_str(if *b { "true" } else { "false" });
                Ok(())
            }
            ValueNode::Number(Number::Float(n)) => {
                if !n.is_finite() {
                    return Err(CodecError::TypeMismatch {
                        field: self.path_string(),
                        expected: "finite float".to_string(),
                        actual: "non-finite float".to_string(),
                    });
                }
                write!(self.out, "{}", n).unwrap();
                Ok(())
            }
            ValueNode::Number(Number::Decimal(d)) => {
                write!(self.out, "{}", d).unwrap();
                Ok(())
            }
            ValueNode::Text(s) => {
                self.push_quoted(s);
                Ok(())
            }
            ValueNode::Record(pairs) => {
                self.out.push('{');
                for (i, (name, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.push_key(name);
                    self.out.push_str(": ");
                    self.path.push(name.clone());
                    self.untyped(value)?;
                    self.path.pop();
                }
                self.out.push('}');
                Ok(())
            }
            ValueNode::Collection(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.path.push(format!("[{}]", i));
                    self.untyped(item)?;
                    self.path.pop();
                }
                self.out.push(']');
                Ok(())
            }
            ValueNode::Link(handle) => self.follow(handle, |enc, inner| enc.untyped(inner)),
        }
    }

    /// Follow a shared handle, failing on re-entry (a cycle)
    fn follow(
        &mut self,
        handle: &SharedNode,
        f: impl FnOnce(&mut Self, &ValueNode) -> CodecResult<()>,
    ) -> CodecResult<()> {
        let key = Rc::as_ptr(handle) as usize;
        if !self.active.insert(key) {
            return Err(CodecError::CyclicGraph {
                path: self.path_string(),
            });
        }
        let inner = handle.borrow();
        let result = f(self, &inner);
        drop(inner);
        self.active.remove(&key);
        result
    }

    fn mismatch(&self, expected: &str, actual: &ValueNode) -> CodecError {
        CodecError::TypeMismatch {
            field: self.path_string(),
            expected: expected.to_string(),
            actual: actual.kind_name().to_string(),
        }
    }

    fn path_string(&self) -> String {
        if self.path.is_empty() {
            return "<root>".to_string();
        }
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !segment.starts_with('[') {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }

    /// Emit a key, bare when it is a plain identifier
    fn push_key(&mut self, key: &str) {
        if is_bare_key(key) {
            self.out.push_str(key);
        } else {
            self.push_quoted(key);
        }
    }

    fn push_quoted(&mut self, s: &str) {
        self.out.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\x08' => self.out.push_str("\\b"),
                '\x0C' => self.out.push_str("\\f"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if c.is_control() => {
                    write!(self.out, "\\u{:04x}", c as u32)
                        .unwrap();
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

/// Whether a key can be written without quotes
fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
