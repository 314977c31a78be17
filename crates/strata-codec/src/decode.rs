//! Schema-driven decoder
//!
//! A single-pass, byte-level parser for the textual tree format. Each field
//! name met on the wire is mapped back to a schema field through the
//! schema's reverse lookup; unknown wire-names are either buffered as
//! opaque pass-through children (non-strict, the default) or rejected
//! (strict). Any error aborts the whole record: no partially populated
//! record ever reaches the caller.
//!
//! Known fields decode at the kind the schema declares, so a number lands
//! as f64 or as an exact decimal depending on the field. Pass-through
//! numbers keep the lossless decimal form.

use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_schema::{FieldKind, RecordSchema, SchemaCache};

use crate::decimal::Decimal;
use crate::error::{CodecError, CodecResult};
use crate::value::ValueNode;

/// Maximum nesting depth accepted from input, to prevent stack overflow
const MAX_DEPTH: usize = 100;

/// Options controlling decode behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Reject wire-names the schema does not know
    pub strict: bool,
}

impl DecodeOptions {
    /// Options that reject unknown wire-names
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Decode one record from the reader
///
/// The reader is drained before parsing; the caller is responsible for
/// bounding or timing out the reader it supplies.
pub fn decode(
    schema: &RecordSchema,
    reader: &mut dyn Read,
    options: &DecodeOptions,
) -> CodecResult<ValueNode> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    decode_str(schema, &input, options)
}

/// Decode one record from a string
pub fn decode_str(
    schema: &RecordSchema,
    input: &str,
    options: &DecodeOptions,
) -> CodecResult<ValueNode> {
    tracing::trace!(type_name = schema.type_name(), "decoding record");
    let mut parser = Parser {
        input,
        bytes: input.as_bytes(),
        pos: 0,
        cache: SchemaCache::global(),
        strict: options.strict,
    };
    let value = parser.parse_record(schema, 0)?;
    parser.skip_whitespace();
    if parser.pos < parser.bytes.len() {
        return Err(parser.syntax("trailing characters after record"));
    }
    Ok(value)
}

/// Parser state
struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    cache: &'static SchemaCache,
    strict: bool,
}

impl<'a> Parser<'a> {
    fn parse_record(&mut self, schema: &RecordSchema, depth: usize) -> CodecResult<ValueNode> {
        if depth > MAX_DEPTH {
            return Err(self.syntax("nesting depth limit exceeded"));
        }
        self.skip_whitespace();
        match self.peek() {
            None => return Err(self.incomplete("'{'")),
            Some(b'{') => self.pos += 1,
            Some(c) => {
                return Err(self.syntax(format!("expected '{{', got '{}'", c as char)));
            }
        }

        let field_count = schema.fields().len();
        let mut slots: Vec<Option<ValueNode>> = (0..field_count).map(|_| None).collect();
        let mut passthrough: Vec<(String, ValueNode)> = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
        } else {
            loop {
                self.skip_whitespace();
                let key_pos = self.pos;
                let key = self.parse_key()?;

                self.skip_whitespace();
                match self.peek() {
                    None => return Err(self.incomplete("':'")),
                    Some(b':') => self.pos += 1,
                    Some(c) => {
                        return Err(self.syntax(format!(
                            "expected ':' after field '{}', got '{}'",
                            key, c as char
                        )));
                    }
                }
                self.skip_whitespace();

                match schema.lookup_index(&key) {
                    Some(index) => {
                        let desc = &schema.fields()[index];
                        if slots[index].is_some() {
                            return Err(CodecError::Syntax {
                                position: key_pos,
                                message: format!("duplicate field '{}'", key),
                            });
                        }
                        if desc.included() {
                            let value = self.parse_typed(desc.kind(), desc.name(), depth + 1)?;
                            slots[index] = Some(value);
                        } else {
                            // Known but excluded: parse and discard. The slot
                            // still marks the key as seen (assembly never
                            // reads excluded slots).
                            self.parse_untyped(depth + 1)?;
                            slots[index] = Some(ValueNode::Null);
                        }
                    }
                    None => {
                        if self.strict {
                            return Err(CodecError::UnknownField {
                                type_name: schema.type_name().to_string(),
                                wire_name: key,
                            });
                        }
                        if passthrough.iter().any(|(name, _)| *name == key) {
                            return Err(CodecError::Syntax {
                                position: key_pos,
                                message: format!("duplicate field '{}'", key),
                            });
                        }
                        let value = self.parse_untyped(depth + 1)?;
                        passthrough.push((key, value));
                    }
                }

                self.skip_whitespace();
                match self.peek() {
                    None => return Err(self.incomplete("',' or '}'")),
                    Some(b',') => self.pos += 1,
                    Some(b'}') => {
                        self.pos += 1;
                        break;
                    }
                    Some(c) => {
                        return Err(self.syntax(format!(
                            "expected ',' or '}}' in record, got '{}'",
                            c as char
                        )));
                    }
                }
            }
        }

        let mut pairs = Vec::with_capacity(field_count + passthrough.len());
        for (index, desc) in schema.fields().iter().enumerate() {
            if !desc.included() {
                continue;
            }
            match slots[index].take() {
                Some(value) => pairs.push((desc.name().to_string(), value)),
                None if desc.kind().is_optional() => {
                    pairs.push((desc.name().to_string(), ValueNode::Null));
                }
                None => {
                    return Err(CodecError::MissingField {
                        type_name: schema.type_name().to_string(),
                        field: desc.name().to_string(),
                    });
                }
            }
        }
        pairs.extend(passthrough);

        Ok(ValueNode::Record(pairs))
    }

    /// Parse a value at the kind the schema declares for `field`
    fn parse_typed(&mut self, kind: &FieldKind, field: &str, depth: usize) -> CodecResult<ValueNode> {
        if depth > MAX_DEPTH {
            return Err(self.syntax("nesting depth limit exceeded"));
        }
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Err(self.incomplete("a value"));
        };

        if let FieldKind::Optional(inner) = kind {
            if c == b'n' {
                self.expect_literal("null")?;
                return Ok(ValueNode::Null);
            }
            return self.parse_typed(inner, field, depth);
        }

        match kind {
            FieldKind::Bool => match c {
                b't' | b'f' => self.parse_bool(),
                _ => Err(self.mismatch(field, "bool")),
            },
            FieldKind::Float => match c {
                b'-' | b'0'..=b'9' => {
                    let start = self.pos;
                    let lexeme = self.parse_number_lexeme()?;
                    let n: f64 = lexeme.parse().map_err(|_| CodecError::Syntax {
                        position: start,
                        message: format!("invalid number '{}'", lexeme),
                    })?;
                    // f64 parse overflows to infinity silently; a non-finite
                    // value could never be re-encoded.
                    if !n.is_finite() {
                        return Err(CodecError::Syntax {
                            position: start,
                            message: format!("number '{}' overflows a float", lexeme),
                        });
                    }
                    Ok(ValueNode::float(n))
                }
                _ => Err(self.mismatch(field, "float")),
            },
            FieldKind::Decimal => match c {
                b'-' | b'0'..=b'9' => {
                    let start = self.pos;
                    let lexeme = self.parse_number_lexeme()?;
                    let d = Decimal::parse(lexeme).map_err(|e| CodecError::Syntax {
                        position: start,
                        message: format!("invalid decimal '{}': {}", lexeme, e),
                    })?;
                    Ok(ValueNode::decimal(d))
                }
                _ => Err(self.mismatch(field, "decimal")),
            },
            FieldKind::Text => match c {
                b'"' => Ok(ValueNode::Text(self.parse_string()?)),
                _ => Err(self.mismatch(field, "text")),
            },
            FieldKind::Collection(elem) => match c {
                b'[' => {
                    self.pos += 1;
                    let mut items = Vec::new();
                    self.skip_whitespace();
                    if self.peek() == Some(b']') {
                        self.pos += 1;
                        return Ok(ValueNode::Collection(items));
                    }
                    loop {
                        items.push(self.parse_typed(elem, field, depth + 1)?);
                        self.skip_whitespace();
                        match self.peek() {
                            None => return Err(self.incomplete("',' or ']'")),
                            Some(b',') => {
                                self.pos += 1;
                                self.skip_whitespace();
                            }
                            Some(b']') => {
                                self.pos += 1;
                                return Ok(ValueNode::Collection(items));
                            }
                            Some(c) => {
                                return Err(self.syntax(format!(
                                    "expected ',' or ']' in collection, got '{}'",
                                    c as char
                                )));
                            }
                        }
                    }
                }
                _ => Err(self.mismatch(field, "collection")),
            },
            FieldKind::Nested(type_name) => match c {
                b'{' => {
                    let sub: Arc<RecordSchema> =
                        self.cache
                            .get(type_name)
                            .ok_or_else(|| CodecError::UnknownSchema {
                                type_name: type_name.clone(),
                            })?;
                    self.parse_record(&sub, depth + 1)
                }
                _ => Err(self.mismatch(field, "record")),
            },
            // Handled above.
            FieldKind::Optional(_) => unreachable!("optional is unwrapped before dispatch"),
        }
    }

    /// Parse a value with no schema guidance (pass-through children)
    fn parse_untyped(&mut self, depth: usize) -> CodecResult<ValueNode> {
        if depth > MAX_DEPTH {
            return Err(self.syntax("nesting depth limit exceeded"));
        }
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Err(self.incomplete("a value"));
        };

        match c {
            b'n' => {
                self.expect_literal("null")?;
                Ok(ValueNode::Null)
            }
            b't' | b'f' => self.parse_bool(),
            b'"' => Ok(ValueNode::Text(self.parse_string()?)),
            b'-' | b'0'..=b'9' => {
                let start = self.pos;
                let lexeme = self.parse_number_lexeme()?;
                // Keep the lossless form for data we do not understand.
                let d = Decimal::parse(lexeme).map_err(|e| CodecError::Syntax {
                    position: start,
                    message: format!("invalid number '{}': {}", lexeme, e),
                })?;
                Ok(ValueNode::decimal(d))
            }
            b'[' => {
                self.pos += 1;
                let mut items = Vec::new();
                self.skip_whitespace();
                if self.peek() == Some(b']') {
                    self.pos += 1;
                    return Ok(ValueNode::Collection(items));
                }
                loop {
                    items.push(self.parse_untyped(depth + 1)?);
                    self.skip_whitespace();
                    match self.peek() {
                        None => return Err(self.incomplete("',' or ']'")),
                        Some(b',') => {
                            self.pos += 1;
                            self.skip_whitespace();
                        }
                        Some(b']') => {
                            self.pos += 1;
                            return Ok(ValueNode::Collection(items));
                        }
                        Some(c) => {
                            return Err(self.syntax(format!(
                                "expected ',' or ']' in collection, got '{}'",
                                c as char
                            )));
                        }
                    }
                }
            }
            b'{' => {
                self.pos += 1;
                let mut pairs = Vec::new();
                self.skip_whitespace();
                if self.peek() == Some(b'}') {
                    self.pos += 1;
                    return Ok(ValueNode::Record(pairs));
                }
                loop {
                    self.skip_whitespace();
                    let key = self.parse_key()?;
                    self.skip_whitespace();
                    match self.peek() {
                        None => return Err(self.incomplete("':'")),
                        Some(b':') => self.pos += 1,
                        Some(c) => {
                            return Err(self.syntax(format!(
                                "expected ':' after field '{}', got '{}'",
                                key, c as char
                            )));
                        }
                    }
                    let value = self.parse_untyped(depth + 1)?;
                    pairs.push((key, value));
                    self.skip_whitespace();
                    match self.peek() {
                        None => return Err(self.incomplete("',' or '}'")),
                        Some(b',') => self.pos += 1,
                        Some(b'}') => {
                            self.pos += 1;
                            return Ok(ValueNode::Record(pairs));
                        }
                        Some(c) => {
                            return Err(self.syntax(format!(
                                "expected ',' or '}}' in record, got '{}'",
                                c as char
                            )));
                        }
                    }
                }
            }
            other => Err(self.syntax(format!("unexpected character '{}'", other as char))),
        }
    }

    /// Parse a field key: bare identifier or quoted string
    fn parse_key(&mut self) -> CodecResult<String> {
        match self.peek() {
            None => Err(self.incomplete("a field name")),
            Some(b'"') => self.parse_string(),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                let start = self.pos;
                while self.pos < self.bytes.len()
                    && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'_')
                {
                    self.pos += 1;
                }
                Ok(self.input[start..self.pos].to_string())
            }
            Some(c) => Err(self.syntax(format!("expected field name, got '{}'", c as char))),
        }
    }

    fn parse_bool(&mut self) -> CodecResult<ValueNode> {
        if self.consume_literal("true") {
            Ok(ValueNode::Bool(true))
        } else if self.consume_literal("false") {
            Ok(ValueNode::Bool(false))
        } else {
            Err(self.literal_error(&["true", "false"]))
        }
    }

    /// Scan a number literal and return its lexeme
    fn parse_number_lexeme(&mut self) -> CodecResult<&'a str> {
        let start = self.pos;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }

        if self.pos >= self.bytes.len() {
            return Err(self.incomplete("a digit"));
        }
        if !self.bytes[self.pos].is_ascii_digit() {
            return Err(self.syntax("expected a digit".to_string()));
        }
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }

        if self.pos < self.bytes.len() && self.bytes[self.pos] == b'.' {
            self.pos += 1;
            if self.pos >= self.bytes.len() {
                return Err(self.incomplete("a digit after '.'"));
            }
            if !self.bytes[self.pos].is_ascii_digit() {
                return Err(self.syntax("expected a digit after '.'".to_string()));
            }
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }

        if self.pos < self.bytes.len() && (self.bytes[self.pos] | 0x20) == b'e' {
            self.pos += 1;
            if self.pos < self.bytes.len()
                && (self.bytes[self.pos] == b'+' || self.bytes[self.pos] == b'-')
            {
                self.pos += 1;
            }
            if self.pos >= self.bytes.len() {
                return Err(self.incomplete("a digit in exponent"));
            }
            if !self.bytes[self.pos].is_ascii_digit() {
                return Err(self.syntax("expected a digit in exponent".to_string()));
            }
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }

        Ok(&self.input[start..self.pos])
    }

    /// Parse a quoted string, unescaping on demand
    fn parse_string(&mut self) -> CodecResult<String> {
        // Caller peeked the opening quote.
        self.pos += 1;
        let start = self.pos;
        let mut has_escapes = false;

        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'"' => {
                    let end = self.pos;
                    self.pos += 1;
                    return if has_escapes {
                        self.unescape(&self.input[start..end], start)
                    } else {
                        Ok(self.input[start..end].to_string())
                    };
                }
                b'\\' => {
                    has_escapes = true;
                    self.pos += 1;
                    if self.pos >= self.bytes.len() {
                        return Err(self.incomplete("an escape sequence"));
                    }
                    self.pos += 1;
                }
                b'\x00'..=b'\x1F' => {
                    return Err(self.syntax("unescaped control character in string".to_string()));
                }
                _ => self.pos += 1,
            }
        }

        Err(self.incomplete("closing '\"'"))
    }

    fn unescape(&self, s: &str, start: usize) -> CodecResult<String> {
        let mut result = String::with_capacity(s.len());
        let mut chars = s.chars();

        while let Some(ch) = chars.next() {
            if ch != '\\' {
                result.push(ch);
                continue;
            }
            match chars.next() {
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some('/') => result.push('/'),
                Some('b') => result.push('\x08'),
                Some('f') => result.push('\x0C'),
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    if hex.len() != 4 {
                        return Err(CodecError::Syntax {
                            position: start,
                            message: "truncated unicode escape".to_string(),
                        });
                    }
                    let code = u32::from_str_radix(&hex, 16).map_err(|_| CodecError::Syntax {
                        position: start,
                        message: format!("invalid unicode escape '\\u{}'", hex),
                    })?;
                    match char::from_u32(code) {
                        Some(c) => result.push(c),
                        None => {
                            return Err(CodecError::Syntax {
                                position: start,
                                message: format!("invalid unicode code point {:#x}", code),
                            });
                        }
                    }
                }
                Some(c) => {
                    return Err(CodecError::Syntax {
                        position: start,
                        message: format!("invalid escape sequence '\\{}'", c),
                    });
                }
                None => {
                    return Err(CodecError::IncompleteInput {
                        expected: "an escape sequence".to_string(),
                    });
                }
            }
        }

        Ok(result)
    }

    fn expect_literal(&mut self, literal: &str) -> CodecResult<()> {
        if self.consume_literal(literal) {
            Ok(())
        } else {
            Err(self.literal_error(&[literal]))
        }
    }

    fn consume_literal(&mut self, literal: &str) -> bool {
        let literal = literal.as_bytes();
        if self.pos + literal.len() > self.bytes.len() {
            return false;
        }
        if &self.bytes[self.pos..self.pos + literal.len()] == literal {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn literal_error(&self, expected: &[&str]) -> CodecError {
        let wanted = expected.join("' or '");
        // A literal cut off by end of input is incompleteness, not noise.
        if expected
            .iter()
            .any(|lit| lit.as_bytes().starts_with(&self.bytes[self.pos..]))
        {
            CodecError::IncompleteInput {
                expected: format!("'{}'", wanted),
            }
        } else {
            self.syntax(format!("expected '{}'", wanted))
        }
    }

    /// Kind name of whatever starts at the cursor, for mismatch diagnostics
    fn actual_kind_name(&self) -> &'static str {
        match self.peek() {
            Some(b'n') => "null",
            Some(b't') | Some(b'f') => "bool",
            Some(b'"') => "text",
            Some(b'{') => "record",
            Some(b'[') => "collection",
            Some(b'-') | Some(b'0'..=b'9') => "number",
            _ => "malformed input",
        }
    }

    fn mismatch(&self, field: &str, expected: &str) -> CodecError {
        CodecError::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: self.actual_kind_name().to_string(),
        }
    }

    fn incomplete(&self, expected: &str) -> CodecError {
        CodecError::IncompleteInput {
            expected: expected.to_string(),
        }
    }

    fn syntax(&self, message: impl Into<String>) -> CodecError {
        CodecError::Syntax {
            position: self.pos,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_schema::{NamingPolicy, RecordDescription, SchemaOptions};

    fn person_schema() -> RecordSchema {
        let desc = RecordDescription::new("decode_tests::Person")
            .property("first_name", FieldKind::Text)
            .property("age", FieldKind::Float);
        let options = SchemaOptions {
            naming_policy: NamingPolicy::CamelCase,
            ..Default::default()
        };
        RecordSchema::build(&desc, &options).unwrap()
    }

    #[test]
    fn test_decode_basic_record() {
        let schema = person_schema();
        let value =
            decode_str(&schema, "{firstName: \"Ada\", age: 30}", &DecodeOptions::default())
                .unwrap();
        assert_eq!(value.field("first_name"), Some(&ValueNode::text("Ada")));
        assert_eq!(value.field("age"), Some(&ValueNode::float(30.0)));
    }

    #[test]
    fn test_decode_tolerates_reordering_and_whitespace() {
        let schema = person_schema();
        let input = "{\n  age: 30,\n  firstName: \"Ada\"\n}";
        let value = decode_str(&schema, input, &DecodeOptions::default()).unwrap();
        // Known fields come back in schema order regardless of wire order.
        let pairs = value.as_record().unwrap();
        assert_eq!(pairs[0].0, "first_name");
        assert_eq!(pairs[1].0, "age");
    }

    #[test]
    fn test_type_mismatch_names_field_and_kinds() {
        let schema = person_schema();
        let err = decode_str(
            &schema,
            "{firstName: \"Ada\", age: \"thirty\"}",
            &DecodeOptions::default(),
        )
        .unwrap_err();
        match err {
            CodecError::TypeMismatch {
                field,
                expected,
                actual,
            } => {
                assert_eq!(field, "age");
                assert_eq!(expected, "float");
                assert_eq!(actual, "text");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_nonstrict_preserved() {
        let schema = person_schema();
        let input = "{firstName: \"Ada\", age: 30, extra: [1, 2]}";
        let value = decode_str(&schema, input, &DecodeOptions::default()).unwrap();
        let extra = value.field("extra").unwrap();
        assert_eq!(extra.as_collection().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_field_strict_rejected() {
        let schema = person_schema();
        let input = "{firstName: \"Ada\", age: 30, extra: 1}";
        let err = decode_str(&schema, input, &DecodeOptions::strict()).unwrap_err();
        assert!(
            matches!(err, CodecError::UnknownField { wire_name, .. } if wire_name == "extra")
        );
    }

    #[test]
    fn test_missing_required_field() {
        let schema = person_schema();
        let err =
            decode_str(&schema, "{firstName: \"Ada\"}", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::MissingField { field, .. } if field == "age"));
    }

    #[test]
    fn test_missing_optional_field_decodes_null() {
        let desc = RecordDescription::new("decode_tests::MaybeName")
            .property("nickname", FieldKind::optional(FieldKind::Text));
        let schema = RecordSchema::build(&desc, &SchemaOptions::default()).unwrap();
        let value = decode_str(&schema, "{}", &DecodeOptions::default()).unwrap();
        assert_eq!(value.field("nickname"), Some(&ValueNode::Null));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = person_schema();
        let input = "{firstName: \"Ada\", age: 1, age: 2}";
        let err = decode_str(&schema, input, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::Syntax { .. }));
    }

    #[test]
    fn test_incomplete_input() {
        let schema = person_schema();
        for input in ["", "{", "{firstName", "{firstName: \"Ada", "{firstName: \"Ada\", age: 3"] {
            let err = decode_str(&schema, input, &DecodeOptions::default()).unwrap_err();
            assert!(
                matches!(err, CodecError::IncompleteInput { .. }),
                "input {input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let schema = person_schema();
        let input = "{firstName: \"Ada\", age: 3} tail";
        let err = decode_str(&schema, input, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::Syntax { .. }));
    }

    #[test]
    fn test_decimal_field_keeps_precision() {
        let desc = RecordDescription::new("decode_tests::Invoice")
            .property("total", FieldKind::Decimal);
        let schema = RecordSchema::build(&desc, &SchemaOptions::default()).unwrap();
        let value = decode_str(
            &schema,
            "{total: 0.10000000000000000001}",
            &DecodeOptions::default(),
        )
        .unwrap();
        let total = value.field("total").unwrap().as_decimal().unwrap();
        assert_eq!(total.to_string(), "0.10000000000000000001");
    }

    #[test]
    fn test_excluded_field_in_input_discarded() {
        let desc = RecordDescription::new("decode_tests::WithHidden")
            .property("name", FieldKind::Text)
            .field("hidden", FieldKind::Text);
        let schema = RecordSchema::build(&desc, &SchemaOptions::default()).unwrap();
        let input = "{name: \"x\", hidden: \"secret\"}";
        // Discarded in both modes: the name is known, just not carried.
        for options in [DecodeOptions::default(), DecodeOptions::strict()] {
            let value = decode_str(&schema, input, &options).unwrap();
            assert!(value.field("hidden").is_none());
        }
    }

    #[test]
    fn test_nested_record_via_cache() {
        let address = RecordDescription::new("decode_tests::Address")
            .property("city", FieldKind::Text);
        SchemaCache::global()
            .schema(&address, &SchemaOptions::default())
            .unwrap();

        let desc = RecordDescription::new("decode_tests::Customer")
            .property("name", FieldKind::Text)
            .property("address", FieldKind::nested("decode_tests::Address"));
        let schema = RecordSchema::build(&desc, &SchemaOptions::default()).unwrap();

        let input = "{name: \"Ada\", address: {city: \"London\"}}";
        let value = decode_str(&schema, input, &DecodeOptions::default()).unwrap();
        let address = value.field("address").unwrap();
        assert_eq!(address.field("city"), Some(&ValueNode::text("London")));
    }

    #[test]
    fn test_unregistered_nested_schema() {
        let desc = RecordDescription::new("decode_tests::Dangling")
            .property("inner", FieldKind::nested("decode_tests::NeverRegistered"));
        let schema = RecordSchema::build(&desc, &SchemaOptions::default()).unwrap();
        let err = decode_str(&schema, "{inner: {}}", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::UnknownSchema { .. }));
    }

    #[test]
    fn test_quoted_keys_and_escapes() {
        let desc = RecordDescription::new("decode_tests::Odd")
            .property("weird key", FieldKind::Text);
        let schema = RecordSchema::build(&desc, &SchemaOptions::default()).unwrap();
        let input = "{\"weird key\": \"line\\nbreak\"}";
        let value = decode_str(&schema, input, &DecodeOptions::default()).unwrap();
        assert_eq!(
            value.field("weird key"),
            Some(&ValueNode::text("line\nbreak"))
        );
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let desc = RecordDescription::new("decode_tests::Caseless")
            .property("first_name", FieldKind::Text);
        let options = SchemaOptions {
            naming_policy: NamingPolicy::CamelCase,
            case_insensitive_lookup: true,
            ..Default::default()
        };
        let schema = RecordSchema::build(&desc, &options).unwrap();
        let value =
            decode_str(&schema, "{FIRSTNAME: \"Ada\"}", &DecodeOptions::default()).unwrap();
        assert_eq!(value.field("first_name"), Some(&ValueNode::text("Ada")));
    }

    #[test]
    fn test_deeply_nested_untyped_input_rejected() {
        let schema = person_schema();
        let mut input = String::from("{firstName: \"Ada\", age: 30, extra: ");
        input.push_str(&"[".repeat(200_000));
        let err = decode_str(&schema, &input, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn test_deeply_nested_typed_input_rejected() {
        let desc = RecordDescription::new("decode_tests::DeepChain").property(
            "next",
            FieldKind::optional(FieldKind::nested("decode_tests::DeepChain")),
        );
        let schema = SchemaCache::global()
            .schema(&desc, &SchemaOptions::default())
            .unwrap();

        let mut input = String::new();
        for _ in 0..300 {
            input.push_str("{next: ");
        }
        input.push_str("null");
        input.push_str(&"}".repeat(300));

        let err = decode_str(&schema, &input, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::Syntax { .. }), "got {err:?}");

        // Nesting under the cap still decodes.
        let shallow = "{next: {next: null}}";
        assert!(decode_str(&schema, shallow, &DecodeOptions::default()).is_ok());
    }

    #[test]
    fn test_float_overflow_rejected() {
        let schema = person_schema();
        let err = decode_str(
            &schema,
            "{firstName: \"Ada\", age: 1e999}",
            &DecodeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn test_duplicate_excluded_field_rejected() {
        let desc = RecordDescription::new("decode_tests::DupHidden")
            .property("name", FieldKind::Text)
            .field("hidden", FieldKind::Text);
        let schema = RecordSchema::build(&desc, &SchemaOptions::default()).unwrap();
        let input = "{name: \"x\", hidden: \"a\", hidden: \"b\"}";
        let err = decode_str(&schema, input, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn test_duplicate_unknown_field_rejected() {
        let schema = person_schema();
        let input = "{firstName: \"Ada\", age: 30, extra: 1, extra: 2}";
        let err = decode_str(&schema, input, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::Syntax { .. }), "got {err:?}");
    }
}
