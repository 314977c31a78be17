//! Structured codec for the textual tree format
//!
//! Translates between in-memory value graphs ([`ValueNode`]) and the
//! compact textual wire form `{name: value, ...}`, driven by a
//! [`RecordSchema`](strata_schema::RecordSchema):
//!
//! - **Encode** walks the graph in schema order, emitting wire-names and
//!   rejecting reference cycles before they can loop forever
//! - **Decode** parses the wire form back into a graph, mapping wire-names
//!   to internal field names and checking every value against its
//!   declared kind
//!
//! Both directions fail atomically: an error anywhere leaves no partial
//! output and no half-built graph in the caller's hands. Unknown fields
//! met during a non-strict decode are carried through untouched and
//! re-emitted on the next encode.
//!
//! ```
//! use strata_codec::{decode_str, encode_to_string, DecodeOptions};
//! use strata_schema::{FieldKind, NamingPolicy, RecordDescription, RecordSchema, SchemaOptions};
//!
//! let desc = RecordDescription::new("docs::Person")
//!     .property("first_name", FieldKind::Text)
//!     .property("age", FieldKind::Float);
//! let options = SchemaOptions {
//!     naming_policy: NamingPolicy::CamelCase,
//!     ..Default::default()
//! };
//! let schema = RecordSchema::build(&desc, &options).unwrap();
//!
//! let value = decode_str(&schema, "{firstName: \"Ada\", age: 30}", &DecodeOptions::default())
//!     .unwrap();
//! let text = encode_to_string(&schema, &value).unwrap();
//! assert_eq!(text, "{firstName: \"Ada\", age: 30}");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod decimal;
mod decode;
mod encode;
mod error;
mod value;

pub use decimal::{Decimal, ParseDecimalError};
pub use decode::{decode, decode_str, DecodeOptions};
pub use encode::{encode, encode_to_string};
pub use error::{CodecError, CodecResult};
pub use value::{Number, SharedNode, ValueNode};
