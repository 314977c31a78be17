//! Value graph nodes
//!
//! [`ValueNode`] is the tagged union the codec produces on decode and
//! consumes on encode. Records keep their fields as an ordered list of
//! (name, value) pairs; collections are ordered too. [`ValueNode::Link`]
//! is a shared handle to another node: it is how callers express aliased
//! subgraphs, and it is the only way a value graph can contain a reference
//! cycle. Decode never produces a link.

use std::cell::RefCell;
use std::rc::Rc;

use crate::decimal::Decimal;

/// Shared, aliasable handle to a node
pub type SharedNode = Rc<RefCell<ValueNode>>;

/// Numeric value at one of the two schema-declared widths
#[derive(Debug, Clone)]
pub enum Number {
    /// Double-precision float
    Float(f64),

    /// Exact arbitrary-precision decimal
    Decimal(Decimal),
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Float(a), Number::Float(b)) => {
                // NaN != NaN in IEEE 754; treat equal here so graphs compare
                // structurally.
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Number::Decimal(a), Number::Decimal(b)) => a == b,
            _ => false,
        }
    }
}

/// A parsed or about-to-be-serialized value
#[derive(Debug, Clone)]
pub enum ValueNode {
    /// Explicit null (also the decoded form of an absent optional field)
    Null,

    /// Boolean scalar
    Bool(bool),

    /// Numeric scalar
    Number(Number),

    /// Text value
    Text(String),

    /// Record: ordered (field name, value) pairs
    ///
    /// Fields decoded through a schema are keyed by internal name;
    /// pass-through fields keep their wire-name.
    Record(Vec<(String, ValueNode)>),

    /// Ordered homogeneous collection
    Collection(Vec<ValueNode>),

    /// Shared handle to another node (aliasing, possibly cyclic)
    Link(SharedNode),
}

impl ValueNode {
    /// Build a float node
    pub fn float(value: f64) -> ValueNode {
        ValueNode::Number(Number::Float(value))
    }

    /// Build an exact decimal node
    pub fn decimal(value: Decimal) -> ValueNode {
        ValueNode::Number(Number::Decimal(value))
    }

    /// Build a text node
    pub fn text(value: impl Into<String>) -> ValueNode {
        ValueNode::Text(value.into())
    }

    /// Build a record node from (name, value) pairs
    pub fn record(pairs: Vec<(String, ValueNode)>) -> ValueNode {
        ValueNode::Record(pairs)
    }

    /// Wrap a node in a shared handle
    pub fn shared(node: ValueNode) -> SharedNode {
        Rc::new(RefCell::new(node))
    }

    /// Build a link to a shared handle
    pub fn link(handle: &SharedNode) -> ValueNode {
        ValueNode::Link(Rc::clone(handle))
    }

    /// Kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueNode::Null => "null",
            ValueNode::Bool(_) => "bool",
            ValueNode::Number(Number::Float(_)) => "float",
            ValueNode::Number(Number::Decimal(_)) => "decimal",
            ValueNode::Text(_) => "text",
            ValueNode::Record(_) => "record",
            ValueNode::Collection(_) => "collection",
            ValueNode::Link(_) => "link",
        }
    }

    /// Check if this is null
    pub fn is_null(&self) -> bool {
        matches!(self, ValueNode::Null)
    }

    /// Get the boolean value if this is a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ValueNode::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the float value if this is a float Number
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ValueNode::Number(Number::Float(n)) => Some(*n),
            _ => None,
        }
    }

    /// Get the decimal value if this is a decimal Number
    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            ValueNode::Number(Number::Decimal(d)) => Some(d),
            _ => None,
        }
    }

    /// Get the text if this is a Text node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ValueNode::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the field pairs if this is a Record
    pub fn as_record(&self) -> Option<&[(String, ValueNode)]> {
        match self {
            ValueNode::Record(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Get the elements if this is a Collection
    pub fn as_collection(&self) -> Option<&[ValueNode]> {
        match self {
            ValueNode::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Find a record field by name (first occurrence)
    pub fn field(&self, name: &str) -> Option<&ValueNode> {
        match self {
            ValueNode::Record(pairs) => pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl PartialEq for ValueNode {
    /// Structural equality; links compare by their current contents
    ///
    /// Comparing two cyclic graphs does not terminate; the codec rejects
    /// cycles before they can round-trip.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueNode::Link(a), _) => a.borrow().eq(other),
            (_, ValueNode::Link(b)) => self.eq(&b.borrow()),
            (ValueNode::Null, ValueNode::Null) => true,
            (ValueNode::Bool(a), ValueNode::Bool(b)) => a == b,
            (ValueNode::Number(a), ValueNode::Number(b)) => a == b,
            (ValueNode::Text(a), ValueNode::Text(b)) => a == b,
            (ValueNode::Record(a), ValueNode::Record(b)) => a == b,
            (ValueNode::Collection(a), ValueNode::Collection(b)) => a == b,
            _ => false,
        }
    }
}
