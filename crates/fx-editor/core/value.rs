//! Immutable document values with structural sharing
//!
//! A [`Value`] is a cheap handle around a reference-counted [`Node`]. Cloning a
//! value never copies the tree, so an edit that rebuilds one ancestor chain
//! leaves every sibling subtree shared with the previous snapshot. Identity
//! is `Value::ptr_eq`; `PartialEq` compares contents.

use core::fmt;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::{Arc, Weak};

/// Keyed map node contents
pub type Map = IndexMap<String, Value>;

/// Largest integer an IEEE-754 double represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Tag of a document node, used in error reporting and path matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Map,
    List,
}

impl NodeKind {
    /// Scalars cannot be descended into
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::Map | Self::List)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Map => "map",
            Self::List => "list",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of a document node
#[derive(Debug)]
pub enum Node {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Map(Map),
    List(Vec<Value>),
}

impl Node {
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Null => NodeKind::Null,
            Self::Bool(_) => NodeKind::Bool,
            Self::Number(_) => NodeKind::Number,
            Self::String(_) => NodeKind::String,
            Self::Map(_) => NodeKind::Map,
            Self::List(_) => NodeKind::List,
        }
    }
}

/// Shared handle to an immutable document node
///
/// # Examples
///
/// ```
/// use fx_editor::Value;
///
/// let doc = Value::from(serde_json::json!({"effects": {"a": [true, "X"]}}));
/// let effects = doc.get("effects").unwrap().clone();
///
/// // Clones share the node, they do not copy it
/// let again = doc.get("effects").unwrap();
/// assert!(effects.ptr_eq(again));
/// assert_eq!(doc.to_string(), r#"{"effects":{"a":[true,"X"]}}"#);
/// ```
#[derive(Clone)]
pub struct Value(Arc<Node>);

impl Value {
    /// Wrap a node in a fresh allocation
    #[must_use]
    pub fn new(node: Node) -> Self {
        Self(Arc::new(node))
    }

    #[must_use]
    pub fn null() -> Self {
        Self::new(Node::Null)
    }

    #[must_use]
    pub fn bool(value: bool) -> Self {
        Self::new(Node::Bool(value))
    }

    /// Create a number; non-finite input becomes `null` so the document
    /// always stays JSON-serializable
    #[must_use]
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::new(Node::Number(value))
        } else {
            Self::null()
        }
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(Node::String(value.into()))
    }

    #[must_use]
    pub fn from_list(items: Vec<Self>) -> Self {
        Self::new(Node::List(items))
    }

    #[must_use]
    pub fn from_map(entries: Map) -> Self {
        Self::new(Node::Map(entries))
    }

    /// Build a list node from any iterator of values
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::from_list(items.into_iter().collect())
    }

    /// Build a map node from `(key, value)` pairs
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::from_map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[must_use]
    pub fn node(&self) -> &Node {
        &self.0
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.0.kind()
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.kind().is_scalar()
    }

    /// Reference identity, the check structural sharing is built on
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared node; stable for as long as any handle or weak
    /// reference to it exists
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub(crate) fn downgrade(&self) -> Weak<Node> {
        Arc::downgrade(&self.0)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.node() {
            Node::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self.node() {
            Node::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self.node() {
            Node::String(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self.node() {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self.node() {
            Node::Map(entries) => Some(entries),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.node(), Node::Null)
    }

    /// Map entry lookup; `None` for non-maps
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Self> {
        self.as_map().and_then(|entries| entries.get(field))
    }

    /// List element lookup; `None` for non-lists
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Self> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Convert into an owned `serde_json` tree
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self.node() {
            Node::Null => serde_json::Value::Null,
            Node::Bool(value) => serde_json::Value::Bool(*value),
            Node::Number(value) => json_number(*value),
            Node::String(value) => serde_json::Value::String(value.clone()),
            Node::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Node::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Integral numbers render without a fractional part; `-0.0` keeps its sign
fn integral(value: f64) -> Option<i64> {
    let negative_zero = value == 0.0 && value.is_sign_negative();
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER && !negative_zero {
        #[allow(clippy::cast_possible_truncation)]
        Some(value as i64)
    } else {
        None
    }
}

fn json_number(value: f64) -> serde_json::Value {
    match integral(value) {
        Some(int) => serde_json::Value::from(int),
        None => serde_json::Number::from_f64(value)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.node(), f)
    }
}

/// Compact JSON rendering
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Deep value equality; map entry order is not significant
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }

        match (self.node(), other.node()) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::List(a), Node::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
            }
            (Node::Map(a), Node::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.get(key).is_some_and(|other| value == other))
            }
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::null(),
            serde_json::Value::Bool(b) => Self::bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or_else(Self::null, Self::number),
            serde_json::Value::String(s) => Self::string(s),
            serde_json::Value::Array(items) => Self::list(items.into_iter().map(Self::from)),
            serde_json::Value::Object(entries) => {
                Self::map(entries.into_iter().map(|(k, v)| (k, Self::from(v))))
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        value.to_json()
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self::number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::string(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::from_list(items)
    }
}

impl From<Map> for Value {
    fn from(entries: Map) -> Self {
        Self::from_map(entries)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.node() {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(value) => serializer.serialize_bool(*value),
            Node::Number(value) => match integral(*value) {
                Some(int) => serializer.serialize_i64(int),
                None => serializer.serialize_f64(*value),
            },
            Node::String(value) => serializer.serialize_str(value),
            Node::List(items) => serializer.collect_seq(items),
            Node::Map(entries) => serializer.collect_map(entries),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}
