//! Value representation for reflective feature slots
//!
//! Every slot of every object holds a [`Value`]. Object-valued slots hold an
//! [`ObjectId`] handle into the owning runtime's arena rather than a pointer,
//! so the object graph may contain cycles (opposite references, a class that
//! is an instance of itself) without any ownership cycles in Rust.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle to an object stored in a runtime arena
///
/// The generation distinguishes a live object from a reclaimed one that used
/// the same slot; stale handles are reported as dangling.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Forward-declared handle used while the meta level is being linked
    pub const PLACEHOLDER: ObjectId = ObjectId {
        index: u32::MAX,
        generation: 0,
    };

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Whether this is the forward-declaration placeholder
    pub fn is_placeholder(self) -> bool {
        self == Self::PLACEHOLDER
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::PLACEHOLDER
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Identity of the collection backing a multi-valued feature
///
/// Two refs are equal iff they name the same `(owner, feature)` pair, which is
/// what makes repeated `get` calls return "the same collection".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    /// Instance owning the collection
    pub owner: ObjectId,
    /// Multi-valued feature the collection backs
    pub feature: ObjectId,
}

/// Unresolved reference placeholder installed by a resource collaborator
///
/// The core accepts it wherever an object is expected and never resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyRef {
    /// Collaborator-defined address of the referenced object
    pub href: String,
}

impl ProxyRef {
    /// Create a proxy for the given address
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Opaque handle to the persistence unit owning an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitHandle(pub u64);

/// Underlying primitive kind wrapped by a data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// UTF-8 string
    String,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Double,
    /// String-to-string map
    Map,
    /// Opaque native value; accepts anything
    Any,
}

impl PrimitiveKind {
    /// Whether a value has this primitive kind
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            PrimitiveKind::Any => true,
            PrimitiveKind::String => matches!(value, Value::String(_)),
            PrimitiveKind::Bool => matches!(value, Value::Bool(_)),
            PrimitiveKind::Int => matches!(value, Value::Int(_)),
            PrimitiveKind::Double => matches!(value, Value::Double(_)),
            PrimitiveKind::Map => matches!(value, Value::Map(_)),
        }
    }

    /// Map a host type name (as found in `instanceClassName`) to a kind
    pub fn from_instance_class_name(name: &str) -> Option<Self> {
        let kind = match name {
            "java.lang.String" | "char" | "java.lang.Character" => PrimitiveKind::String,
            "boolean" | "java.lang.Boolean" => PrimitiveKind::Bool,
            "byte" | "short" | "int" | "long" | "java.lang.Byte" | "java.lang.Short"
            | "java.lang.Integer" | "java.lang.Long" | "java.math.BigInteger" => PrimitiveKind::Int,
            "float" | "double" | "java.lang.Float" | "java.lang.Double"
            | "java.math.BigDecimal" => PrimitiveKind::Double,
            "java.util.Map" | "java.util.Map$Entry" => PrimitiveKind::Map,
            "java.lang.Object" | "java.lang.Class" => PrimitiveKind::Any,
            _ => return None,
        };
        Some(kind)
    }

    /// Kind name
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Map => "map",
            PrimitiveKind::Any => "any",
        }
    }
}

/// Slot value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value; conforms to every classifier
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Double(f64),
    /// String
    String(String),
    /// String-to-string map
    Map(BTreeMap<String, String>),
    /// Reference to an object (instance, descriptor, or enum literal)
    Object(ObjectId),
    /// A multi-valued feature's collection
    Collection(CollectionRef),
    /// Unresolved reference placeholder
    Proxy(ProxyRef),
    /// Detached sequence of values (batch notification payloads)
    List(Vec<Value>),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the float payload
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the map payload
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Get the referenced object
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Get the collection identity
    pub fn as_collection(&self) -> Option<CollectionRef> {
        match self {
            Value::Collection(c) => Some(*c),
            _ => None,
        }
    }

    /// Get the list payload
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this value is an unresolved proxy
    pub fn is_proxy(&self) -> bool {
        matches!(self, Value::Proxy(_))
    }

    /// Short name of the value's variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Collection(_) => "collection",
            Value::Proxy(_) => "proxy",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{}", s),
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Object(id) => write!(f, "{}", id),
            Value::Collection(c) => write!(f, "{}.{}[*]", c.owner, c.feature),
            Value::Proxy(p) => write!(f, "proxy({})", p.href),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(m: BTreeMap<String, String>) -> Self {
        Value::Map(m)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

impl From<Option<ObjectId>> for Value {
    fn from(id: Option<ObjectId>) -> Self {
        id.map_or(Value::Null, Value::Object)
    }
}

impl From<CollectionRef> for Value {
    fn from(c: CollectionRef) -> Self {
        Value::Collection(c)
    }
}

impl From<ProxyRef> for Value {
    fn from(p: ProxyRef) -> Self {
        Value::Proxy(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_kind_accepts() {
        assert!(PrimitiveKind::String.accepts(&Value::string("x")));
        assert!(!PrimitiveKind::String.accepts(&Value::Int(1)));
        assert!(PrimitiveKind::Int.accepts(&Value::Int(1)));
        assert!(!PrimitiveKind::Double.accepts(&Value::Int(1)));
        assert!(PrimitiveKind::Any.accepts(&Value::List(vec![])));
    }

    #[test]
    fn test_instance_class_name_mapping() {
        assert_eq!(
            PrimitiveKind::from_instance_class_name("java.lang.String"),
            Some(PrimitiveKind::String)
        );
        assert_eq!(
            PrimitiveKind::from_instance_class_name("int"),
            Some(PrimitiveKind::Int)
        );
        assert_eq!(PrimitiveKind::from_instance_class_name("com.acme.Thing"), None);
    }

    #[test]
    fn test_value_conversions() {
        let id = ObjectId::new(3, 1);
        assert_eq!(Value::from(id).as_object(), Some(id));
        assert_eq!(Value::from(None::<ObjectId>), Value::Null);
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::from(7i32).as_int(), Some(7));
    }

    #[test]
    fn test_placeholder() {
        assert!(ObjectId::default().is_placeholder());
        assert!(!ObjectId::new(0, 0).is_placeholder());
    }

    #[test]
    fn test_display() {
        let list = Value::List(vec![Value::Int(1), Value::string("a")]);
        assert_eq!(list.to_string(), "[1, a]");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
