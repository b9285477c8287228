//! Data type bindings and string conversion

use std::collections::BTreeMap;

use crate::value::{ObjectId, PrimitiveKind, Value};
use crate::{MopError, MopResult, Runtime};

/// Host binding of a data type: primitive kind and default value
#[derive(Debug, Clone, PartialEq)]
pub struct DataTypeBinding {
    /// Primitive kind values of this type must have
    pub kind: PrimitiveKind,
    /// Value of an unset attribute typed by this data type
    pub default: Value,
}

impl DataTypeBinding {
    /// Create a binding
    pub fn new(kind: PrimitiveKind, default: Value) -> Self {
        Self { kind, default }
    }

    /// Binding using the natural default of the kind
    pub fn of_kind(kind: PrimitiveKind) -> Self {
        Self::new(kind, natural_default(kind))
    }
}

/// Zero value of a primitive kind
pub fn natural_default(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::Bool => Value::Bool(false),
        PrimitiveKind::Int => Value::Int(0),
        PrimitiveKind::Double => Value::Double(0.0),
        PrimitiveKind::Map => Value::Map(BTreeMap::new()),
        PrimitiveKind::String | PrimitiveKind::Any => Value::Null,
    }
}

/// Parse a literal according to a primitive kind
pub fn parse_literal(kind: PrimitiveKind, literal: &str) -> Option<Value> {
    match kind {
        PrimitiveKind::String | PrimitiveKind::Any => Some(Value::string(literal)),
        PrimitiveKind::Bool => match literal.trim() {
            "true" | "True" => Some(Value::Bool(true)),
            "false" | "False" => Some(Value::Bool(false)),
            _ => None,
        },
        PrimitiveKind::Int => literal.trim().parse().ok().map(Value::Int),
        PrimitiveKind::Double => literal.trim().parse().ok().map(Value::Double),
        PrimitiveKind::Map => None,
    }
}

impl Runtime {
    /// Primitive kind of a data type
    ///
    /// Uses the installed binding, then the `instanceClassName` slot, and
    /// falls back to [`PrimitiveKind::Any`].
    pub fn data_type_kind(&self, data_type: ObjectId) -> PrimitiveKind {
        if let Some(binding) = self.bindings.get(&data_type) {
            return binding.kind;
        }
        self.raw_str(data_type, self.meta.classifier_instance_class_name)
            .and_then(PrimitiveKind::from_instance_class_name)
            .unwrap_or(PrimitiveKind::Any)
    }

    /// Default value of a data type (or enum)
    pub fn data_type_default(&self, data_type: ObjectId) -> Value {
        if let Some(binding) = self.bindings.get(&data_type) {
            return binding.default.clone();
        }
        if self.is_enum(data_type) {
            return self.literals(data_type).first().copied().into();
        }
        natural_default(self.data_type_kind(data_type))
    }

    /// Install or replace the host binding of a data type
    pub fn bind_data_type(&mut self, data_type: ObjectId, binding: DataTypeBinding) {
        self.bindings.insert(data_type, binding);
    }

    /// Convert a literal to a value of the given data type or enum
    pub fn from_string(&self, data_type: ObjectId, literal: &str) -> MopResult<Value> {
        let parsed = if self.is_enum(data_type) {
            self.enum_literal(data_type, literal).map(Value::Object)
        } else {
            parse_literal(self.data_type_kind(data_type), literal)
        };
        parsed.ok_or_else(|| MopError::Conversion {
            datatype: self.display_name(data_type),
            literal: literal.to_string(),
        })
    }

    /// Render a value of the given data type or enum as a literal
    pub fn to_string(&self, data_type: ObjectId, value: &Value) -> MopResult<String> {
        if self.is_enum(data_type) {
            if let Some(lit) = value.as_object().filter(|l| self.literals(data_type).contains(l)) {
                return Ok(self.name(lit).unwrap_or_default().to_string());
            }
            return Err(MopError::Conversion {
                datatype: self.display_name(data_type),
                literal: value.to_string(),
            });
        }
        Ok(value.to_string())
    }
}
