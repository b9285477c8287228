//! Operation dispatch
//!
//! Operations are descriptors owned by classes; implementations are host
//! closures keyed by the operation descriptor. Invocation resolves the name
//! on the receiver's class at call time, so subclass operations with the
//! same name take precedence.

use std::sync::Arc;
use tracing::trace;

use crate::value::{ObjectId, Value};
use crate::{MopError, MopResult, Runtime};

/// Host implementation of an operation
///
/// Receives the runtime, the receiver and the arguments.
pub type OperationHandler =
    Arc<dyn Fn(&mut Runtime, ObjectId, &[Value]) -> MopResult<Value> + Send + Sync>;

impl Runtime {
    /// Install the implementation of an operation, replacing any previous one
    pub fn implement_operation<F>(&mut self, operation: ObjectId, handler: F)
    where
        F: Fn(&mut Runtime, ObjectId, &[Value]) -> MopResult<Value> + Send + Sync + 'static,
    {
        self.operations.insert(operation, Arc::new(handler));
    }

    /// Whether an operation has an implementation
    pub fn is_implemented(&self, operation: ObjectId) -> bool {
        self.operations.contains_key(&operation)
    }

    /// Invoke an operation by name on an instance
    ///
    /// Checks the argument count against the declared parameters (optional
    /// parameters may be omitted) and each argument against its parameter
    /// type before calling the implementation.
    pub fn invoke(&mut self, obj: ObjectId, name: &str, args: &[Value]) -> MopResult<Value> {
        let class = self.class_of(obj)?;
        let Some(operation) = self.find_operation(class, name) else {
            return Err(MopError::UnknownOperation {
                class: self.display_name(class),
                operation: name.to_string(),
            });
        };

        let parameters = self.parameters(operation);
        let required = parameters.iter().filter(|p| self.is_required(**p)).count();
        if args.len() < required || args.len() > parameters.len() {
            let expected = if required == parameters.len() {
                required.to_string()
            } else {
                format!("{}..={}", required, parameters.len())
            };
            return Err(MopError::ArgumentCount {
                operation: name.to_string(),
                expected,
                found: args.len(),
            });
        }
        for (parameter, arg) in parameters.iter().zip(args) {
            if let Some(ty) = self.feature_type(*parameter) {
                if !self.conforms(arg, ty) {
                    return Err(MopError::TypeConformance {
                        expected: self.display_name(ty),
                        found: self.describe(arg),
                    });
                }
            }
        }

        let Some(handler) = self.operations.get(&operation).cloned() else {
            let owner = self.operation_class(operation).unwrap_or(class);
            return Err(MopError::OperationNotImplemented {
                class: self.display_name(owner),
                operation: name.to_string(),
            });
        };

        trace!(operation = name, receiver = %obj, args = args.len(), "Dispatching operation");
        handler(self, obj, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{FeatureDefinition, OperationDefinition, ParameterDefinition};

    fn counter(rt: &mut Runtime) -> (ObjectId, ObjectId) {
        let class = rt.create_class("Counter").unwrap();
        let int = rt.meta().e_int;
        rt.define_feature(class, FeatureDefinition::attribute("count", int))
            .unwrap();
        let bump = rt
            .define_operation(
                class,
                OperationDefinition::new("bump")
                    .returns(int)
                    .with_param(ParameterDefinition::new("by", int)),
            )
            .unwrap();
        (class, bump)
    }

    #[test]
    fn test_invoke_mutates_receiver() {
        let mut rt = Runtime::new();
        let (class, bump) = counter(&mut rt);
        rt.implement_operation(bump, |rt, this, args| {
            let current = rt.get(this, "count")?.as_int().unwrap_or(0);
            let next = current + args[0].as_int().unwrap_or(0);
            rt.set(this, "count", next)?;
            Ok(Value::Int(next))
        });
        let c = rt.instantiate(class).unwrap();
        assert_eq!(rt.invoke(c, "bump", &[Value::Int(2)]).unwrap(), Value::Int(2));
        assert_eq!(rt.invoke(c, "bump", &[Value::Int(3)]).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_unimplemented_operation() {
        let mut rt = Runtime::new();
        let (class, _) = counter(&mut rt);
        let c = rt.instantiate(class).unwrap();
        assert_eq!(
            rt.invoke(c, "bump", &[Value::Int(1)]).unwrap_err(),
            MopError::OperationNotImplemented {
                class: "Counter".to_string(),
                operation: "bump".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_operation() {
        let mut rt = Runtime::new();
        let (class, _) = counter(&mut rt);
        let c = rt.instantiate(class).unwrap();
        assert!(matches!(
            rt.invoke(c, "reset", &[]),
            Err(MopError::UnknownOperation { .. })
        ));
    }

    #[test]
    fn test_argument_checks() {
        let mut rt = Runtime::new();
        let (class, bump) = counter(&mut rt);
        rt.implement_operation(bump, |_, _, _| Ok(Value::Null));
        let c = rt.instantiate(class).unwrap();
        assert!(matches!(
            rt.invoke(c, "bump", &[]),
            Err(MopError::ArgumentCount { found: 0, .. })
        ));
        assert!(matches!(
            rt.invoke(c, "bump", &[Value::string("x")]),
            Err(MopError::TypeConformance { .. })
        ));
    }
}
