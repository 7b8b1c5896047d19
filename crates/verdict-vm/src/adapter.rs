//! Host data-model capability.
//!
//! The interpreter never marshals host records itself; field-select and
//! struct-construction steps live with the embedder. What the core defines
//! is the conversion capability those steps call through, carried by
//! [`Value::Message`](crate::value::Value::Message) as a shared handle.

use std::fmt;

use thiserror::Error;

use crate::arena::EvalArena;
use crate::value::Value;

/// Failure reported by a host record when a field cannot be read or
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("no such field '{0}'")]
    NoSuchField(String),

    #[error("field '{field}' cannot hold a {got}")]
    TypeMismatch { field: String, got: &'static str },
}

/// A strongly-typed record owned by the host.
///
/// `read_field` receives the frame's arena so conversions that must
/// materialize owned storage (a temporarily built string, a widened
/// integer) allocate through the evaluation's scope rather than an ambient
/// allocator. `write_field` is used while a record is still under
/// construction, before it is sealed into a [`Value::Message`](crate::value::Value::Message).
pub trait HostRecord: fmt::Debug + Send + Sync {
    /// Fully-qualified type name of the record.
    fn record_type(&self) -> &str;

    /// Read a field as a runtime value.
    fn read_field(&self, field: &str, arena: &EvalArena) -> Value;

    /// Write a field of a record under construction.
    fn write_field(&mut self, field: &str, value: Value) -> Result<(), FieldError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Flag {
        enabled: bool,
    }

    impl HostRecord for Flag {
        fn record_type(&self) -> &str {
            "test.Flag"
        }

        fn read_field(&self, field: &str, _arena: &EvalArena) -> Value {
            match field {
                "enabled" => Value::Bool(self.enabled),
                other => Value::error(crate::error::EvalError::Message(format!(
                    "no such field '{other}'"
                ))),
            }
        }

        fn write_field(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
            match (field, value) {
                ("enabled", Value::Bool(b)) => {
                    self.enabled = b;
                    Ok(())
                }
                ("enabled", other) => Err(FieldError::TypeMismatch {
                    field: field.to_string(),
                    got: other.type_name(),
                }),
                (_, _) => Err(FieldError::NoSuchField(field.to_string())),
            }
        }
    }

    #[test]
    fn test_record_round_trip() {
        let arena = EvalArena::new();
        let mut flag = Flag::default();
        flag.write_field("enabled", Value::Bool(true)).unwrap();
        assert_eq!(
            flag.write_field("enabled", Value::Int(1)),
            Err(FieldError::TypeMismatch {
                field: "enabled".to_string(),
                got: "int"
            })
        );
        let sealed = Value::Message(Arc::new(flag));
        let Value::Message(record) = &sealed else {
            unreachable!()
        };
        assert_eq!(record.read_field("enabled", &arena), Value::Bool(true));
    }

    #[test]
    fn test_message_equality_is_identity() {
        let a = Value::Message(Arc::new(Flag { enabled: true }));
        let b = Value::Message(Arc::new(Flag { enabled: true }));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
