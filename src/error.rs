//! Error types for the embedding bridge.
//!
//! Only recoverable conditions live here. Contract violations — unknown
//! callback handles, dead context identifiers, cross-isolate mixing — panic
//! at the point of misuse instead of surfacing as values.

use std::fmt;

use thiserror::Error;

use crate::engine::EngineFault;
use crate::value::Value;

/// An error a host callback hands back to the bridge, translated into an
/// exception visible to script code.
#[derive(Debug, Error)]
pub enum HostError {
    /// A plain message; the bridge throws it as an engine string value.
    #[error("{0}")]
    Message(String),

    /// The exact value to throw, propagated across the boundary verbatim.
    #[error("exception value thrown")]
    Value(Value),
}

impl HostError {
    /// Convenience constructor for the message form.
    pub fn message(text: impl Into<String>) -> Self {
        HostError::Message(text.into())
    }
}

/// Recoverable errors from the template and value surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Binding a function template to a context failed. The reachable cause
    /// is a prototype chain that loops through `inherit` linkage.
    #[error("failed to materialize function: {0}")]
    Materialization(String),

    /// The value has no JSON representation.
    #[error("{0} values cannot be represented as JSON")]
    Unrepresentable(&'static str),

    /// A constructor callback threw while building an instance.
    #[error("constructor threw: {0}")]
    Exception(Exception),
}

impl From<EngineFault> for Error {
    fn from(fault: EngineFault) -> Self {
        match fault {
            EngineFault::PrototypeCycle => {
                Error::Materialization("prototype chain cycles through inherit linkage".into())
            }
            EngineFault::Unrepresentable(kind) => Error::Unrepresentable(kind),
        }
    }
}

/// A value thrown by a host callback, as observed by the caller of
/// [`Function::call`](crate::Function::call).
///
/// The thrown value stays alive for as long as this wrapper does.
#[derive(Debug)]
pub struct Exception {
    value: Value,
}

impl Exception {
    pub(crate) fn new(value: Value) -> Self {
        Exception { value }
    }

    /// The thrown value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Takes ownership of the thrown value.
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.as_string() {
            Some(text) => write!(f, "{text}"),
            None => write!(f, "thrown {}", self.value.type_name()),
        }
    }
}

impl std::error::Error for Exception {}

impl From<Exception> for Error {
    fn from(exception: Exception) -> Self {
        Error::Exception(exception)
    }
}
