//! Value and object wrappers over native handles.
//!
//! A [`Value`] owns exactly one engine-side reference to its slot: cloning
//! takes an additional reference, dropping releases it, and [`Value::release`]
//! is the explicit spelling of drop. Because release consumes the wrapper, a
//! released value cannot be dereferenced again.

use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::engine::{ValueData, ValueHandle};
use crate::error::Error;

/// A handle to an engine value, scoped to the context that produced it.
pub struct Value {
    ctx: Context,
    handle: ValueHandle,
}

impl Value {
    /// Wraps a handle, adopting the one reference the caller owns.
    pub(crate) fn adopt(ctx: &Context, handle: ValueHandle) -> Value {
        Value {
            ctx: ctx.clone(),
            handle,
        }
    }

    pub(crate) fn handle(&self) -> ValueHandle {
        self.handle
    }

    /// The context this value belongs to.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Releases the wrapper's reference. Equivalent to dropping; provided so
    /// release points can be spelled out.
    pub fn release(self) {}

    // ── predicates ─────────────────────────────────────────────────────────

    pub fn is_undefined(&self) -> bool {
        self.with_data(|data| matches!(data, ValueData::Undefined))
    }

    pub fn is_null(&self) -> bool {
        self.with_data(|data| matches!(data, ValueData::Null))
    }

    /// Undefined or null.
    pub fn is_nullish(&self) -> bool {
        self.with_data(|data| matches!(data, ValueData::Undefined | ValueData::Null))
    }

    pub fn is_boolean(&self) -> bool {
        self.with_data(|data| matches!(data, ValueData::Boolean(_)))
    }

    pub fn is_number(&self) -> bool {
        self.with_data(|data| matches!(data, ValueData::Number(_)))
    }

    pub fn is_string(&self) -> bool {
        self.with_data(|data| matches!(data, ValueData::Str(_)))
    }

    pub fn is_object(&self) -> bool {
        self.with_data(|data| matches!(data, ValueData::Object(_)))
    }

    pub fn is_function(&self) -> bool {
        self.with_data(|data| {
            matches!(data, ValueData::Object(object) if object.callable.is_some())
        })
    }

    // ── extractors ─────────────────────────────────────────────────────────

    pub fn as_boolean(&self) -> Option<bool> {
        self.with_data(|data| match data {
            ValueData::Boolean(flag) => Some(*flag),
            _ => None,
        })
    }

    pub fn as_number(&self) -> Option<f64> {
        self.with_data(|data| match data {
            ValueData::Number(number) => Some(*number),
            _ => None,
        })
    }

    pub fn as_string(&self) -> Option<Rc<str>> {
        self.with_data(|data| match data {
            ValueData::Str(text) => Some(Rc::clone(text)),
            _ => None,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.with_data(|data| match data {
            ValueData::Undefined => "undefined",
            ValueData::Null => "null",
            ValueData::Boolean(_) => "boolean",
            ValueData::Number(_) => "number",
            ValueData::Str(_) => "string",
            ValueData::Object(object) if object.callable.is_some() => "function",
            ValueData::Object(_) => "object",
        })
    }

    /// Identity comparison: handle identity for objects, value equality for
    /// primitives. NaN equals NaN.
    pub fn same_value(&self, other: &Value) -> bool {
        if !self.ctx.isolate().ptr_eq(other.ctx.isolate()) {
            return false;
        }
        if self.handle == other.handle {
            return true;
        }
        let state = self.ctx.isolate().state.borrow();
        match (state.engine.data(self.handle), state.engine.data(other.handle)) {
            (ValueData::Undefined, ValueData::Undefined) => true,
            (ValueData::Null, ValueData::Null) => true,
            (ValueData::Boolean(a), ValueData::Boolean(b)) => a == b,
            (ValueData::Number(a), ValueData::Number(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            (ValueData::Str(a), ValueData::Str(b)) => a == b,
            _ => false,
        }
    }

    /// Serializes the value to JSON. Functions are unrepresentable.
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        let state = self.ctx.isolate().state.borrow();
        Ok(state.engine.json_of(self.handle)?)
    }

    fn with_data<R>(&self, read: impl FnOnce(&ValueData) -> R) -> R {
        let state = self.ctx.isolate().state.borrow();
        read(state.engine.data(self.handle))
    }
}

impl Clone for Value {
    fn clone(&self) -> Value {
        self.ctx
            .isolate()
            .state
            .borrow_mut()
            .engine
            .retain(self.handle);
        Value {
            ctx: self.ctx.clone(),
            handle: self.handle,
        }
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        self.ctx
            .isolate()
            .state
            .borrow_mut()
            .engine
            .release(self.handle);
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug may run while the isolate is borrowed (panic payloads), so
        // fall back to the bare handle rather than re-borrowing.
        match self.ctx.isolate().state.try_borrow() {
            Ok(state) => write!(f, "Value({:?})", state.engine.data(self.handle)),
            Err(_) => write!(f, "Value({:?})", self.handle),
        }
    }
}

/// An object-typed value with property access along the prototype chain.
#[derive(Debug, Clone)]
pub struct Object {
    value: Value,
}

impl Object {
    /// Wraps a handle, adopting the one reference the caller owns. The
    /// receiver slot of a boundary call may legitimately be a non-object
    /// (e.g. undefined); property lookups on it simply find nothing.
    pub(crate) fn adopt(ctx: &Context, handle: ValueHandle) -> Object {
        Object {
            value: Value::adopt(ctx, handle),
        }
    }

    /// Own-then-prototype-chain lookup; undefined when absent.
    pub fn get(&self, key: &str) -> Value {
        let found = {
            let ctx = self.value.context();
            let mut state = ctx.isolate().state.borrow_mut();
            let found = state.engine.lookup_property(self.value.handle(), key);
            if let Some(handle) = found {
                state.engine.retain(handle);
            }
            found
        };
        match found {
            Some(handle) => Value::adopt(self.value.context(), handle),
            None => self.value.context().undefined(),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        let ctx = self.value.context();
        let state = ctx.isolate().state.borrow();
        state.engine.lookup_property(self.value.handle(), key).is_some()
    }

    /// Releases the wrapper's reference. Equivalent to dropping.
    pub fn release(self) {}
}

impl std::ops::Deref for Object {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.value
    }
}
