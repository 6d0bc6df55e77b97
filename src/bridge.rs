//! Invocation bridge: the trampoline between the engine and host callbacks.
//!
//! The engine enters here when script code invokes a host-backed function.
//! The bridge resolves the context and callback from their identifiers,
//! wraps the packed receiver and argument handles, runs the callback, and
//! translates its outcome into the boundary's (result, exception) pair.
//! Nothing persists across invocations.

use crate::context::Context;
use crate::engine::{ContextId, ValueHandle};
use crate::error::HostError;
use crate::isolate::Isolate;
use crate::registry::CallbackHandle;
use crate::value::{Object, Value};

/// Per-invocation call data: the context, the receiver, and the arguments in
/// call order. Wrappers are valid for the dynamic extent of the call unless
/// cloned out before release.
pub struct CallInfo {
    ctx: Context,
    this: Object,
    args: Vec<Value>,
}

impl CallInfo {
    /// The context the call executes in.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The receiver ("this") of the call.
    pub fn this(&self) -> &Object {
        &self.this
    }

    /// The arguments, in call order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Releases the receiver and every argument wrapper exactly once.
    /// Consuming the wrapper makes double release and post-release access
    /// compile errors rather than undefined behavior.
    pub fn release(self) {}
}

/// Trampoline for a boundary call. `receiver_and_args` packs the receiver's
/// handle in slot 0 and the argument handles after it; each slot carries one
/// reference that the built wrappers adopt. Returns the result handle or the
/// exception handle (never both); both `None` means no return value.
pub(crate) fn invoke(
    isolate: &Isolate,
    context: ContextId,
    callback: CallbackHandle,
    receiver_and_args: &[ValueHandle],
    arg_count: usize,
) -> (Option<ValueHandle>, Option<ValueHandle>) {
    debug_assert_eq!(
        receiver_and_args.len(),
        arg_count + 1,
        "packed slice must hold the receiver plus {arg_count} arguments"
    );
    let ctx = Context::resolve(isolate, context);

    let (receiver, rest) = match receiver_and_args.split_first() {
        Some(split) => split,
        None => panic!("boundary call arrived without a receiver slot"),
    };
    let info = CallInfo {
        this: Object::adopt(&ctx, *receiver),
        args: rest.iter().map(|&handle| Value::adopt(&ctx, handle)).collect(),
        ctx,
    };

    let callback = isolate.state.borrow().callbacks.lookup(callback);
    // No isolate borrow may be held here: the callback re-enters the engine
    // to construct values.
    let outcome = callback(&info);

    let translated = match outcome {
        Ok(None) => (None, None),
        Ok(Some(value)) => (Some(transfer(isolate, value)), None),
        Err(HostError::Value(value)) => (None, Some(transfer(isolate, value))),
        Err(HostError::Message(text)) => {
            let thrown = isolate.state.borrow_mut().engine.new_string(&text);
            (None, Some(thrown))
        }
    };
    info.release();
    translated
}

/// Moves a wrapper's reference across the boundary: the returned handle owns
/// the reference the wrapper held.
fn transfer(isolate: &Isolate, value: Value) -> ValueHandle {
    isolate.assert_same(value.context().isolate(), "callback result value");
    let handle = value.handle();
    isolate.state.borrow_mut().engine.retain(handle);
    drop(value);
    handle
}
