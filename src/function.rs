//! Materialized functions and the host-side call surface.
//!
//! A `Function` is the callable bound to one (template, context) pair. Calls
//! pack the receiver and arguments the way the engine does — one retained
//! reference per slot — and route through the invocation bridge, so host- and
//! script-originated calls share a single dispatch path.

use crate::bridge;
use crate::context::Context;
use crate::engine::ValueHandle;
use crate::error::{Error, Exception};
use crate::value::{Object, Value};

/// A callable value bound to a context.
#[derive(Debug, Clone)]
pub struct Function {
    object: Object,
}

impl Function {
    pub(crate) fn adopt(ctx: &Context, handle: ValueHandle) -> Function {
        Function {
            object: Object::adopt(ctx, handle),
        }
    }

    /// Invokes the function with `receiver` as "this". A host error returned
    /// by the callback surfaces as the thrown [`Exception`]; a callback with
    /// no return value yields undefined.
    pub fn call(&self, receiver: &Value, args: &[Value]) -> Result<Value, Exception> {
        let ctx = self.object.context().clone();
        ctx.isolate()
            .assert_same(receiver.context().isolate(), "call receiver");
        for arg in args {
            ctx.isolate()
                .assert_same(arg.context().isolate(), "call argument");
        }

        let (callable, packed) = {
            let mut state = ctx.isolate().state.borrow_mut();
            let callable = state.engine.callable_of(self.object.handle());
            let mut packed = Vec::with_capacity(args.len() + 1);
            state.engine.retain(receiver.handle());
            packed.push(receiver.handle());
            for arg in args {
                state.engine.retain(arg.handle());
                packed.push(arg.handle());
            }
            (callable, packed)
        };

        let (result, exception) =
            bridge::invoke(ctx.isolate(), ctx.id(), callable.callback, &packed, args.len());
        if let Some(thrown) = exception {
            return Err(Exception::new(Value::adopt(&ctx, thrown)));
        }
        Ok(match result {
            Some(handle) => Value::adopt(&ctx, handle),
            None => ctx.undefined(),
        })
    }

    /// Constructs an instance shaped by the function's template: own
    /// properties copied from the instance template, prototype chained
    /// through inherit linkage. The callback then runs as a construct call
    /// with the fresh instance as receiver; a thrown exception aborts
    /// construction. The callback's return value is ignored.
    pub fn new_instance(&self, args: &[Value]) -> Result<Object, Error> {
        let ctx = self.object.context().clone();
        for arg in args {
            ctx.isolate()
                .assert_same(arg.context().isolate(), "constructor argument");
        }

        let (callable, instance, packed) = {
            let mut state = ctx.isolate().state.borrow_mut();
            let callable = state.engine.callable_of(self.object.handle());
            let instance = state.engine.construct_instance(callable.template, ctx.id())?;
            let mut packed = Vec::with_capacity(args.len() + 1);
            state.engine.retain(instance);
            packed.push(instance);
            for arg in args {
                state.engine.retain(arg.handle());
                packed.push(arg.handle());
            }
            (callable, instance, packed)
        };

        let (result, exception) =
            bridge::invoke(ctx.isolate(), ctx.id(), callable.callback, &packed, args.len());
        if let Some(returned) = result {
            // Construct calls discard the callback's result.
            ctx.isolate().state.borrow_mut().engine.release(returned);
        }
        if let Some(thrown) = exception {
            ctx.isolate().state.borrow_mut().engine.release(instance);
            return Err(Error::Exception(Exception::new(Value::adopt(&ctx, thrown))));
        }
        Ok(Object::adopt(&ctx, instance))
    }
}

impl std::ops::Deref for Function {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.object
    }
}
