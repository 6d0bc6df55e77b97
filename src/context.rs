//! Execution contexts and value construction.
//!
//! A context is the environment a function template is bound into. Wrappers
//! created from a context (values, functions, call info) hold a clone of it,
//! so the engine-side context survives until the last of them is gone;
//! dropping the final clone releases every cached function and prototype
//! object exactly once.

use std::rc::Rc;

use crate::engine::ContextId;
use crate::isolate::Isolate;
use crate::value::Value;

#[derive(Debug)]
pub(crate) struct ContextInner {
    pub iso: Isolate,
    pub id: ContextId,
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        let mut state = self.iso.state.borrow_mut();
        state.contexts.remove(&self.id);
        state.engine.destroy_context(self.id);
    }
}

/// An execution environment within an isolate. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

impl Context {
    /// Creates a context in the isolate and registers it so boundary calls
    /// can name it by identifier.
    pub fn new(isolate: &Isolate) -> Context {
        let id = isolate.state.borrow_mut().engine.create_context();
        let inner = Rc::new(ContextInner {
            iso: isolate.clone(),
            id,
        });
        isolate
            .state
            .borrow_mut()
            .contexts
            .insert(id, Rc::downgrade(&inner));
        Context { inner }
    }

    /// Resolves a context identifier arriving through the boundary. A dead
    /// identifier means the boundary state is corrupted, which is
    /// unrecoverable.
    pub(crate) fn resolve(isolate: &Isolate, id: ContextId) -> Context {
        let slot = isolate.state.borrow().contexts.get(&id).cloned();
        match slot.and_then(|weak| weak.upgrade()) {
            Some(inner) => Context { inner },
            None => panic!("boundary call named a dead context {id:?}"),
        }
    }

    pub fn isolate(&self) -> &Isolate {
        &self.inner.iso
    }

    pub(crate) fn id(&self) -> ContextId {
        self.inner.id
    }

    // ── value constructors ─────────────────────────────────────────────────

    pub fn undefined(&self) -> Value {
        let handle = self.inner.iso.state.borrow_mut().engine.undefined();
        Value::adopt(self, handle)
    }

    pub fn null(&self) -> Value {
        let handle = self.inner.iso.state.borrow_mut().engine.null();
        Value::adopt(self, handle)
    }

    pub fn boolean(&self, flag: bool) -> Value {
        let handle = self.inner.iso.state.borrow_mut().engine.boolean(flag);
        Value::adopt(self, handle)
    }

    pub fn number(&self, number: f64) -> Value {
        let handle = {
            let mut state = self.inner.iso.state.borrow_mut();
            state
                .engine
                .alloc(crate::engine::ValueData::Number(number))
        };
        Value::adopt(self, handle)
    }

    pub fn string(&self, text: &str) -> Value {
        let handle = self.inner.iso.state.borrow_mut().engine.new_string(text);
        Value::adopt(self, handle)
    }

    /// Builds a value tree from JSON. Objects become engine objects; arrays
    /// become objects with index keys plus a `length` property.
    pub fn from_json(&self, json: &serde_json::Value) -> Value {
        let handle = self.inner.iso.state.borrow_mut().engine.from_json(json);
        Value::adopt(self, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ValueHandle;
    use crate::function_template::FunctionTemplate;

    fn refs(isolate: &Isolate, handle: ValueHandle) -> u32 {
        isolate.state.borrow().engine.refs(handle)
    }

    #[test]
    fn dropping_the_last_wrapper_tears_the_context_down() {
        let isolate = Isolate::new();
        let context = Context::new(&isolate);
        let id = context.id();

        let template = FunctionTemplate::new_simple(&isolate, |_| None);
        let function = match template.get_function(&context) {
            Ok(function) => function,
            Err(error) => panic!("materialization failed: {error}"),
        };
        let handle = function.handle();

        // One reference for the wrapper, one for the per-context cache.
        assert_eq!(refs(&isolate, handle), 2);
        drop(function);
        assert_eq!(refs(&isolate, handle), 1);

        drop(context);
        assert!(isolate.state.borrow().contexts.get(&id).is_none());
        assert_eq!(refs(&isolate, handle), 0);
    }

    #[test]
    fn contexts_resolve_by_identifier_while_alive() {
        let isolate = Isolate::new();
        let context = Context::new(&isolate);
        let resolved = Context::resolve(&isolate, context.id());
        assert_eq!(resolved.id(), context.id());
    }
}
