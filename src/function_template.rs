//! Function templates: host callbacks made constructible inside contexts.
//!
//! Creating a template registers its callback with the isolate and allocates
//! an engine template bound to the resulting handle. At most one function
//! exists per (template, context) pair; re-requesting yields the same
//! underlying handle.

use std::rc::Rc;

use crate::bridge::CallInfo;
use crate::context::Context;
use crate::error::Error;
use crate::function::Function;
use crate::isolate::Isolate;
use crate::registry::{CallbackFn, CallbackResult};
use crate::template::{ObjectTemplate, RawTemplate};
use crate::value::Value;

/// Produces callable values bound to a context; owns an associated instance
/// template and prototype template. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FunctionTemplate {
    raw: RawTemplate,
}

impl FunctionTemplate {
    /// Creates a function template for a fallible callback. An error the
    /// callback returns is translated by the bridge into an exception thrown
    /// at the script call site.
    pub fn new<F>(isolate: &Isolate, callback: F) -> FunctionTemplate
    where
        F: Fn(&CallInfo) -> CallbackResult + 'static,
    {
        let callback: Rc<CallbackFn> = Rc::new(callback);
        let handle = {
            let mut state = isolate.state.borrow_mut();
            let registered = state.callbacks.register(callback);
            state.engine.create_function_template(registered)
        };
        FunctionTemplate {
            raw: RawTemplate {
                iso: isolate.clone(),
                handle,
            },
        }
    }

    /// Creates a function template for a callback with no error channel.
    /// Defined purely in terms of [`FunctionTemplate::new`].
    pub fn new_simple<F>(isolate: &Isolate, callback: F) -> FunctionTemplate
    where
        F: Fn(&CallInfo) -> Option<Value> + 'static,
    {
        Self::new(isolate, move |info| Ok(callback(info)))
    }

    /// Returns the function bound to `context`, materializing it on first
    /// request. A prototype chain that loops through [`inherit`] linkage
    /// surfaces as [`Error::Materialization`].
    ///
    /// [`inherit`]: FunctionTemplate::inherit
    pub fn get_function(&self, context: &Context) -> Result<Function, Error> {
        self.raw.iso.assert_same(context.isolate(), "context");
        let handle = {
            let mut state = self.raw.iso.state.borrow_mut();
            state.engine.get_function(self.raw.handle, context.id())?
        };
        Ok(Function::adopt(context, handle))
    }

    /// The object template for own properties of new instances. Lazily
    /// created; repeated calls return views over the same template.
    pub fn instance_template(&self) -> ObjectTemplate {
        let handle = {
            let mut state = self.raw.iso.state.borrow_mut();
            state.engine.instance_template(self.raw.handle)
        };
        ObjectTemplate {
            raw: RawTemplate {
                iso: self.raw.iso.clone(),
                handle,
            },
        }
    }

    /// The object template for members shared across instances. Lazily
    /// created; repeated calls return views over the same template.
    pub fn prototype_template(&self) -> ObjectTemplate {
        let handle = {
            let mut state = self.raw.iso.state.borrow_mut();
            state.engine.prototype_template(self.raw.handle)
        };
        ObjectTemplate {
            raw: RawTemplate {
                iso: self.raw.iso.clone(),
                handle,
            },
        }
    }

    /// Links this template's prototype chain to `base`: instances built from
    /// this template see `base`'s prototype members through the chain.
    /// Write-once; re-linking to a different base panics, re-linking to the
    /// same base is a no-op.
    pub fn inherit(&self, base: &FunctionTemplate) {
        self.raw.iso.assert_same(base.isolate(), "base template");
        self.raw
            .iso
            .state
            .borrow_mut()
            .engine
            .inherit(self.raw.handle, base.raw.handle);
    }

    pub fn isolate(&self) -> &Isolate {
        &self.raw.iso
    }

    pub(crate) fn handle(&self) -> crate::engine::TemplateHandle {
        self.raw.handle
    }
}
