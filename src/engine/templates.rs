//! Template store.
//!
//! Templates are blueprints the engine instantiates per context: function
//! templates carry a registered callback plus lazily created instance and
//! prototype object templates; object templates carry ordered property seeds.

use crate::prelude::IndexMap;
use crate::registry::CallbackHandle;

use super::TemplateHandle;

/// A property recorded on an object template, turned into an engine value
/// (or a per-context function) at materialization time.
#[derive(Debug, Clone)]
pub(crate) enum PropertySeed {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    Str(String),
    Function(TemplateHandle),
}

#[derive(Debug)]
pub(crate) enum TemplateData {
    Function(FunctionTemplateData),
    Object(ObjectTemplateData),
}

#[derive(Debug)]
pub(crate) struct FunctionTemplateData {
    pub callback: CallbackHandle,
    /// Lazily created object template for own instance properties.
    pub instance: Option<TemplateHandle>,
    /// Lazily created object template for shared prototype members.
    pub prototype: Option<TemplateHandle>,
    /// Prototype-chain parent set through inherit linkage. Write-once.
    pub parent: Option<TemplateHandle>,
}

#[derive(Debug, Default)]
pub(crate) struct ObjectTemplateData {
    pub properties: IndexMap<String, PropertySeed>,
}

#[derive(Debug)]
pub(crate) struct TemplateStore {
    templates: Vec<TemplateData>,
}

impl TemplateStore {
    pub fn new() -> Self {
        TemplateStore {
            templates: Vec::new(),
        }
    }

    pub fn create_function(&mut self, callback: CallbackHandle) -> TemplateHandle {
        self.push(TemplateData::Function(FunctionTemplateData {
            callback,
            instance: None,
            prototype: None,
            parent: None,
        }))
    }

    pub fn create_object(&mut self) -> TemplateHandle {
        self.push(TemplateData::Object(ObjectTemplateData::default()))
    }

    pub fn function(&self, handle: TemplateHandle) -> &FunctionTemplateData {
        match self.get(handle) {
            TemplateData::Function(data) => data,
            TemplateData::Object(_) => {
                panic!("template handle {handle:?} is not a function template")
            }
        }
    }

    pub fn function_mut(&mut self, handle: TemplateHandle) -> &mut FunctionTemplateData {
        match self.get_mut(handle) {
            TemplateData::Function(data) => data,
            TemplateData::Object(_) => {
                panic!("template handle {handle:?} is not a function template")
            }
        }
    }

    pub fn object(&self, handle: TemplateHandle) -> &ObjectTemplateData {
        match self.get(handle) {
            TemplateData::Object(data) => data,
            TemplateData::Function(_) => {
                panic!("template handle {handle:?} is not an object template")
            }
        }
    }

    pub fn object_mut(&mut self, handle: TemplateHandle) -> &mut ObjectTemplateData {
        match self.get_mut(handle) {
            TemplateData::Object(data) => data,
            TemplateData::Function(_) => {
                panic!("template handle {handle:?} is not an object template")
            }
        }
    }

    /// Returns the instance template, creating it on first access. Repeated
    /// calls yield the same handle.
    pub fn instance_template(&mut self, handle: TemplateHandle) -> TemplateHandle {
        if let Some(existing) = self.function(handle).instance {
            return existing;
        }
        let created = self.create_object();
        self.function_mut(handle).instance = Some(created);
        created
    }

    /// Returns the prototype template, creating it on first access. Repeated
    /// calls yield the same handle.
    pub fn prototype_template(&mut self, handle: TemplateHandle) -> TemplateHandle {
        if let Some(existing) = self.function(handle).prototype {
            return existing;
        }
        let created = self.create_object();
        self.function_mut(handle).prototype = Some(created);
        created
    }

    /// Links `handle`'s prototype chain to `base`. Re-linking to a different
    /// base is undefined in the underlying engine, so it is rejected as
    /// misuse here; re-linking to the same base is a no-op.
    pub fn inherit(&mut self, handle: TemplateHandle, base: TemplateHandle) {
        if handle == base {
            panic!("a function template cannot inherit from itself");
        }
        // Both sides must be function templates.
        self.function(base);
        let data = self.function_mut(handle);
        match data.parent {
            None => data.parent = Some(base),
            Some(current) if current == base => {}
            Some(_) => panic!("inherit may only be set once per function template"),
        }
    }

    fn push(&mut self, data: TemplateData) -> TemplateHandle {
        let handle = TemplateHandle(self.templates.len() as u32);
        self.templates.push(data);
        handle
    }

    fn get(&self, handle: TemplateHandle) -> &TemplateData {
        match self.templates.get(handle.0 as usize) {
            Some(data) => data,
            None => panic!("template handle {handle:?} is outside the store"),
        }
    }

    fn get_mut(&mut self, handle: TemplateHandle) -> &mut TemplateData {
        match self.templates.get_mut(handle.0 as usize) {
            Some(data) => data,
            None => panic!("template handle {handle:?} is outside the store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_function() -> (TemplateStore, TemplateHandle) {
        let mut store = TemplateStore::new();
        let handle = store.create_function(CallbackHandle::from_index(0));
        (store, handle)
    }

    #[test]
    fn instance_and_prototype_templates_are_cached() {
        let (mut store, function) = store_with_function();
        let instance = store.instance_template(function);
        let prototype = store.prototype_template(function);
        assert_ne!(instance, prototype);
        assert_eq!(store.instance_template(function), instance);
        assert_eq!(store.prototype_template(function), prototype);
    }

    #[test]
    fn inherit_same_base_twice_is_a_noop() {
        let (mut store, derived) = store_with_function();
        let base = store.create_function(CallbackHandle::from_index(1));
        store.inherit(derived, base);
        store.inherit(derived, base);
        assert_eq!(store.function(derived).parent, Some(base));
    }

    #[test]
    #[should_panic(expected = "only be set once")]
    fn inherit_retarget_is_misuse() {
        let (mut store, derived) = store_with_function();
        let first = store.create_function(CallbackHandle::from_index(1));
        let second = store.create_function(CallbackHandle::from_index(2));
        store.inherit(derived, first);
        store.inherit(derived, second);
    }

    #[test]
    #[should_panic(expected = "inherit from itself")]
    fn self_inherit_is_misuse() {
        let (mut store, derived) = store_with_function();
        store.inherit(derived, derived);
    }
}
