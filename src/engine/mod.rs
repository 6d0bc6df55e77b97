//! In-crate model of the native engine behind the boundary.
//!
//! The bridge and the template surface talk to the engine exclusively through
//! the operations here, addressed by opaque integer handles: a value heap, a
//! template store, and a context store with per-context materialization
//! caches. The model implements only what the boundary contract requires; it
//! is not a script engine.

mod heap;
mod templates;

pub(crate) use heap::{CallableData, ObjectData, ValueData};
pub(crate) use templates::PropertySeed;

use crate::prelude::{FxHashMap, FxHashSet};
use crate::registry::CallbackHandle;

use heap::Heap;
use templates::TemplateStore;

/// Opaque index of a heap slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ValueHandle(u32);

/// Opaque index of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TemplateHandle(u32);

/// Opaque identifier of a live context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ContextId(u32);

/// Recoverable engine-side failures.
#[derive(Debug)]
pub(crate) enum EngineFault {
    /// Inherit linkage forms a loop; the prototype chain cannot be built.
    PrototypeCycle,
    /// The value kind has no JSON representation.
    Unrepresentable(&'static str),
}

/// Per-context materialization caches. Each cached handle is owned by the
/// context and released when the context is destroyed.
#[derive(Debug, Default)]
struct ContextData {
    functions: FxHashMap<TemplateHandle, ValueHandle>,
    prototypes: FxHashMap<TemplateHandle, ValueHandle>,
}

#[derive(Debug)]
pub(crate) struct Engine {
    heap: Heap,
    templates: TemplateStore,
    contexts: FxHashMap<ContextId, ContextData>,
    next_context: u32,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            heap: Heap::new(),
            templates: TemplateStore::new(),
            contexts: FxHashMap::default(),
            next_context: 0,
        }
    }

    // ── contexts ───────────────────────────────────────────────────────────

    pub fn create_context(&mut self) -> ContextId {
        let id = ContextId(self.next_context);
        self.next_context += 1;
        self.contexts.insert(id, ContextData::default());
        id
    }

    /// Tears the context down, dropping every cached function and prototype
    /// object exactly once.
    pub fn destroy_context(&mut self, id: ContextId) {
        let Some(data) = self.contexts.remove(&id) else {
            panic!("destroy of unknown context {id:?}");
        };
        for (_, function) in data.functions {
            self.heap.release(function);
        }
        for (_, prototype) in data.prototypes {
            self.heap.release(prototype);
        }
    }

    // ── templates ──────────────────────────────────────────────────────────

    pub fn create_function_template(&mut self, callback: CallbackHandle) -> TemplateHandle {
        self.templates.create_function(callback)
    }

    pub fn instance_template(&mut self, template: TemplateHandle) -> TemplateHandle {
        self.templates.instance_template(template)
    }

    pub fn prototype_template(&mut self, template: TemplateHandle) -> TemplateHandle {
        self.templates.prototype_template(template)
    }

    pub fn inherit(&mut self, template: TemplateHandle, base: TemplateHandle) {
        self.templates.inherit(template, base);
    }

    pub fn template_set(&mut self, template: TemplateHandle, name: &str, seed: PropertySeed) {
        self.templates
            .object_mut(template)
            .properties
            .insert(name.to_string(), seed);
    }

    // ── materialization ────────────────────────────────────────────────────

    /// Returns the function for a (template, context) pair, materializing it
    /// on first request. The returned handle carries one reference owned by
    /// the caller; the per-context cache keeps its own, so repeated requests
    /// yield the same handle.
    pub fn get_function(
        &mut self,
        template: TemplateHandle,
        context: ContextId,
    ) -> Result<ValueHandle, EngineFault> {
        let function = self.function_for(template, context)?;
        self.heap.retain(function);
        Ok(function)
    }

    fn function_for(
        &mut self,
        template: TemplateHandle,
        context: ContextId,
    ) -> Result<ValueHandle, EngineFault> {
        self.check_prototype_chain(template)?;
        if let Some(&cached) = self.context(context).functions.get(&template) {
            return Ok(cached);
        }

        let callback = self.templates.function(template).callback;
        let function = self.heap.alloc(ValueData::Object(ObjectData {
            properties: Default::default(),
            prototype: None,
            callable: Some(CallableData { callback, template }),
        }));
        // Cache before building the prototype so templates that reference
        // each other through seeds terminate.
        self.context_mut(context).functions.insert(template, function);

        let prototype = self.prototype_object(template, context)?;
        self.heap.retain(prototype);
        match self.heap.data_mut(function) {
            ValueData::Object(object) => {
                object.properties.insert("prototype".to_string(), prototype);
            }
            _ => unreachable!("function slot was just allocated as an object"),
        }
        Ok(function)
    }

    /// The shared per-(template, context) prototype object, materialized on
    /// first access. The returned handle is owned by the context cache.
    fn prototype_object(
        &mut self,
        template: TemplateHandle,
        context: ContextId,
    ) -> Result<ValueHandle, EngineFault> {
        if let Some(&cached) = self.context(context).prototypes.get(&template) {
            return Ok(cached);
        }

        let prototype = self.heap.alloc(ValueData::Object(ObjectData::default()));
        self.context_mut(context)
            .prototypes
            .insert(template, prototype);

        // Shared members from the prototype template, if one was ever asked
        // for; materialized in insertion order.
        if let Some(members) = self.templates.function(template).prototype {
            let seeds: Vec<(String, PropertySeed)> = self
                .templates
                .object(members)
                .properties
                .iter()
                .map(|(name, seed)| (name.clone(), seed.clone()))
                .collect();
            for (name, seed) in seeds {
                let value = self.materialize_seed(&seed, context)?;
                self.insert_property(prototype, name, value);
            }
        }

        // Chain to the parent template's prototype object.
        if let Some(parent) = self.templates.function(template).parent {
            let parent_prototype = self.prototype_object(parent, context)?;
            self.heap.retain(parent_prototype);
            match self.heap.data_mut(prototype) {
                ValueData::Object(object) => object.prototype = Some(parent_prototype),
                _ => unreachable!("prototype slot was just allocated as an object"),
            }
        }
        Ok(prototype)
    }

    /// Builds a fresh instance shaped by the template: own properties copied
    /// from the instance template, prototype link to the shared prototype
    /// object. The returned handle carries one reference owned by the caller.
    pub fn construct_instance(
        &mut self,
        template: TemplateHandle,
        context: ContextId,
    ) -> Result<ValueHandle, EngineFault> {
        self.check_prototype_chain(template)?;
        let prototype = self.prototype_object(template, context)?;
        self.heap.retain(prototype);

        let instance = self.heap.alloc(ValueData::Object(ObjectData {
            properties: Default::default(),
            prototype: Some(prototype),
            callable: None,
        }));

        if let Some(own) = self.templates.function(template).instance {
            let seeds: Vec<(String, PropertySeed)> = self
                .templates
                .object(own)
                .properties
                .iter()
                .map(|(name, seed)| (name.clone(), seed.clone()))
                .collect();
            for (name, seed) in seeds {
                let value = self.materialize_seed(&seed, context)?;
                self.insert_property(instance, name, value);
            }
        }
        Ok(instance)
    }

    /// Turns a template property seed into a value. Primitive seeds allocate
    /// a fresh slot per materialization; function seeds resolve to the one
    /// function per (template, context).
    fn materialize_seed(
        &mut self,
        seed: &PropertySeed,
        context: ContextId,
    ) -> Result<ValueHandle, EngineFault> {
        Ok(match seed {
            PropertySeed::Undefined => self.undefined(),
            PropertySeed::Null => self.null(),
            PropertySeed::Boolean(flag) => self.boolean(*flag),
            PropertySeed::Number(number) => self.heap.alloc(ValueData::Number(*number)),
            PropertySeed::Str(text) => self.heap.alloc(ValueData::Str(text.as_str().into())),
            PropertySeed::Function(template) => {
                let function = self.function_for(*template, context)?;
                self.heap.retain(function);
                function
            }
        })
    }

    /// Walks inherit linkage from `template`; a revisited node means the
    /// chain can never be built.
    fn check_prototype_chain(&self, template: TemplateHandle) -> Result<(), EngineFault> {
        let mut seen = FxHashSet::default();
        let mut current = Some(template);
        while let Some(node) = current {
            if !seen.insert(node) {
                return Err(EngineFault::PrototypeCycle);
            }
            current = self.templates.function(node).parent;
        }
        Ok(())
    }

    /// Inserts an owned property value, dropping any value it replaces.
    fn insert_property(&mut self, object: ValueHandle, name: String, value: ValueHandle) {
        let replaced = match self.heap.data_mut(object) {
            ValueData::Object(data) => data.properties.insert(name, value),
            other => panic!("property insert on non-object value {other:?}"),
        };
        if let Some(old) = replaced {
            self.heap.release(old);
        }
    }

    // ── calls ──────────────────────────────────────────────────────────────

    /// Resolves a function value to its callable payload. Non-callable
    /// handles indicate a corrupted boundary.
    pub fn callable_of(&self, function: ValueHandle) -> CallableData {
        match self.heap.data(function) {
            ValueData::Object(ObjectData {
                callable: Some(callable),
                ..
            }) => *callable,
            other => panic!("value is not callable: {other:?}"),
        }
    }

    // ── values ─────────────────────────────────────────────────────────────

    pub fn data(&self, handle: ValueHandle) -> &ValueData {
        self.heap.data(handle)
    }

    pub fn retain(&mut self, handle: ValueHandle) {
        self.heap.retain(handle);
    }

    pub fn release(&mut self, handle: ValueHandle) {
        self.heap.release(handle);
    }

    pub fn alloc(&mut self, data: ValueData) -> ValueHandle {
        self.heap.alloc(data)
    }

    pub fn new_string(&mut self, text: &str) -> ValueHandle {
        self.heap.alloc(ValueData::Str(text.into()))
    }

    pub fn undefined(&mut self) -> ValueHandle {
        self.heap.retain(heap::UNDEFINED);
        heap::UNDEFINED
    }

    pub fn null(&mut self) -> ValueHandle {
        self.heap.retain(heap::NULL);
        heap::NULL
    }

    pub fn boolean(&mut self, flag: bool) -> ValueHandle {
        let handle = if flag { heap::TRUE } else { heap::FALSE };
        self.heap.retain(handle);
        handle
    }

    /// Own-then-prototype-chain property lookup. Returns an unretained
    /// handle; the caller retains if it keeps the value. Non-object receivers
    /// have no properties.
    pub fn lookup_property(&self, receiver: ValueHandle, key: &str) -> Option<ValueHandle> {
        let mut current = receiver;
        loop {
            let ValueData::Object(object) = self.heap.data(current) else {
                return None;
            };
            if let Some(&found) = object.properties.get(key) {
                return Some(found);
            }
            current = object.prototype?;
        }
    }

    /// Serializes a value tree to JSON. Functions are unrepresentable;
    /// non-finite numbers collapse to null, as JSON requires.
    pub fn json_of(&self, handle: ValueHandle) -> Result<serde_json::Value, EngineFault> {
        Ok(match self.heap.data(handle) {
            ValueData::Undefined => serde_json::Value::Null,
            ValueData::Null => serde_json::Value::Null,
            ValueData::Boolean(flag) => serde_json::Value::Bool(*flag),
            ValueData::Number(number) => serde_json::Number::from_f64(*number)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ValueData::Str(text) => serde_json::Value::String(text.to_string()),
            ValueData::Object(object) => {
                if object.callable.is_some() {
                    return Err(EngineFault::Unrepresentable("function"));
                }
                let mut map = serde_json::Map::new();
                for (name, &child) in &object.properties {
                    map.insert(name.clone(), self.json_of(child)?);
                }
                serde_json::Value::Object(map)
            }
        })
    }

    /// Builds a value tree from JSON. Arrays become objects with index keys
    /// plus a length property. The returned handle carries one reference
    /// owned by the caller; nested values are owned by their parents.
    pub fn from_json(&mut self, json: &serde_json::Value) -> ValueHandle {
        match json {
            serde_json::Value::Null => self.null(),
            serde_json::Value::Bool(flag) => self.boolean(*flag),
            serde_json::Value::Number(number) => self
                .heap
                .alloc(ValueData::Number(number.as_f64().unwrap_or(f64::NAN))),
            serde_json::Value::String(text) => self.new_string(text),
            serde_json::Value::Object(entries) => {
                let object = self.heap.alloc(ValueData::Object(ObjectData::default()));
                for (name, child) in entries {
                    let value = self.from_json(child);
                    self.insert_property(object, name.clone(), value);
                }
                object
            }
            serde_json::Value::Array(items) => {
                let object = self.heap.alloc(ValueData::Object(ObjectData::default()));
                for (index, child) in items.iter().enumerate() {
                    let value = self.from_json(child);
                    self.insert_property(object, index.to_string(), value);
                }
                let length = self.heap.alloc(ValueData::Number(items.len() as f64));
                self.insert_property(object, "length".to_string(), length);
                object
            }
        }
    }

    #[cfg(test)]
    pub fn refs(&self, handle: ValueHandle) -> u32 {
        self.heap.refs(handle)
    }

    fn context(&self, id: ContextId) -> &ContextData {
        match self.contexts.get(&id) {
            Some(data) => data,
            None => panic!("unknown context {id:?}"),
        }
    }

    fn context_mut(&mut self, id: ContextId) -> &mut ContextData {
        match self.contexts.get_mut(&id) {
            Some(data) => data,
            None => panic!("unknown context {id:?}"),
        }
    }
}
