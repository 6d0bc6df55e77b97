//! Template core and object templates.
//!
//! A template pairs a native template handle with the isolate that owns it.
//! Object templates come in two roles, both reached through a
//! [`FunctionTemplate`]: the instance template shapes own properties copied
//! onto every new instance, and the prototype template holds members shared
//! across instances through the per-context prototype object.

use crate::engine::{PropertySeed, TemplateHandle};
use crate::function_template::FunctionTemplate;
use crate::isolate::Isolate;

/// Shared core of the two template kinds.
#[derive(Debug, Clone)]
pub(crate) struct RawTemplate {
    pub iso: Isolate,
    pub handle: TemplateHandle,
}

/// Shapes objects created from a function template.
#[derive(Debug, Clone)]
pub struct ObjectTemplate {
    pub(crate) raw: RawTemplate,
}

impl ObjectTemplate {
    /// Records a property under `name`, replacing any previous entry while
    /// keeping its first-insertion position.
    pub fn set(&self, name: &str, value: impl Into<TemplateProperty>) {
        let seed = match value.into() {
            TemplateProperty::Undefined => PropertySeed::Undefined,
            TemplateProperty::Null => PropertySeed::Null,
            TemplateProperty::Boolean(flag) => PropertySeed::Boolean(flag),
            TemplateProperty::Number(number) => PropertySeed::Number(number),
            TemplateProperty::String(text) => PropertySeed::Str(text),
            TemplateProperty::Function(template) => {
                self.raw
                    .iso
                    .assert_same(template.isolate(), "function template property");
                PropertySeed::Function(template.handle())
            }
        };
        self.raw
            .iso
            .state
            .borrow_mut()
            .engine
            .template_set(self.raw.handle, name, seed);
    }

    pub fn isolate(&self) -> &Isolate {
        &self.raw.iso
    }
}

/// The value shapes an object template can hold. Function templates
/// materialize per context when instances or prototypes are built.
#[derive(Debug, Clone)]
pub enum TemplateProperty {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Function(FunctionTemplate),
}

impl From<()> for TemplateProperty {
    fn from((): ()) -> Self {
        TemplateProperty::Undefined
    }
}

impl From<bool> for TemplateProperty {
    fn from(flag: bool) -> Self {
        TemplateProperty::Boolean(flag)
    }
}

impl From<f64> for TemplateProperty {
    fn from(number: f64) -> Self {
        TemplateProperty::Number(number)
    }
}

impl From<i32> for TemplateProperty {
    fn from(number: i32) -> Self {
        TemplateProperty::Number(f64::from(number))
    }
}

impl From<&str> for TemplateProperty {
    fn from(text: &str) -> Self {
        TemplateProperty::String(text.to_string())
    }
}

impl From<String> for TemplateProperty {
    fn from(text: String) -> Self {
        TemplateProperty::String(text)
    }
}

impl From<&FunctionTemplate> for TemplateProperty {
    fn from(template: &FunctionTemplate) -> Self {
        TemplateProperty::Function(template.clone())
    }
}

impl From<FunctionTemplate> for TemplateProperty {
    fn from(template: FunctionTemplate) -> Self {
        TemplateProperty::Function(template)
    }
}
