//! Function templates and host-callback dispatch for embedding script
//! engines.
//!
//! Host code registers callbacks by building a [`FunctionTemplate`],
//! materializes a [`Function`] from it inside a [`Context`], and the
//! invocation bridge delivers calls back to the callback with a [`CallInfo`],
//! translating results and errors across the boundary.
//!
//! # Example
//!
//! ```
//! use hostfn::{Context, FunctionTemplate, Isolate};
//!
//! let isolate = Isolate::new();
//! let template = FunctionTemplate::new_simple(&isolate, |info| {
//!     let total: f64 = info.args().iter().filter_map(|arg| arg.as_number()).sum();
//!     Some(info.context().number(total))
//! });
//!
//! let context = Context::new(&isolate);
//! let function = template.get_function(&context).unwrap();
//! let result = function
//!     .call(&context.undefined(), &[context.number(1.0), context.number(2.0)])
//!     .unwrap();
//! assert_eq!(result.as_number(), Some(3.0));
//! ```
//!
//! # Thread safety
//!
//! An isolate and everything created from it are `!Send`/`!Sync`: each
//! isolate is confined to the thread that created it, and no internal locking
//! is performed.

mod bridge;
mod context;
mod engine;
mod error;
mod function;
mod function_template;
mod isolate;
mod prelude;
mod registry;
mod template;
mod value;

pub use bridge::CallInfo;
pub use context::Context;
pub use error::{Error, Exception, HostError};
pub use function::Function;
pub use function_template::FunctionTemplate;
pub use isolate::Isolate;
pub use registry::CallbackResult;
pub use template::{ObjectTemplate, TemplateProperty};
pub use value::{Object, Value};
