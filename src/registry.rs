//! Per-isolate callback registry.
//!
//! Handles are dense indices into an append-only arena. A handle stays valid
//! for exactly as long as the isolate that issued it; there is no removal.
//! The arena is owned by the isolate and dropped with it.

use std::rc::Rc;

use crate::bridge::CallInfo;
use crate::error::HostError;
use crate::value::Value;

/// What a registered callback returns: an optional result value, or an error
/// the bridge translates into a script-visible exception.
pub type CallbackResult = Result<Option<Value>, HostError>;

pub(crate) type CallbackFn = dyn Fn(&CallInfo) -> CallbackResult;

/// Opaque identifier of a registered callback, unique within its isolate and
/// never reused while the isolate is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CallbackHandle(u32);

impl CallbackHandle {
    #[cfg(test)]
    pub(crate) fn from_index(index: u32) -> Self {
        CallbackHandle(index)
    }
}

pub(crate) struct CallbackRegistry {
    callbacks: Vec<Rc<CallbackFn>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        CallbackRegistry {
            callbacks: Vec::new(),
        }
    }

    /// Appends a callback and returns its handle.
    pub fn register(&mut self, callback: Rc<CallbackFn>) -> CallbackHandle {
        let handle = CallbackHandle(self.callbacks.len() as u32);
        self.callbacks.push(callback);
        handle
    }

    /// Resolves a handle. An unknown handle means the boundary state is
    /// corrupted, which is unrecoverable.
    pub fn lookup(&self, handle: CallbackHandle) -> Rc<CallbackFn> {
        match self.callbacks.get(handle.0 as usize) {
            Some(callback) => Rc::clone(callback),
            None => panic!("unknown callback handle {handle:?}"),
        }
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.callbacks.len())
            .finish()
    }
}
