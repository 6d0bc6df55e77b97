//! Isolate: one engine instance plus the state the bridge needs to serve it.
//!
//! An isolate owns the engine arenas, the callback registry, and the table of
//! live contexts. Ownership is shared (`Rc`): templates, contexts, and value
//! wrappers all hold a clone, so nothing that can resolve a handle outlives
//! the state that resolves it. Everything is `!Send`/`!Sync` by construction;
//! an isolate is confined to the thread that created it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::context::ContextInner;
use crate::engine::{ContextId, Engine};
use crate::prelude::FxHashMap;
use crate::registry::CallbackRegistry;

#[derive(Debug)]
pub(crate) struct IsolateState {
    pub engine: Engine,
    pub callbacks: CallbackRegistry,
    /// Live contexts by identifier, so the bridge can resolve the context a
    /// boundary call names. Weak: the table never keeps a context alive.
    pub contexts: FxHashMap<ContextId, Weak<ContextInner>>,
}

/// An independent engine instance with single-threaded confinement.
#[derive(Debug, Clone)]
pub struct Isolate {
    pub(crate) state: Rc<RefCell<IsolateState>>,
}

impl Isolate {
    pub fn new() -> Self {
        Isolate {
            state: Rc::new(RefCell::new(IsolateState {
                engine: Engine::new(),
                callbacks: CallbackRegistry::new(),
                contexts: FxHashMap::default(),
            })),
        }
    }

    /// Whether two wrappers refer to the same isolate.
    pub(crate) fn ptr_eq(&self, other: &Isolate) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Misuse guard for operations that mix isolates.
    pub(crate) fn assert_same(&self, other: &Isolate, what: &str) {
        if !self.ptr_eq(other) {
            panic!("{what} belongs to a different isolate");
        }
    }
}

impl Default for Isolate {
    fn default() -> Self {
        Self::new()
    }
}
