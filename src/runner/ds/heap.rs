//! Per-render ownership of script scopes.
//!
//! A closure keeps its defining scope alive, and that scope usually holds the
//! closure right back, so scopes form reference cycles that outlive every
//! evaluation. The heap tracks each scope created under it and
//! [`release`](Heap::release) empties them all at once, which breaks those
//! cycles. The heap also carries the call depth of the scripts running on it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::scope::Scope;

/// Script calls may nest at most this deep on one heap.
pub const MAX_CALL_DEPTH: usize = 64;

#[derive(Default)]
pub struct Heap {
    scopes: RefCell<Vec<Weak<Scope>>>,
    call_depth: Cell<usize>,
}

impl Heap {
    pub fn new() -> Rc<Self> {
        Rc::new(Heap::default())
    }

    pub(crate) fn track(&self, scope: &Rc<Scope>) {
        let mut scopes = self.scopes.borrow_mut();
        if scopes.len() == scopes.capacity() {
            scopes.retain(|s| s.strong_count() > 0);
        }
        scopes.push(Rc::downgrade(scope));
    }

    /// Number of tracked scopes that are still alive.
    pub fn live_scopes(&self) -> usize {
        self.scopes
            .borrow()
            .iter()
            .filter(|s| s.strong_count() > 0)
            .count()
    }

    /// Empty every live scope. Closures created on this heap see no
    /// variables afterwards.
    pub fn release(&self) {
        let scopes = std::mem::take(&mut *self.scopes.borrow_mut());
        let mut released = 0;
        for scope in scopes.iter().filter_map(Weak::upgrade) {
            scope.release();
            released += 1;
        }
        debug!("Released {} scopes", released);
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth.get()
    }

    /// Count a script call for as long as the returned guard lives.
    pub fn enter_call(self: &Rc<Self>) -> Result<CallGuard, ScriptError> {
        let depth = self.call_depth.get();
        if depth >= MAX_CALL_DEPTH {
            return Err(ScriptError::Thrown(
                "RangeError: Maximum call stack size exceeded".to_string(),
            ));
        }
        self.call_depth.set(depth + 1);
        Ok(CallGuard { heap: self.clone() })
    }
}

pub struct CallGuard {
    heap: Rc<Heap>,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        let depth = &self.heap.call_depth;
        depth.set(depth.get().saturating_sub(1));
    }
}
