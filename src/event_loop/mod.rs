//! Single-threaded cooperative task queue.
//!
//! All script evaluation and callback delivery happens in tasks on an
//! [`EventLoop`]. Scheduling onto an idle loop drains it right away on the
//! calling thread; scheduling from inside a running task only enqueues. Tasks
//! run in FIFO order and never overlap.

mod container;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use uuid::Uuid;

use crate::error::UseError;
use crate::runner::ds::heap::Heap;

pub use container::{AsyncContainer, UnaryCallback};

pub type Task = Box<dyn FnOnce() -> Result<(), UseError>>;

#[derive(Default)]
pub struct EventLoop {
    queue: RefCell<VecDeque<Task>>,
    running: Cell<bool>,
}

impl EventLoop {
    pub fn new() -> Self {
        EventLoop::default()
    }

    /// Enqueue a task, then drain the queue unless a drain is already in
    /// progress.
    ///
    /// A failing task does not stop the queue. The first failure seen during
    /// the drain is returned to the caller that started it.
    pub fn schedule(&self, task: Task) -> Result<(), UseError> {
        self.queue.borrow_mut().push_back(task);
        if self.running.get() {
            return Ok(());
        }
        self.drain()
    }

    fn drain(&self) -> Result<(), UseError> {
        self.running.set(true);
        let mut first_error = None;
        loop {
            let task = self.queue.borrow_mut().pop_front();
            let task = match task {
                Some(task) => task,
                None => break,
            };
            if let Err(e) = task() {
                error!("Task failed: {}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        self.running.set(false);
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Drop every queued task, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut queue = self.queue.borrow_mut();
        let discarded = queue.len();
        queue.clear();
        discarded
    }
}

/// The execution context of one render: an identity, the loop that runs its
/// tasks and the heap its scripts allocate scopes on.
#[derive(Clone)]
pub struct ExecutionContext {
    id: Uuid,
    event_loop: Rc<EventLoop>,
    heap: Rc<Heap>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        ExecutionContext {
            id: Uuid::new_v4(),
            event_loop: Rc::new(EventLoop::new()),
            heap: Heap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event_loop(&self) -> &Rc<EventLoop> {
        &self.event_loop
    }

    pub fn heap(&self) -> &Rc<Heap> {
        &self.heap
    }

    pub fn schedule<F>(&self, task: F) -> Result<(), UseError>
    where
        F: FnOnce() -> Result<(), UseError> + 'static,
    {
        debug!(
            "Scheduling task on context {} ({} pending)",
            self.id,
            self.event_loop.pending()
        );
        self.event_loop.schedule(Box::new(task))
    }

    /// A handle that does not keep the loop alive.
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            id: self.id,
            event_loop: Rc::downgrade(&self.event_loop),
            heap: Rc::downgrade(&self.heap),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        ExecutionContext::new()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecutionContext({})", self.id)
    }
}

/// Weak reference to a context, held by values that live inside scripts.
#[derive(Clone)]
pub struct LoopHandle {
    id: Uuid,
    event_loop: Weak<EventLoop>,
    heap: Weak<Heap>,
}

impl LoopHandle {
    pub fn upgrade(&self) -> Option<ExecutionContext> {
        Some(ExecutionContext {
            id: self.id,
            event_loop: self.event_loop.upgrade()?,
            heap: self.heap.upgrade()?,
        })
    }

    pub fn schedule<F>(&self, task: F) -> Result<(), UseError>
    where
        F: FnOnce() -> Result<(), UseError> + 'static,
    {
        match self.upgrade() {
            Some(context) => context.schedule(task),
            None => Err(UseError::LifecycleMisuse(format!(
                "Execution context {} is no longer active",
                self.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_run_in_fifo_order() {
        let context = ExecutionContext::new();
        let order = Rc::new(RefCell::new(vec![]));
        let outer = order.clone();
        let inner_context = context.clone();
        context
            .schedule(move || {
                outer.borrow_mut().push("first");
                let a = outer.clone();
                inner_context.schedule(move || {
                    a.borrow_mut().push("third");
                    Ok(())
                })?;
                outer.borrow_mut().push("second");
                Ok(())
            })
            .unwrap();
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
        assert_eq!(context.event_loop().pending(), 0);
        assert!(!context.event_loop().is_running());
    }

    #[test]
    fn test_failed_task_does_not_stop_siblings() {
        let context = ExecutionContext::new();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let inner_context = context.clone();
        let result = context.schedule(move || {
            inner_context.schedule(|| Err(UseError::InvalidArguments("boom".to_string())))?;
            inner_context.schedule(move || {
                flag.set(true);
                Ok(())
            })
        });
        assert!(matches!(result, Err(UseError::InvalidArguments(_))));
        assert!(ran.get());
    }

    #[test]
    fn test_handle_after_loop_dropped() {
        let handle = ExecutionContext::new().handle();
        assert!(handle.upgrade().is_none());
        assert!(matches!(
            handle.schedule(|| Ok(())),
            Err(UseError::LifecycleMisuse(_))
        ));
    }
}
