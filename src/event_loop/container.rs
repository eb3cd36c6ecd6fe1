use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::UseError;
use crate::runner::ds::value::ScriptValue;

/// One-shot continuation receiving a resolved value.
pub type UnaryCallback = Box<dyn FnOnce(ScriptValue) -> Result<(), UseError>>;

#[derive(Default)]
struct ContainerState {
    result: Option<ScriptValue>,
    completed: bool,
    listeners: Vec<UnaryCallback>,
}

/// Single-assignment future bridging asynchronous script results to the host.
///
/// Listeners added while pending run in registration order on completion;
/// listeners added afterwards run immediately. The resolved value may itself
/// be a container and is passed on as-is.
#[derive(Clone, Default)]
pub struct AsyncContainer {
    state: Rc<RefCell<ContainerState>>,
}

impl AsyncContainer {
    pub fn new() -> Self {
        AsyncContainer::default()
    }

    /// Resolve the container and notify its listeners.
    pub fn complete(&self, value: ScriptValue) -> Result<(), UseError> {
        let listeners = {
            let mut state = self.state.borrow_mut();
            if state.completed {
                return Err(UseError::AlreadyCompleted);
            }
            state.completed = true;
            state.result = Some(value.clone());
            std::mem::take(&mut state.listeners)
        };
        let mut first_error = None;
        for listener in listeners {
            if let Err(e) = listener(value.clone()) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn add_listener(&self, listener: UnaryCallback) -> Result<(), UseError> {
        let resolved = {
            let mut state = self.state.borrow_mut();
            if !state.completed {
                state.listeners.push(listener);
                return Ok(());
            }
            state.result.clone().unwrap_or(ScriptValue::Undefined)
        };
        listener(resolved)
    }

    /// A callback that completes this container with its argument.
    pub fn completion_callback(&self) -> UnaryCallback {
        let container = self.clone();
        Box::new(move |value| container.complete(value))
    }

    pub fn result(&self) -> Option<ScriptValue> {
        self.state.borrow().result.clone()
    }

    pub fn is_completed(&self) -> bool {
        self.state.borrow().completed
    }

    pub fn same_as(&self, other: &AsyncContainer) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for AsyncContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        if state.completed {
            write!(f, "AsyncContainer(completed)")
        } else {
            write!(f, "AsyncContainer(pending, {} listeners)", state.listeners.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &str) -> UnaryCallback {
        let log = log.clone();
        let tag = tag.to_string();
        Box::new(move |value| {
            log.borrow_mut().push(format!("{}:{}", tag, value.to_js_string()));
            Ok(())
        })
    }

    #[test]
    fn test_pending_listeners_run_in_order_once() {
        let log = Rc::new(RefCell::new(vec![]));
        let container = AsyncContainer::new();
        container.add_listener(recorder(&log, "a")).unwrap();
        container.add_listener(recorder(&log, "b")).unwrap();
        assert!(log.borrow().is_empty());
        container.complete(ScriptValue::Number(1.0)).unwrap();
        assert_eq!(*log.borrow(), vec!["a:1", "b:1"]);
    }

    #[test]
    fn test_listener_after_completion_runs_immediately() {
        let log = Rc::new(RefCell::new(vec![]));
        let container = AsyncContainer::new();
        container.complete(ScriptValue::from("done")).unwrap();
        container.add_listener(recorder(&log, "late")).unwrap();
        assert_eq!(*log.borrow(), vec!["late:done"]);
    }

    #[test]
    fn test_second_completion_fails() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let container = AsyncContainer::new();
        container
            .add_listener(Box::new(move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            }))
            .unwrap();
        container.completion_callback()(ScriptValue::Null).unwrap();
        assert!(matches!(
            container.complete(ScriptValue::Null),
            Err(UseError::AlreadyCompleted)
        ));
        assert_eq!(calls.get(), 1);
        assert!(container.is_completed());
    }

    #[test]
    fn test_result_is_not_flattened() {
        let inner = AsyncContainer::new();
        let outer = AsyncContainer::new();
        outer.complete(ScriptValue::Async(inner.clone())).unwrap();
        match outer.result() {
            Some(ScriptValue::Async(result)) => assert!(result.same_as(&inner)),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
