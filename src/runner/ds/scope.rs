use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::bindings::Bindings;
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::heap::Heap;
use crate::runner::ds::value::ScriptValue;

struct Variable {
    value: ScriptValue,
    constant: bool,
}

/// A lexical scope. The root scope of an evaluation sits on top of the
/// bindings the engine was handed; names missing from every scope are
/// looked up there.
///
/// Every scope belongs to a [`Heap`], which empties it on release.
pub struct Scope {
    vars: RefCell<HashMap<String, Variable>>,
    parent: Option<Rc<Scope>>,
    this: RefCell<Option<ScriptValue>>,
    globals: RefCell<Option<Bindings>>,
    heap: Rc<Heap>,
}

impl Scope {
    pub fn root(globals: Bindings, heap: &Rc<Heap>) -> Rc<Scope> {
        Scope::tracked(Scope {
            vars: RefCell::new(HashMap::new()),
            parent: None,
            this: RefCell::new(Some(ScriptValue::Undefined)),
            globals: RefCell::new(Some(globals)),
            heap: heap.clone(),
        })
    }

    /// Scope of a function call. Arrow functions pass `None` and see the
    /// `this` of their defining scope.
    pub fn function(parent: &Rc<Scope>, this: Option<ScriptValue>) -> Rc<Scope> {
        Scope::tracked(Scope {
            vars: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
            this: RefCell::new(this),
            globals: RefCell::new(None),
            heap: parent.heap.clone(),
        })
    }

    pub fn block(parent: &Rc<Scope>) -> Rc<Scope> {
        Scope::function(parent, None)
    }

    fn tracked(scope: Scope) -> Rc<Scope> {
        let scope = Rc::new(scope);
        scope.heap.track(&scope);
        scope
    }

    pub fn heap(&self) -> &Rc<Heap> {
        &self.heap
    }

    /// Drop every variable, the root bindings and `this`.
    pub(crate) fn release(&self) {
        let vars = std::mem::take(&mut *self.vars.borrow_mut());
        let globals = self.globals.borrow_mut().take();
        let this = self.this.borrow_mut().take();
        drop((vars, globals, this));
    }

    pub fn declare(&self, name: &str, value: ScriptValue, constant: bool) {
        self.vars
            .borrow_mut()
            .insert(name.to_string(), Variable { value, constant });
    }

    pub fn try_lookup(&self, name: &str) -> Option<ScriptValue> {
        if let Some(variable) = self.vars.borrow().get(name) {
            return Some(variable.value.clone());
        }
        match &self.parent {
            Some(parent) => parent.try_lookup(name),
            None => self.globals.borrow().as_ref().and_then(|g| g.get(name)),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<ScriptValue, ScriptError> {
        self.try_lookup(name)
            .ok_or_else(|| ScriptError::Reference(format!("{} is not defined", name)))
    }

    /// Assign to the nearest declaration of `name`. Undeclared names are
    /// created on the root scope.
    pub fn assign(&self, name: &str, value: ScriptValue) -> Result<(), ScriptError> {
        {
            let mut vars = self.vars.borrow_mut();
            if let Some(variable) = vars.get_mut(name) {
                if variable.constant {
                    return Err(ScriptError::Type(
                        "Assignment to constant variable".to_string(),
                    ));
                }
                variable.value = value;
                return Ok(());
            }
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => {
                self.declare(name, value, false);
                Ok(())
            }
        }
    }

    pub fn this_value(&self) -> ScriptValue {
        match (&*self.this.borrow(), &self.parent) {
            (Some(this), _) => this.clone(),
            (None, Some(parent)) => parent.this_value(),
            (None, None) => ScriptValue::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_through_to_globals() {
        let mut globals = Bindings::new();
        globals.put("host", "value");
        let root = Scope::root(globals, &Heap::new());
        let inner = Scope::block(&root);
        assert_eq!(inner.lookup("host").unwrap().to_js_string(), "value");
        assert!(matches!(inner.lookup("missing"), Err(ScriptError::Reference(_))));
    }

    #[test]
    fn test_assign_undeclared_defines_on_root() {
        let root = Scope::root(Bindings::new(), &Heap::new());
        let inner = Scope::block(&root);
        inner.assign("x", ScriptValue::Number(1.0)).unwrap();
        assert_eq!(root.lookup("x").unwrap().to_number(), 1.0);
    }

    #[test]
    fn test_constant_cannot_be_reassigned() {
        let root = Scope::root(Bindings::new(), &Heap::new());
        root.declare("c", ScriptValue::Number(1.0), true);
        assert!(matches!(root.assign("c", ScriptValue::Null), Err(ScriptError::Type(_))));
    }
}
