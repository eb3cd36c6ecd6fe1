//! Name to value mappings handed to the engine for one evaluation.
//!
//! A binding is either a plain value or a lazy supplier. Lazy bindings are
//! realized the first time a script reads them and the result is cached, so
//! a supplier runs at most once no matter how many copies of the `Bindings`
//! exist.
//!
//! Bindings may also name the [`Heap`] the evaluation allocates its scopes
//! on. Without one the engine uses a heap of its own for that evaluation.

use std::cell::OnceCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::event_loop::ExecutionContext;
use crate::runner::ds::heap::Heap;
use crate::runner::ds::value::ScriptValue;

#[derive(Clone)]
pub enum Binding {
    Value(ScriptValue),
    Lazy {
        supplier: Rc<dyn Fn() -> ScriptValue>,
        cache: Rc<OnceCell<ScriptValue>>,
    },
}

impl Binding {
    pub fn value(&self) -> ScriptValue {
        match self {
            Binding::Value(value) => value.clone(),
            Binding::Lazy { supplier, cache } => cache.get_or_init(|| supplier()).clone(),
        }
    }

    pub fn is_realized(&self) -> bool {
        match self {
            Binding::Value(_) => true,
            Binding::Lazy { cache, .. } => cache.get().is_some(),
        }
    }
}

#[derive(Clone, Default)]
pub struct Bindings {
    entries: IndexMap<String, Binding>,
    heap: Option<Rc<Heap>>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn put(&mut self, name: &str, value: impl Into<ScriptValue>) {
        self.entries
            .insert(name.to_string(), Binding::Value(value.into()));
    }

    pub fn put_lazy<F>(&mut self, name: &str, supplier: F)
    where
        F: Fn() -> ScriptValue + 'static,
    {
        self.entries.insert(
            name.to_string(),
            Binding::Lazy {
                supplier: Rc::new(supplier),
                cache: Rc::new(OnceCell::new()),
            },
        );
    }

    pub fn set_heap(&mut self, heap: &Rc<Heap>) {
        self.heap = Some(heap.clone());
    }

    pub fn heap(&self) -> Option<&Rc<Heap>> {
        self.heap.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<ScriptValue> {
        self.entries.get(name).map(Binding::value)
    }

    /// String value of a binding, if it holds one.
    pub fn get_str(&self, name: &str) -> Option<String> {
        match self.get(name) {
            Some(ScriptValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Binding> {
        self.entries.shift_remove(name)
    }

    /// Copy every entry of `other` into `self`; entries of `other` win.
    pub fn extend(&mut self, other: &Bindings) {
        for (name, binding) in &other.entries {
            self.entries.insert(name.clone(), binding.clone());
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Realize every entry into an object value.
    pub fn to_object(&self) -> ScriptValue {
        let object = ScriptValue::new_object();
        if let ScriptValue::Object(data) = &object {
            let mut data = data.borrow_mut();
            for (name, binding) in &self.entries {
                data.set(name, binding.value());
            }
        }
        object
    }
}

/// Source of bindings installed into every script an environment runs.
pub trait BindingsProvider {
    fn name(&self) -> &str;

    fn provide(&self, context: &ExecutionContext) -> Bindings;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_lazy_binding_realized_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut bindings = Bindings::new();
        bindings.put_lazy("answer", move || {
            counter.set(counter.get() + 1);
            ScriptValue::Number(42.0)
        });
        let copy = bindings.clone();
        assert!(!bindings.binding("answer").unwrap().is_realized());
        assert_eq!(bindings.get("answer").unwrap().to_number(), 42.0);
        assert_eq!(copy.get("answer").unwrap().to_number(), 42.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_later_writer_overrides() {
        let mut base = Bindings::new();
        base.put("a", "base");
        base.put("b", "base");
        let mut top = Bindings::new();
        top.put("b", "top");
        base.extend(&top);
        assert_eq!(base.get_str("a").unwrap(), "base");
        assert_eq!(base.get_str("b").unwrap(), "top");
        assert_eq!(base.len(), 2);
    }
}
