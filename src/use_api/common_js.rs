use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::runner::ds::object::{ObjectData, WriteWatcher};
use crate::runner::ds::value::{ObjectRef, ScriptValue};

/// The `module` and `exports` objects of one evaluation.
///
/// The module counts as modified once `module.exports` is reassigned or a
/// property is written to the original `exports` object.
pub struct CommonJsModule {
    module: ObjectRef,
    exports: ObjectRef,
    modified: Rc<Cell<bool>>,
}

impl CommonJsModule {
    pub fn new() -> Self {
        let modified = Rc::new(Cell::new(false));
        let exports = Rc::new(RefCell::new(
            ObjectData::new().with_watcher(WriteWatcher::any_key(modified.clone())),
        ));
        let mut module = ObjectData::new();
        module.set("exports", ScriptValue::Object(exports.clone()));
        let module = module.with_watcher(WriteWatcher::key("exports", modified.clone()));
        CommonJsModule {
            module: Rc::new(RefCell::new(module)),
            exports,
            modified,
        }
    }

    pub fn module_value(&self) -> ScriptValue {
        ScriptValue::Object(self.module.clone())
    }

    /// The original `exports` object.
    pub fn exports_value(&self) -> ScriptValue {
        ScriptValue::Object(self.exports.clone())
    }

    /// The current value of `module.exports`.
    pub fn exports(&self) -> ScriptValue {
        self.module
            .borrow()
            .get("exports")
            .unwrap_or(ScriptValue::Undefined)
    }

    pub fn is_modified(&self) -> bool {
        self.modified.get()
    }
}

impl Default for CommonJsModule {
    fn default() -> Self {
        CommonJsModule::new()
    }
}
