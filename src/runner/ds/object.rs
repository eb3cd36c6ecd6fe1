use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::runner::ds::value::ScriptValue;

/// Raises a shared flag when a property is written.
///
/// With a key the watcher only reacts to writes of that property, otherwise
/// to any write.
pub struct WriteWatcher {
    key: Option<String>,
    flag: Rc<Cell<bool>>,
}

impl WriteWatcher {
    pub fn any_key(flag: Rc<Cell<bool>>) -> Self {
        WriteWatcher { key: None, flag }
    }

    pub fn key(key: &str, flag: Rc<Cell<bool>>) -> Self {
        WriteWatcher {
            key: Some(key.to_string()),
            flag,
        }
    }

    fn notify(&self, key: &str) {
        if self.key.as_deref().map_or(true, |k| k == key) {
            self.flag.set(true);
        }
    }
}

/// Insertion-ordered property map backing script objects.
#[derive(Default)]
pub struct ObjectData {
    properties: IndexMap<String, ScriptValue>,
    watcher: Option<WriteWatcher>,
}

impl ObjectData {
    pub fn new() -> Self {
        ObjectData::default()
    }

    /// Attach a watcher. Properties set before this call do not trigger it.
    pub fn with_watcher(mut self, watcher: WriteWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    pub fn get(&self, key: &str) -> Option<ScriptValue> {
        self.properties.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: ScriptValue) {
        if let Some(watcher) = &self.watcher {
            watcher.notify(key);
        }
        self.properties.insert(key.to_string(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScriptValue)> {
        self.properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_for_single_key() {
        let flag = Rc::new(Cell::new(false));
        let mut data = ObjectData::new().with_watcher(WriteWatcher::key("exports", flag.clone()));
        data.set("id", ScriptValue::Null);
        assert!(!flag.get());
        data.set("exports", ScriptValue::Null);
        assert!(flag.get());
    }

    #[test]
    fn test_watcher_for_any_key() {
        let flag = Rc::new(Cell::new(false));
        let mut data = ObjectData::new();
        data.set("before", ScriptValue::Null);
        let mut data = data.with_watcher(WriteWatcher::any_key(flag.clone()));
        assert!(!flag.get());
        data.set("x", ScriptValue::Number(1.0));
        assert!(flag.get());
        assert_eq!(data.keys(), vec!["before".to_string(), "x".to_string()]);
    }
}
