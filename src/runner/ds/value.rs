use std::cell::RefCell;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use serde_json::{Map, Number, Value as JsonValue};

use crate::event_loop::AsyncContainer;
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::function::{FunctionKind, FunctionObject};
use crate::runner::ds::object::ObjectData;

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";

pub type ListRef = Rc<RefCell<Vec<ScriptValue>>>;
pub type ObjectRef = Rc<RefCell<ObjectData>>;

/// A value crossing the boundary between scripts and the host.
///
/// Lists and objects are shared and mutable: cloning a `ScriptValue` clones
/// the handle, not the contents.
#[derive(Clone)]
pub enum ScriptValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    List(ListRef),
    Object(ObjectRef),
    Function(Rc<FunctionObject>),
    Async(AsyncContainer),
}

impl ScriptValue {
    pub fn new_object() -> Self {
        ScriptValue::Object(Rc::new(RefCell::new(ObjectData::new())))
    }

    pub fn from_object(data: ObjectData) -> Self {
        ScriptValue::Object(Rc::new(RefCell::new(data)))
    }

    pub fn new_list(items: Vec<ScriptValue>) -> Self {
        ScriptValue::List(Rc::new(RefCell::new(items)))
    }

    /// Wrap a host closure as a callable script function.
    pub fn native_function<F>(name: &str, function: F) -> Self
    where
        F: Fn(ScriptValue, Vec<ScriptValue>) -> Result<ScriptValue, ScriptError> + 'static,
    {
        ScriptValue::Function(Rc::new(FunctionObject {
            name: name.to_string(),
            kind: FunctionKind::Native(Rc::new(function)),
        }))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, ScriptValue::Undefined | ScriptValue::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            ScriptValue::Undefined | ScriptValue::Null => false,
            ScriptValue::Boolean(b) => *b,
            ScriptValue::Number(n) => !(*n == 0.0 || n.is_nan()),
            ScriptValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            ScriptValue::Undefined => TYPE_STR_UNDEFINED,
            ScriptValue::Null => "object",
            ScriptValue::Boolean(_) => "boolean",
            ScriptValue::Number(_) => "number",
            ScriptValue::String(_) => "string",
            ScriptValue::Function(_) => "function",
            ScriptValue::List(_) | ScriptValue::Object(_) | ScriptValue::Async(_) => "object",
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            ScriptValue::Undefined => f64::NAN,
            ScriptValue::Null => 0.0,
            ScriptValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            ScriptValue::Number(n) => *n,
            ScriptValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            ScriptValue::List(list) => {
                let list = list.borrow();
                match list.len() {
                    0 => 0.0,
                    1 => list[0].to_number(),
                    _ => f64::NAN,
                }
            }
            _ => f64::NAN,
        }
    }

    pub fn to_js_string(&self) -> String {
        match self {
            ScriptValue::Undefined => TYPE_STR_UNDEFINED.to_string(),
            ScriptValue::Null => TYPE_STR_NULL.to_string(),
            ScriptValue::Boolean(b) => b.to_string(),
            ScriptValue::Number(n) => format_number(*n),
            ScriptValue::String(s) => s.clone(),
            ScriptValue::List(list) => list
                .borrow()
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_js_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            ScriptValue::Object(_) => "[object Object]".to_string(),
            ScriptValue::Function(f) => format!("function {}() {{ [code] }}", f.name),
            ScriptValue::Async(_) => "[object AsyncContainer]".to_string(),
        }
    }

    /// Property key form of a computed member expression.
    pub fn to_property_key(&self) -> String {
        self.to_js_string()
    }

    /// Host view of the value. Functions become `null`; a resolved container
    /// is replaced by its result.
    pub fn to_json(&self) -> JsonValue {
        match self {
            ScriptValue::Undefined | ScriptValue::Null | ScriptValue::Function(_) => JsonValue::Null,
            ScriptValue::Boolean(b) => JsonValue::Bool(*b),
            ScriptValue::Number(n) => number_to_json(*n),
            ScriptValue::String(s) => JsonValue::String(s.clone()),
            ScriptValue::List(list) => {
                JsonValue::Array(list.borrow().iter().map(|v| v.to_json()).collect())
            }
            ScriptValue::Object(object) => {
                let mut map = Map::new();
                for (key, value) in object.borrow().iter() {
                    map.insert(key.clone(), value.to_json());
                }
                JsonValue::Object(map)
            }
            ScriptValue::Async(container) => match container.result() {
                Some(result) => result.to_json(),
                None => JsonValue::Null,
            },
        }
    }

    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => ScriptValue::Null,
            JsonValue::Bool(b) => ScriptValue::Boolean(*b),
            JsonValue::Number(n) => ScriptValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => ScriptValue::String(s.clone()),
            JsonValue::Array(items) => {
                ScriptValue::new_list(items.iter().map(ScriptValue::from_json).collect())
            }
            JsonValue::Object(map) => {
                let mut data = ObjectData::new();
                for (key, value) in map {
                    data.set(key, ScriptValue::from_json(value));
                }
                ScriptValue::from_object(data)
            }
        }
    }

    pub fn strict_equals(&self, other: &ScriptValue) -> bool {
        match (self, other) {
            (ScriptValue::Undefined, ScriptValue::Undefined) => true,
            (ScriptValue::Null, ScriptValue::Null) => true,
            (ScriptValue::Boolean(a), ScriptValue::Boolean(b)) => a == b,
            (ScriptValue::Number(a), ScriptValue::Number(b)) => a == b,
            (ScriptValue::String(a), ScriptValue::String(b)) => a == b,
            (ScriptValue::List(a), ScriptValue::List(b)) => Rc::ptr_eq(a, b),
            (ScriptValue::Object(a), ScriptValue::Object(b)) => Rc::ptr_eq(a, b),
            (ScriptValue::Function(a), ScriptValue::Function(b)) => Rc::ptr_eq(a, b),
            (ScriptValue::Async(a), ScriptValue::Async(b)) => a.same_as(b),
            _ => false,
        }
    }

    pub fn loose_equals(&self, other: &ScriptValue) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (ScriptValue::Number(_), ScriptValue::String(_))
            | (ScriptValue::String(_), ScriptValue::Number(_))
            | (ScriptValue::Boolean(_), _)
            | (_, ScriptValue::Boolean(_)) => self.to_number() == other.to_number(),
            _ => self.strict_equals(other),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            ScriptValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionObject>> {
        match self {
            ScriptValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&AsyncContainer> {
        match self {
            ScriptValue::Async(c) => Some(c),
            _ => None,
        }
    }

    /// Read a property of an object value; anything else yields `None`.
    pub fn get_property(&self, key: &str) -> Option<ScriptValue> {
        match self {
            ScriptValue::Object(o) => o.borrow().get(key),
            _ => None,
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        JsonValue::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
    }
}

impl Debug for ScriptValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Undefined => write!(f, "ScriptValue::Undefined"),
            ScriptValue::Null => write!(f, "ScriptValue::Null"),
            ScriptValue::Boolean(b) => write!(f, "ScriptValue::Boolean({})", b),
            ScriptValue::Number(n) => write!(f, "ScriptValue::Number({})", n),
            ScriptValue::String(s) => write!(f, "ScriptValue::String({:?})", s),
            ScriptValue::List(l) => write!(f, "ScriptValue::List(len={})", l.borrow().len()),
            ScriptValue::Object(o) => write!(f, "ScriptValue::Object({:?})", o.borrow().keys()),
            ScriptValue::Function(func) => write!(f, "ScriptValue::Function({})", func.name),
            ScriptValue::Async(c) => write!(f, "ScriptValue::Async({:?})", c),
        }
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::String(s.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        ScriptValue::String(s)
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        ScriptValue::Number(n)
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        ScriptValue::Boolean(b)
    }
}

impl From<AsyncContainer> for ScriptValue {
    fn from(c: AsyncContainer) -> Self {
        ScriptValue::Async(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_loose_equality() {
        assert!(ScriptValue::Null.loose_equals(&ScriptValue::Undefined));
        assert!(ScriptValue::from("1").loose_equals(&ScriptValue::Number(1.0)));
        assert!(!ScriptValue::from("1").strict_equals(&ScriptValue::Number(1.0)));
        assert!(!ScriptValue::Null.loose_equals(&ScriptValue::Number(0.0)));
    }

    #[test]
    fn test_json_conversion() {
        let value = ScriptValue::from_json(&serde_json::json!({"a": [1, "x"], "b": null}));
        assert_eq!(value.to_json(), serde_json::json!({"a": [1, "x"], "b": null}));
    }
}
