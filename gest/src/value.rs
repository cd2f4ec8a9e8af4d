use std::collections::HashMap;

/// A loosely typed parameter, as carried between screens.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Number(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        self.as_f64().map(|f| f as i32)
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Text(ref s) => Some(s),
            _ => None,
        }
    }
}

/// Named parameters passed into and out of a benchmark screen.
pub type ValueMap = HashMap<String, Value>;

/// Builds a [ValueMap] from a JSON object, skipping nulls, arrays and nested objects.
pub fn value_map_from_json(json: &serde_json::Value) -> ValueMap {
    let mut map = ValueMap::new();
    if let Some(object) = json.as_object() {
        for (key, value) in object.iter() {
            match value {
                serde_json::Value::Bool(b) => {
                    map.insert(key.to_string(), Value::Bool(*b));
                }
                serde_json::Value::Number(n) => {
                    if let Some(f) = n.as_f64() {
                        map.insert(key.to_string(), Value::Number(f));
                    }
                }
                serde_json::Value::String(s) => {
                    map.insert(key.to_string(), Value::Text(s.to_string()));
                }
                _ => {}
            }
        }
    }
    map
}
