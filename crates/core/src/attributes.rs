use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Bool,
    Float,
    Int,
    String,
    BoolArray,
    FloatArray,
    IntArray,
    StringArray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Bool(bool),
    Float(f64),
    Int(i32),
    String(String),
    BoolArray(Vec<bool>),
    FloatArray(Vec<f64>),
    IntArray(Vec<i32>),
    StringArray(Vec<String>),
}

impl AttributeValue {
    pub fn value_type(&self) -> AttributeType {
        match self {
            AttributeValue::Bool(_) => AttributeType::Bool,
            AttributeValue::Float(_) => AttributeType::Float,
            AttributeValue::Int(_) => AttributeType::Int,
            AttributeValue::String(_) => AttributeType::String,
            AttributeValue::BoolArray(_) => AttributeType::BoolArray,
            AttributeValue::FloatArray(_) => AttributeType::FloatArray,
            AttributeValue::IntArray(_) => AttributeType::IntArray,
            AttributeValue::StringArray(_) => AttributeType::StringArray,
        }
    }
}

/// Typed key/value map. Keys keep the order they were first set in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn value_type(&self, key: &str) -> Option<AttributeType> {
        self.get(key).map(AttributeValue::value_type)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            AttributeValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            AttributeValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            AttributeValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            AttributeValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_bool_array(&self, key: &str) -> Option<&[bool]> {
        match self.get(key)? {
            AttributeValue::BoolArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn get_float_array(&self, key: &str) -> Option<&[f64]> {
        match self.get(key)? {
            AttributeValue::FloatArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn get_int_array(&self, key: &str) -> Option<&[i32]> {
        match self.get(key)? {
            AttributeValue::IntArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn get_string_array(&self, key: &str) -> Option<&[String]> {
        match self.get(key)? {
            AttributeValue::StringArray(values) => Some(values),
            _ => None,
        }
    }
}

impl FromIterator<(String, AttributeValue)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Accumulates rule-invocation attributes pushed by the generation engine.
#[derive(Debug, Clone, Default)]
pub struct AttributeMapBuilder {
    map: AttributeMap,
}

impl AttributeMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.map.insert(key, AttributeValue::Bool(value));
    }

    pub fn set_float(&mut self, key: &str, value: f64) {
        self.map.insert(key, AttributeValue::Float(value));
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.map.insert(key, AttributeValue::Int(value));
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.map
            .insert(key, AttributeValue::String(value.to_string()));
    }

    pub fn set_bool_array(&mut self, key: &str, values: &[bool]) {
        self.map
            .insert(key, AttributeValue::BoolArray(values.to_vec()));
    }

    pub fn set_float_array(&mut self, key: &str, values: &[f64]) {
        self.map
            .insert(key, AttributeValue::FloatArray(values.to_vec()));
    }

    pub fn set_int_array(&mut self, key: &str, values: &[i32]) {
        self.map
            .insert(key, AttributeValue::IntArray(values.to_vec()));
    }

    pub fn set_string_array(&mut self, key: &str, values: &[String]) {
        self.map
            .insert(key, AttributeValue::StringArray(values.to_vec()));
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn create_attribute_map(&self) -> AttributeMap {
        self.map.clone()
    }

    pub fn take(&mut self) -> AttributeMap {
        std::mem::take(&mut self.map)
    }

    pub fn clear(&mut self) {
        self.map = AttributeMap::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position() {
        let mut map = AttributeMap::new();
        map.insert("b", AttributeValue::Int(1));
        map.insert("a", AttributeValue::Bool(true));
        map.insert("b", AttributeValue::Float(2.0));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get_float("b"), Some(2.0));
        assert_eq!(map.get_int("b"), None);
        assert_eq!(map.value_type("a"), Some(AttributeType::Bool));
    }

    #[test]
    fn builder_snapshot_and_take() {
        let mut builder = AttributeMapBuilder::new();
        builder.set_string("name", "roof");
        builder.set_float_array("color", &[1.0, 0.5, 0.0]);
        let snapshot = builder.create_attribute_map();
        assert_eq!(snapshot.get_string("name"), Some("roof"));
        assert!(!builder.is_empty());

        let taken = builder.take();
        assert_eq!(taken, snapshot);
        assert!(builder.is_empty());
    }

    #[test]
    fn map_json_uses_tagged_values() {
        let json = r#"[["opacity", {"type": "float", "value": 0.5}],
                       ["maps", {"type": "string_array", "value": ["a.png"]}]]"#;
        let map: AttributeMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.get_float("opacity"), Some(0.5));
        assert_eq!(map.get_string_array("maps"), Some(&["a.png".to_string()][..]));
    }
}
