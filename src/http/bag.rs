use crate::di::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Named request attributes.
///
/// Values are stored erased; route placeholders arrive as `String`, the
/// controller reference as a [`ControllerRef`](crate::controller::ControllerRef).
#[derive(Clone, Default)]
pub struct ParameterBag {
    parameters: HashMap<String, Value>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: 'static + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.parameters.insert(key.into(), Arc::new(value));
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        self.parameters.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// Like [`get`](Self::get), falling back to `default` when the key is absent
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.parameters.get(key).cloned().unwrap_or(default)
    }

    /// Typed access; `None` when absent or stored as another type
    pub fn get_as<T: 'static + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.parameters
            .get(key)
            .and_then(|value| value.clone().downcast::<T>().ok())
    }

    /// String access for attributes stored as `String` or `&'static str`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        let value = self.parameters.get(key)?;
        if let Some(s) = value.downcast_ref::<String>() {
            return Some(s.as_str());
        }
        value.downcast_ref::<&'static str>().copied()
    }

    pub fn has(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn all(&self) -> &HashMap<String, Value> {
        &self.parameters
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl std::fmt::Debug for ParameterBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("ParameterBag").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_and_string_access() {
        let mut bag = ParameterBag::new();
        bag.insert("name", String::from("john"));
        bag.insert("page", 3u32);
        bag.insert("static", "value");

        assert_eq!(bag.get_str("name"), Some("john"));
        assert_eq!(bag.get_str("static"), Some("value"));
        assert_eq!(bag.get_str("page"), None);
        assert_eq!(*bag.get_as::<u32>("page").unwrap(), 3);
        assert!(bag.get_as::<String>("page").is_none());
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn get_or_falls_back() {
        let bag = ParameterBag::new();
        let fallback: Value = Arc::new(10i64);
        let value = bag.get_or("missing", fallback.clone());
        assert!(Arc::ptr_eq(&value, &fallback));
    }
}
