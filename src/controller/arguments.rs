use crate::controller::Parameter;
use crate::di::Value;
use crate::error::{BridgeError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Arguments resolved so far, keyed by positional index.
///
/// The first strategy to claim an index wins; later inserts for the same
/// index are ignored.
#[derive(Clone, Default)]
pub struct ResolvedArguments {
    values: BTreeMap<usize, Value>,
}

impl ResolvedArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self, index: usize) -> bool {
        self.values.contains_key(&index)
    }

    /// Claim `index`. Returns `false` if it was already taken.
    pub fn insert(&mut self, index: usize, value: Value) -> bool {
        if self.values.contains_key(&index) {
            return false;
        }
        self.values.insert(index, value);
        true
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Densify into a positional list, rejecting any gap.
    pub fn into_arguments(mut self, parameters: &[Parameter]) -> Result<Arguments> {
        let mut values = Vec::with_capacity(parameters.len());
        for (index, parameter) in parameters.iter().enumerate() {
            match self.values.remove(&index) {
                Some(value) => values.push(value),
                None => {
                    return Err(BridgeError::UnresolvableArgument {
                        index,
                        name: parameter.name().to_string(),
                        type_name: parameter.type_hint().map(|hint| hint.name()),
                    });
                }
            }
        }
        Ok(Arguments { values })
    }
}

/// Positional arguments handed to a controller.
///
/// Equality is identity of the underlying values: two lists are equal when
/// every position holds the same shared instance.
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or(BridgeError::ArgumentOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    /// The argument at `index` as a `T`
    pub fn get<T: 'static + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        self.value(index)?
            .clone()
            .downcast::<T>()
            .map_err(|_| BridgeError::downcast_failed::<T>())
    }

    /// The argument at `index` as a trait object (`Arc<dyn Trait>`)
    pub fn get_dyn<T: ?Sized + 'static + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        self.value(index)?
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(BridgeError::downcast_failed::<T>)
    }

    /// The argument at `index` as text, for `String` and `&'static str` values
    pub fn get_str(&self, index: usize) -> Result<&str> {
        let value = self.value(index)?;
        if let Some(s) = value.downcast_ref::<String>() {
            return Ok(s.as_str());
        }
        value
            .downcast_ref::<&'static str>()
            .copied()
            .ok_or_else(BridgeError::downcast_failed::<String>)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl PartialEq for Arguments {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arguments")
            .field("len", &self.values.len())
            .finish()
    }
}
