use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One base or resolved property value.
///
/// Colors and gradient descriptors are carried as [`PropValue::Text`] and interpreted at draw
/// time. Anything that is neither a number nor a string is kept verbatim and ignored by renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// Numeric value (coordinates, sizes, opacity).
    Number(f64),
    /// String value (colors, gradient descriptors, text, font, alignment).
    Text(String),
    /// Any other JSON value.
    Other(serde_json::Value),
}

/// Mapping of property name to value, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(BTreeMap<String, PropValue>);

impl Props {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value lookup.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    /// Numeric lookup; non-numeric and non-finite values read as absent.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.0.get(name) {
            Some(PropValue::Number(v)) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Numeric lookup with a default for absent values.
    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    /// String lookup; empty strings read as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(PropValue::Text(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Set (or override) a numeric property.
    pub fn set_number(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), PropValue::Number(value));
    }

    /// Set (or override) any property.
    pub fn insert(&mut self, name: impl Into<String>, value: PropValue) {
        self.0.insert(name.into(), value);
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when no properties are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, PropValue)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, PropValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
