//! Free-form event metadata.
//!
//! [`Context`] is a small insertion-ordered map of string keys to scalar
//! values. Keys that would shadow a record field are refused, so a record
//! can always flatten its context next to `timestamp`, `level`, `source`
//! and `message` without ambiguity.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Keys owned by the record itself, in either output format.
pub const RESERVED_KEYS: &[&str] = &["timestamp", "level", "source", "message", "ts", "msg"];

/// A scalar context value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl std::fmt::Display for ContextValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextValue::Bool(b) => write!(f, "{}", b),
            ContextValue::Int(i) => write!(f, "{}", i),
            ContextValue::Float(v) => write!(f, "{}", v),
            ContextValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Int(value)
    }
}

impl From<i32> for ContextValue {
    fn from(value: i32) -> Self {
        ContextValue::Int(value.into())
    }
}

impl From<u32> for ContextValue {
    fn from(value: u32) -> Self {
        ContextValue::Int(value.into())
    }
}

impl From<u64> for ContextValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(ContextValue::Int)
            .unwrap_or_else(|_| ContextValue::Str(value.to_string()))
    }
}

impl From<f64> for ContextValue {
    // NaN and infinities have no JSON representation.
    fn from(value: f64) -> Self {
        if value.is_finite() {
            ContextValue::Float(value)
        } else {
            ContextValue::Str(value.to_string())
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Str(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Str(value)
    }
}

/// Insertion-ordered context map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: Vec<(String, ContextValue)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reserved(key: &str) -> bool {
        RESERVED_KEYS.contains(&key)
    }

    /// Insert or replace a value, keeping the original position on replace.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Result<(), DomainError> {
        let key = key.into();
        if Self::is_reserved(&key) {
            return Err(DomainError::ReservedContextKey(key));
        }

        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
        Ok(())
    }

    /// Builder-style insert; reserved keys are skipped.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        let _ = self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_reserved_keys() {
        let mut context = Context::new();
        for key in RESERVED_KEYS {
            assert_eq!(
                context.insert(*key, "x"),
                Err(DomainError::ReservedContextKey(key.to_string()))
            );
        }
        assert!(context.is_empty());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut context = Context::new();
        context.insert("a", 1).unwrap();
        context.insert("b", 2).unwrap();
        context.insert("a", 3).unwrap();

        let keys: Vec<_> = context.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(context.get("a"), Some(&ContextValue::Int(3)));
    }

    #[test]
    fn test_non_finite_float_becomes_string() {
        assert_eq!(
            ContextValue::from(f64::NAN),
            ContextValue::Str("NaN".to_string())
        );
        assert_eq!(ContextValue::from(1.5), ContextValue::Float(1.5));
    }

    #[test]
    fn test_untagged_deserialize() {
        let v: ContextValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, ContextValue::Int(42));
        let v: ContextValue = serde_json::from_str("0.25").unwrap();
        assert_eq!(v, ContextValue::Float(0.25));
        let v: ContextValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, ContextValue::Bool(true));
        let v: ContextValue = serde_json::from_str("\"hi\"").unwrap();
        assert_eq!(v, ContextValue::Str("hi".to_string()));
    }
}
