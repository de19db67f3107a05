//! Resource schemas: the identifier-extraction seam.
//!
//! The cache never inspects record shapes itself; a [`ResourceSchema`]
//! names the resource type and pulls the identifier out of a raw record.
//! Extraction failure is returned to the caller, never swallowed.

use crate::error::{Result, StoreError};
use crate::types::ModelId;
use serde_json::Value;

/// Supplies the resource type name and identifier extraction for one
/// resource.
pub trait ResourceSchema: Send + Sync {
    /// The resource type name, used as the last segment of the store's
    /// root path (e.g. `"users"`).
    fn resource_type(&self) -> &str;

    /// Extract the unique identifier from a raw record.
    ///
    /// Identifiers may be JSON strings or integers; either is kept
    /// verbatim in its string form.
    fn extract_id(&self, record: &Value) -> Result<ModelId>;
}

/// Schema that reads the identifier from a fixed key, `"id"` by default.
#[derive(Clone, Debug)]
pub struct KeySchema {
    title: String,
    id_key: String,
}

impl KeySchema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            id_key: "id".to_string(),
        }
    }

    /// Use a different identifier key (e.g. `"uuid"`).
    pub fn with_id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }
}

impl ResourceSchema for KeySchema {
    fn resource_type(&self) -> &str {
        &self.title
    }

    fn extract_id(&self, record: &Value) -> Result<ModelId> {
        let obj = record.as_object().ok_or(StoreError::NotAnObject)?;
        let raw = obj
            .get(&self.id_key)
            .ok_or_else(|| StoreError::IdMissing(self.id_key.clone()))?;

        match raw {
            Value::String(s) => Ok(ModelId::from(s.as_str())),
            Value::Number(n) if n.is_i64() || n.is_u64() => {
                Ok(ModelId::from(n.to_string()))
            }
            other => Err(StoreError::IdInvalid(other.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_string_id() {
        let schema = KeySchema::new("users");
        let id = schema.extract_id(&json!({"id": "abc", "name": "a"})).unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn test_extract_integer_id_stringifies() {
        let schema = KeySchema::new("users");
        let id = schema.extract_id(&json!({"id": 42})).unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn test_custom_id_key() {
        let schema = KeySchema::new("users").with_id_key("uuid");
        let id = schema.extract_id(&json!({"uuid": "u-1", "id": 9})).unwrap();
        assert_eq!(id.as_str(), "u-1");
    }

    #[test]
    fn test_missing_id_errors() {
        let schema = KeySchema::new("users");
        let err = schema.extract_id(&json!({"name": "a"})).unwrap_err();
        assert!(matches!(err, StoreError::IdMissing(_)));
    }

    #[test]
    fn test_float_id_rejected() {
        let schema = KeySchema::new("users");
        let err = schema.extract_id(&json!({"id": 1.5})).unwrap_err();
        assert!(matches!(err, StoreError::IdInvalid(_)));
    }

    #[test]
    fn test_non_object_rejected() {
        let schema = KeySchema::new("users");
        let err = schema.extract_id(&json!("scalar")).unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject));
    }
}
