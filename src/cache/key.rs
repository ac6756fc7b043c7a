use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Semantic request fields that identify a cached answer.
///
/// Values are string-coerced on insert and field names are kept sorted, so
/// the serialized form does not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFields {
    fields: BTreeMap<String, String>,
}

impl KeyFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn optional_field(self, name: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self.field(name, ""),
        }
    }

    // sorted JSON object, e.g. {"dob":"1990-06-15","name":"ada"}
    fn canonical(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_default()
    }

    /// `<namespace>:<sha256 hex>`
    pub fn derive_key(&self, namespace: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical().as_bytes());
        format!("{}:{:x}", namespace, hasher.finalize())
    }
}

/// Trim and lower-case an identity field before it goes into a key.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
