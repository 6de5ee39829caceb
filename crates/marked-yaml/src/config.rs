//! Constructor configuration.

use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// What to do when a mapping or set repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateKeys {
    /// Later entries overwrite earlier ones
    #[default]
    LastWins,
    /// A repeated key is a structure error
    Reject,
}

/// Options for a [`crate::Constructor`].
///
/// Every field has a default, so a partial configuration deserializes:
///
/// ```rust
/// use marked_yaml::{ConstructorConfig, DuplicateKeys, Schema};
///
/// let config: ConstructorConfig =
///     serde_json::from_str(r#"{"duplicate-keys": "reject"}"#).unwrap();
/// assert_eq!(config.duplicate_keys, DuplicateKeys::Reject);
/// assert_eq!(config.schema, Schema::Yaml11);
/// assert!(config.merge_keys);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConstructorConfig {
    pub schema: Schema,
    pub duplicate_keys: DuplicateKeys,
    /// Keep cached wrapping strategies between documents
    pub reuse_registry: bool,
    /// Honour `<<` merge keys
    pub merge_keys: bool,
}

impl Default for ConstructorConfig {
    fn default() -> Self {
        ConstructorConfig {
            schema: Schema::default(),
            duplicate_keys: DuplicateKeys::default(),
            reuse_registry: false,
            merge_keys: true,
        }
    }
}

impl ConstructorConfig {
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_duplicate_keys(mut self, duplicate_keys: DuplicateKeys) -> Self {
        self.duplicate_keys = duplicate_keys;
        self
    }

    pub fn with_reuse_registry(mut self, reuse_registry: bool) -> Self {
        self.reuse_registry = reuse_registry;
        self
    }

    pub fn with_merge_keys(mut self, merge_keys: bool) -> Self {
        self.merge_keys = merge_keys;
        self
    }
}
