//! Extraction settings.
//!
//! Defaults match what current and legacy compiler dumps emit; a YAML file
//! can override any subset of them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::ErrorContext;
use crate::JsonGenError;

/// An `attribute=value` pair that marks a `var_decl` as a stored property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredKind {
    pub attribute: String,
    pub value: String,
}

impl StoredKind {
    pub fn new(attribute: &str, value: &str) -> Self {
        StoredKind {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Method names that mean a type already decodes itself.
    pub decoder_names: Vec<String>,
    /// Method names that mean a type already encodes itself.
    pub encoder_names: Vec<String>,
    pub stored_kinds: Vec<StoredKind>,
    /// Access levels that hide a constructor from the summary.
    pub private_access: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            decoder_names: vec!["decodeJson".into(), "decode".into()],
            encoder_names: vec!["encodeJson".into(), "encode".into()],
            stored_kinds: vec![
                // Swift <= 2.1
                StoredKind::new("storage_kind", "stored"),
                // Swift 2.2
                StoredKind::new("storage_kind", "stored_with_trivial_accessors"),
                StoredKind::new("readImpl", "stored"),
            ],
            private_access: vec!["private".into(), "fileprivate".into()],
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Config, JsonGenError> {
        serde_yaml::from_str(text).map_err(|e| JsonGenError::Config {
            message: format!("invalid configuration: {}", e),
            ctx: ErrorContext::none(),
            source: Some(Box::new(e)),
        })
    }

    pub fn load(path: &Path) -> Result<Config, JsonGenError> {
        let text = fs::read_to_string(path).map_err(|e| JsonGenError::io(path.display(), e))?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            JsonGenError::Config {
                message,
                ctx,
                source,
            } => JsonGenError::Config {
                message: format!("{}: {}", path.display(), message),
                ctx,
                source,
            },
            other => other,
        })
    }

    pub fn is_decoder(&self, method: &str) -> bool {
        self.decoder_names.iter().any(|n| n == method)
    }

    pub fn is_encoder(&self, method: &str) -> bool {
        self.encoder_names.iter().any(|n| n == method)
    }

    pub fn is_private(&self, access: &str) -> bool {
        self.private_access.iter().any(|a| a == access)
    }
}
