//! Renderer configuration.

use serde::{Deserialize, Serialize};

use crate::error::EtchError;
use crate::render::Transform;

/// How each field's fallback text is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// The field's own canonical text, e.g. `{name}`.
    #[default]
    FieldSource,
    /// The empty string.
    Empty,
    /// The same fixed text for every field.
    Placeholder(String),
    /// A caller-supplied defaulter; see [`crate::EtcherBuilder::defaulter`].
    Custom,
}

/// How each field's transform decision is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformPolicy {
    /// The same transform for every field.
    Fixed(Transform),
    /// A caller-supplied transformer; see [`crate::EtcherBuilder::transformer`].
    Custom,
}

impl Default for TransformPolicy {
    fn default() -> Self {
        TransformPolicy::Fixed(Transform::Verbatim)
    }
}

/// Configuration for building an [`crate::Etcher`].
///
/// ```
/// let config = etch_core::EtchConfig::from_json_str(
///     r#"{"default": {"placeholder": "N/A"}, "transform": {"fixed": "html"}}"#,
/// )
/// .unwrap();
/// assert_eq!(config.default, etch_core::DefaultPolicy::Placeholder("N/A".into()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtchConfig {
    /// Fallback text policy.
    pub default: DefaultPolicy,
    /// Transform policy.
    pub transform: TransformPolicy,
}

impl EtchConfig {
    /// Load a configuration from JSON text.
    ///
    /// # Errors
    /// [`EtchError::Configuration`] if the document is not a valid config.
    pub fn from_json_str(json: &str) -> Result<Self, EtchError> {
        serde_json::from_str(json).map_err(|e| EtchError::Configuration(e.to_string()))
    }

    /// Serialize this configuration as JSON.
    ///
    /// # Errors
    /// [`EtchError::Configuration`] if serialization fails.
    pub fn to_json(&self) -> Result<String, EtchError> {
        serde_json::to_string(self).map_err(|e| EtchError::Configuration(e.to_string()))
    }
}
