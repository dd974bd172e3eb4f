//! Typed error types for template parsing, argument extraction, and rendering.

use crate::eval::EvalError;

/// Errors raised by the etch core.
///
/// Parsing and construction errors are fatal to the call that raised them.
/// Per-field formatting failures during rendering only surface here (as
/// [`EtchError::Render`]) when the field has no precomputed default.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EtchError {
    // -- Parsing --
    /// Unbalanced braces, a bad conversion marker, or a format spec nested
    /// deeper than one level.
    #[error("malformed template at byte {offset}: {message}")]
    MalformedTemplate {
        /// Byte offset into the scanned text where the problem was detected.
        offset: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    // -- Argument extraction --
    /// A field uses dotted or indexed access, which extraction does not support.
    #[error("encountered compound format arg: {name:?}")]
    CompoundName {
        /// The raw field name as written.
        name: String,
    },

    /// A field has no name or index; run positional inference first.
    #[error("encountered anonymous positional argument")]
    AnonymousField,

    // -- Construction --
    /// The renderer was configured with a strategy it cannot use.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    // -- Rendering --
    /// A field failed to format and no default was precomputed for it.
    #[error("field {field} failed to render and has no default")]
    Render {
        /// Canonical text of the failing field.
        field: String,
        /// The evaluator failure for that field.
        #[source]
        source: EvalError,
    },
}

impl EtchError {
    pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Self {
        EtchError::MalformedTemplate {
            offset,
            message: message.into(),
        }
    }

    /// Returns `true` if this error came from parsing the template text.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, EtchError::MalformedTemplate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            EtchError::malformed(3, "Single '}' encountered").to_string(),
            "malformed template at byte 3: Single '}' encountered"
        );
        assert_eq!(
            EtchError::CompoundName {
                name: "0.__name__".into()
            }
            .to_string(),
            "encountered compound format arg: \"0.__name__\""
        );
        assert!(EtchError::malformed(0, "x").is_parse_error());
        assert!(!EtchError::AnonymousField.is_parse_error());
    }
}
