//! Layout-level error type.

use thiserror::Error;
use zmk_layout_ast::{Diagnostic, DiagnosticKind};

/// Errors raised by the layout model, binding parser, validation and the
/// fluent mutation surface.
///
/// These are data, not panics: mutation operations fail early with a
/// specific variant and leave the source document untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A named layer does not exist.
    #[error("layer '{name}' not found")]
    LayerNotFound {
        /// The missing layer name.
        name: String,
    },

    /// A layer with this name already exists.
    #[error("layer '{name}' already exists")]
    LayerAlreadyExists {
        /// The conflicting layer name.
        name: String,
    },

    /// A position index was outside the valid range.
    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The length of the indexed collection.
        len: usize,
    },

    /// A binding string could not be parsed.
    #[error("invalid binding at offset {position}: {reason}")]
    InvalidBinding {
        /// Why parsing failed.
        reason: String,
        /// Character offset into the binding string.
        position: usize,
    },

    /// A name is not a valid C identifier.
    #[error("'{name}' is not a valid C identifier")]
    InvalidIdentifier {
        /// The offending name.
        name: String,
    },

    /// A behavior with this name is already defined in the document.
    #[error("behavior '{name}' already defined")]
    DuplicateBehavior {
        /// The conflicting behavior name.
        name: String,
    },

    /// A reorder list is not a permutation of the current layer names.
    #[error("reorder list does not match the current layer names")]
    ReorderMismatch,

    /// `layer_names` and `layers` have different lengths.
    #[error("layer_names has {names} entries but layers has {layers}")]
    LayerCountMismatch {
        /// Number of layer names.
        names: usize,
        /// Number of layers.
        layers: usize,
    },

    /// A document invariant was violated.
    #[error("{message}")]
    Invalid {
        /// Description of the violation.
        message: String,
    },

    /// An external provider failed.
    #[error("provider failure: {message}")]
    Provider {
        /// The provider's error description.
        message: String,
    },

    /// Dictionary-form serialization or deserialization failed.
    #[error("serialization failed: {message}")]
    Serde {
        /// The underlying serde error description.
        message: String,
    },
}

impl LayoutError {
    /// Convert to the shared diagnostic form.
    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Validate, self.to_string())
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(err: serde_json::Error) -> Self {
        LayoutError::Serde {
            message: err.to_string(),
        }
    }
}
