//! Generation error type.

use thiserror::Error;

/// Errors raised during DTSI or kconfig emission.
///
/// Generation fails on the first invariant violation rather than emitting
/// source a ZMK toolchain would reject.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    /// A layer or behavior name cannot be used as a C identifier.
    #[error("'{name}' is not a valid C identifier")]
    InvalidIdentifier {
        /// The offending name.
        name: String,
    },

    /// A kconfig option name is malformed.
    #[error("'{name}' is not a valid kconfig option name")]
    InvalidKconfigName {
        /// The offending option name.
        name: String,
    },
}
