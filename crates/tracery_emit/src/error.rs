//! Error types for emission primitives.

use thiserror::Error;

/// Errors raised by a misconfigured emitter call.
///
/// These are programmer/caller errors, not data errors, and are surfaced
/// immediately with no partial output.
#[derive(Debug, Error)]
pub enum EmitError {
    /// An import statement was requested without a path.
    #[error("import statement has no import path")]
    MissingImportPath,

    /// An import statement was requested with zero names.
    #[error("no import names")]
    NoImportNames,

    /// An embedded-subtree path pattern is not a valid regex.
    #[error("invalid embedded path pattern `{pattern}`")]
    InvalidPathPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
