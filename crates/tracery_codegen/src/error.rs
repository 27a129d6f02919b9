//! Compilation error types.

use thiserror::Error;
use tracery_emit::EmitError;

/// Errors raised while compiling a page document.
///
/// Schema-integrity and emission-configuration errors abort the compilation
/// and propagate unmodified; there is no partial output. A declared
/// property ref with no binding is not an error and is silently skipped.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A non-text ref points at an id absent from the component index.
    #[error("component `{0}` is missing from the component index")]
    UnknownComponent(String),

    /// A node id was reached twice in one traversal; the tree is cyclic.
    #[error("component `{0}` is referenced again inside its own tree")]
    CyclicReference(String),

    /// Embedded sub-trees nest beyond the supported depth.
    #[error("embedded sub-trees nest deeper than the supported limit")]
    EmbedDepthExceeded,

    /// A matched embedded path did not hold a component reference.
    #[error("embedded value at a matched path is not a component reference")]
    MalformedEmbeddedRef,

    /// A misconfigured emitter call.
    #[error(transparent)]
    Emit(#[from] EmitError),
}
