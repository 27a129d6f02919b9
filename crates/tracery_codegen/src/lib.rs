//! Codegen - compiles a Tracery page document into React TSX source lines.
//!
//! The pipeline runs in one direction over an immutable [`PageSchema`]
//! snapshot:
//!
//! 1. the [`analyzer`] walks the component tree breadth-first, building an
//!    output-node skeleton plus the import table and hoisted-declaration
//!    groups, re-entering itself for component sub-trees embedded inside
//!    property values;
//! 2. the [`tag`] emitter turns skeletons into markup lines;
//! 3. the [`assembler`] orders imports, declarations, and the component
//!    function into the final line sequence.
//!
//! No file writing or pretty-printing happens here; callers own
//! presentation of the returned lines.

pub mod analyzer;
pub mod assembler;
pub mod error;
pub mod hooks;
pub mod import;
pub mod tag;

pub use analyzer::{Analysis, TemplateAnalyzer, MAX_EMBED_DEPTH};
pub use assembler::{generate_page, generate_page_with_options, GenerateOptions};
pub use error::CompileError;
pub use hooks::{
    use_callback_lines, use_effect_lines, use_memo_lines, use_state_line, CallbackDecl,
    ConstantDecl, EffectDecl, HoistTables, MemoDecl, StateDecl,
};
pub use import::{ImportGroup, ImportTable};
pub use tag::{emit_tag, TagNode};

// Re-export the sibling crates so downstream callers need only one import.
pub use tracery_emit as emit;
pub use tracery_schema as schema;

pub use tracery_schema::PageSchema;
