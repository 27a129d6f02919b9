//! Emit - language-agnostic source text primitives.
//!
//! This crate holds the target-language plumbing the Tracery code generator
//! is built on: import statements, assignments, call expressions, function
//! definition blocks, and a recursive nested-value serializer with an
//! injection seam for embedded component sub-trees.
//!
//! Every primitive is a pure function of a configuration record; nothing in
//! this crate holds state between calls.

mod error;
mod statement;
mod value;

pub use error::EmitError;
pub use statement::{
    assignment, call_expression, capitalize, function_definition, import_statement,
    join_import_path, ExportKind, FunctionOptions, ImportOptions,
};
pub use value::{serialize_literal, serialize_value, EmbedVisitor, PathMatcher};
