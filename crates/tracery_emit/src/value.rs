//! Nested-value serialization.
//!
//! Converts an arbitrary JSON-like value into literal source lines: objects
//! become brace blocks with `key: value,` entries, arrays become bracket
//! blocks, strings are single-quoted, other primitives are bare tokens.
//! Every entry carries a trailing comma, including the last, so callers can
//! compose lines mechanically.
//!
//! The serializer tracks a structural path while descending (`.field`,
//! `[2]`). When the path matches one of the caller's patterns, control is
//! handed to an [`EmbedVisitor`] strategy instead of default serialization;
//! the visitor returns the lines to splice in. The serializer itself holds
//! no state and is safe to re-enter from inside a visitor.

use regex::Regex;
use serde_json::Value;
use tracery_schema::{EmbedKind, EmbeddedPath};

use crate::error::EmitError;

/// A compiled embedded-subtree path pattern.
#[derive(Debug)]
pub struct PathMatcher {
    pattern: Regex,
    pub kind: EmbedKind,
}

impl PathMatcher {
    /// Compile a schema's path patterns. An unparseable pattern is an
    /// emission configuration error.
    pub fn compile(paths: &[EmbeddedPath]) -> Result<Vec<PathMatcher>, EmitError> {
        paths
            .iter()
            .map(|p| {
                Regex::new(&p.path)
                    .map(|pattern| PathMatcher {
                        pattern,
                        kind: p.kind,
                    })
                    .map_err(|source| EmitError::InvalidPathPattern {
                        pattern: p.path.clone(),
                        source,
                    })
            })
            .collect()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Strategy invoked wherever the structural path matches a pattern.
///
/// `wrapper` is the already-emitted literal the result must land in (empty
/// when the value stands alone); `insert_index` is where in `wrapper` the
/// generated lines belong. The visitor returns the full line sequence to
/// splice in place of default serialization.
pub trait EmbedVisitor {
    type Error: From<EmitError>;

    fn visit(
        &mut self,
        value: &Value,
        kind: EmbedKind,
        wrapper: &[String],
        insert_index: usize,
    ) -> Result<Vec<String>, Self::Error>;
}

/// Serialize `value` to literal source lines, handing matched paths to
/// `visitor`.
pub fn serialize_value<V: EmbedVisitor>(
    value: &Value,
    matchers: &[PathMatcher],
    visitor: &mut V,
) -> Result<Vec<String>, V::Error> {
    serialize_at(value, "", matchers, visitor)
}

/// Serialize a plain literal with no embedded sub-trees.
pub fn serialize_literal(value: &Value) -> Vec<String> {
    // With no matchers the visitor is unreachable and no error can occur.
    serialize_value(value, &[], &mut NoEmbeds).unwrap_or_default()
}

struct NoEmbeds;

impl EmbedVisitor for NoEmbeds {
    type Error = EmitError;

    fn visit(
        &mut self,
        _value: &Value,
        _kind: EmbedKind,
        _wrapper: &[String],
        _insert_index: usize,
    ) -> Result<Vec<String>, Self::Error> {
        Ok(Vec::new())
    }
}

fn serialize_at<V: EmbedVisitor>(
    value: &Value,
    path: &str,
    matchers: &[PathMatcher],
    visitor: &mut V,
) -> Result<Vec<String>, V::Error> {
    if let Some(matcher) = matchers.iter().find(|m| m.is_match(path)) {
        return visit_match(value, matcher, visitor);
    }

    let lines = match value {
        Value::Null => vec!["null".to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Number(n) => vec![n.to_string()],
        Value::String(s) => vec![format!("'{}'", escape_single_quoted(s))],
        Value::Array(items) => {
            if items.is_empty() {
                return Ok(vec!["[]".to_string()]);
            }
            let mut lines = vec!["[".to_string()];
            for (index, item) in items.iter().enumerate() {
                let child_path = format!("{path}[{index}]");
                let mut child = serialize_at(item, &child_path, matchers, visitor)?;
                if let Some(last) = child.last_mut() {
                    last.push(',');
                }
                lines.extend(child);
            }
            lines.push("]".to_string());
            lines
        }
        Value::Object(entries) => {
            if entries.is_empty() {
                return Ok(vec!["{}".to_string()]);
            }
            let mut lines = vec!["{".to_string()];
            for (key, entry) in entries {
                let child_path = format!("{path}.{key}");
                let mut child = serialize_at(entry, &child_path, matchers, visitor)?;
                if let Some(first) = child.first_mut() {
                    first.insert_str(0, &format!("{}: ", object_key(key)));
                }
                if let Some(last) = child.last_mut() {
                    last.push(',');
                }
                lines.extend(child);
            }
            lines.push("}".to_string());
            lines
        }
    };
    Ok(lines)
}

/// A matched value is a single embedded ref or a homogeneous array of refs.
/// An array is rebuilt as an array literal, threading the accumulated
/// bracket skeleton through the visitor so each element lands at the
/// position just before the closing bracket.
fn visit_match<V: EmbedVisitor>(
    value: &Value,
    matcher: &PathMatcher,
    visitor: &mut V,
) -> Result<Vec<String>, V::Error> {
    match value {
        Value::Array(items) => {
            let mut wrapper = vec!["[".to_string(), "]".to_string()];
            for item in items {
                let insert_index = wrapper.len() - 1;
                wrapper = visitor.visit(item, matcher.kind, &wrapper, insert_index)?;
            }
            Ok(wrapper)
        }
        _ => visitor.visit(value, matcher.kind, &[], 0),
    }
}

/// Quote an object key only when it is not a plain identifier.
fn object_key(key: &str) -> String {
    let needs_quote =
        key.contains('-') || key.chars().next().is_some_and(|c| c.is_ascii_digit());
    if needs_quote {
        format!("'{}'", escape_single_quoted(key))
    } else {
        key.to_string()
    }
}

fn escape_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
}
