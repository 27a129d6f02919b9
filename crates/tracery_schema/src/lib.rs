//! Persisted page document types.
//!
//! A page authored in the Tracery editor is stored as a [`PageSchema`]: a
//! component tree whose nodes are declared in an id-keyed index, with a
//! parallel index of resolved property bindings. The code generator receives
//! the document as an immutable snapshot; nothing in this crate is mutated
//! during generation.
//!
//! All types derive `serde` with camelCase field names so the editor's
//! persisted JSON loads directly.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `dependency` value that marks a native HTML tag, requiring no import.
pub const NATIVE_TAG_DEPENDENCY: &str = "html";

/// One full page document: the compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Root of the component tree. A freshly created page has no root yet.
    #[serde(default)]
    pub root_ref: Option<ComponentSchemaRef>,
    /// Component id -> declaration.
    pub component_index: FxHashMap<String, ComponentSchema>,
    /// Component id -> property-reference-name -> binding.
    #[serde(default)]
    pub props_index: FxHashMap<String, FxHashMap<String, PropsSchema>>,
}

/// A declared node in the component tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSchema {
    pub id: String,
    /// Canonical type name; also the imported name.
    pub name: String,
    /// Display/invocation name override, e.g. `Typography.Text`.
    #[serde(default)]
    pub calling_name: Option<String>,
    /// Package or source the component comes from; [`NATIVE_TAG_DEPENDENCY`]
    /// means a native tag.
    pub dependency: String,
    #[serde(default)]
    pub import_kind: Option<ImportKind>,
    #[serde(default)]
    pub import_relative_path: Option<String>,
    /// Ordered property-reference-names declared on this node.
    #[serde(default)]
    pub property_refs: Vec<String>,
    #[serde(default)]
    pub children: Vec<ComponentSchemaRef>,
}

impl ComponentSchema {
    /// Whether this node is a native tag (no import requirement).
    pub fn is_native_tag(&self) -> bool {
        self.dependency == NATIVE_TAG_DEPENDENCY
    }

    /// The name used at the invocation site.
    pub fn display_name(&self) -> &str {
        self.calling_name.as_deref().unwrap_or(&self.name)
    }
}

/// A tree-position reference: either a declared node or a literal text leaf.
///
/// Serialized shapes are distinguished by field name (`targetId` vs
/// `literalText`), so both persisted forms load without an explicit tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentSchemaRef {
    Node {
        #[serde(rename = "targetId")]
        target_id: String,
    },
    Text {
        #[serde(rename = "literalText")]
        text: String,
    },
}

impl ComponentSchemaRef {
    pub fn node(target_id: impl Into<String>) -> Self {
        Self::Node {
            target_id: target_id.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

/// How a component is imported from its dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Default,
    Named,
    Wildcard,
}

/// The kind of a bound property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Function,
}

/// Where a bound property value comes from.
///
/// Anything that is not a fixed editor input, a handler, or a computed value
/// is some reactive user-driven source and hoists to state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueSource {
    EditorInput,
    Handler,
    Computed,
    UserInput,
}

impl<'de> Deserialize<'de> for ValueSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Unknown reactive sources (e.g. `httpRequest`) all hoist to state.
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "editorInput" => Self::EditorInput,
            "handler" => Self::Handler,
            "computed" => Self::Computed,
            _ => Self::UserInput,
        })
    }
}

/// Shape of an embedded sub-tree at a matched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedKind {
    /// The generated markup stands in for the value directly.
    #[serde(rename = "object")]
    Node,
    /// The generated markup is wrapped in a render-callback arrow.
    #[serde(rename = "function")]
    Callback,
}

/// A path pattern marking where a [`ComponentSchemaRef`] (or array of refs)
/// is embedded inside an otherwise literal property value.
///
/// `path` is a regex source string matched against the structural path the
/// serializer tracks while descending (`.field`, `[2]`, ...). An empty
/// pattern matches the value itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedPath {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EmbedKind,
}

/// One resolved property binding on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropsSchema {
    pub name: String,
    pub value: Value,
    pub value_kind: ValueKind,
    pub value_source: ValueSource,
    /// Marks a controlled value that additionally needs a synchronization
    /// side-effect.
    #[serde(default)]
    pub is_reactive_value: bool,
    #[serde(default)]
    pub embedded_subtree_paths: Vec<EmbeddedPath>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ref_shapes_deserialize_by_field_name() {
        let node: ComponentSchemaRef =
            serde_json::from_value(json!({ "targetId": "Button1", "isText": false })).unwrap();
        assert_eq!(node, ComponentSchemaRef::node("Button1"));

        let text: ComponentSchemaRef =
            serde_json::from_value(json!({ "literalText": "hello", "isText": true })).unwrap();
        assert_eq!(text, ComponentSchemaRef::text("hello"));
        assert!(text.is_text());
    }

    #[test]
    fn unknown_value_source_falls_back_to_user_input() {
        let source: ValueSource = serde_json::from_value(json!("userInput")).unwrap();
        assert_eq!(source, ValueSource::UserInput);
        let source: ValueSource = serde_json::from_value(json!("httpRequest")).unwrap();
        assert_eq!(source, ValueSource::UserInput);
        let source: ValueSource = serde_json::from_value(json!("editorInput")).unwrap();
        assert_eq!(source, ValueSource::EditorInput);
    }

    #[test]
    fn embedded_path_uses_persisted_type_names() {
        let path: EmbeddedPath =
            serde_json::from_value(json!({ "path": "\\[\\d+\\]\\.render", "type": "function" }))
                .unwrap();
        assert_eq!(path.kind, EmbedKind::Callback);
        let path: EmbeddedPath =
            serde_json::from_value(json!({ "path": "", "type": "object" })).unwrap();
        assert_eq!(path.kind, EmbedKind::Node);
    }

    #[test]
    fn native_tag_and_display_name() {
        let schema: ComponentSchema = serde_json::from_value(json!({
            "id": "Text1",
            "name": "Typography",
            "callingName": "Typography.Text",
            "dependency": "html",
        }))
        .unwrap();
        assert!(schema.is_native_tag());
        assert_eq!(schema.display_name(), "Typography.Text");
        assert!(schema.property_refs.is_empty());
    }

    #[test]
    fn props_schema_defaults() {
        let props: PropsSchema = serde_json::from_value(json!({
            "name": "title",
            "value": "hello",
            "valueKind": "string",
            "valueSource": "editorInput",
        }))
        .unwrap();
        assert!(!props.is_reactive_value);
        assert!(props.embedded_subtree_paths.is_empty());
    }
}
