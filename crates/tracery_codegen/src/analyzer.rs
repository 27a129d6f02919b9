//! Template analysis.
//!
//! Walks the component tree breadth-first, resolving each ref against the
//! component index, and produces an output-node skeleton plus the side
//! tables the page assembler needs: the import requirement table and the
//! hoisted-declaration groups.
//!
//! Property resolution re-enters the analyzer wherever a property value
//! embeds a component sub-tree; the nested run's side tables are merged by
//! value into the caller's, and the nested markup is rendered immediately
//! and spliced into the surrounding literal.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use serde_json::Value;
use tracery_emit::{
    join_import_path, serialize_literal, serialize_value, EmbedVisitor, PathMatcher,
};
use tracery_schema::{
    ComponentSchema, ComponentSchemaRef, EmbedKind, ImportKind, PageSchema, PropsSchema,
    ValueKind, ValueSource,
};

use crate::error::CompileError;
use crate::hooks::{CallbackDecl, ConstantDecl, EffectDecl, HoistTables, MemoDecl, StateDecl};
use crate::import::ImportTable;
use crate::tag::{emit_tag, TagNode};

/// Embedded sub-trees deeper than this fail instead of looping forever on a
/// malformed (cyclic) document.
pub const MAX_EMBED_DEPTH: u32 = 64;

/// The framework dependency every generated page imports.
const FRAMEWORK_PATH: &str = "react";

/// Result of one analyzer run.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// `None` signals an empty page (`return null`).
    pub skeleton: Option<TagNode>,
    pub imports: ImportTable,
    pub hoists: HoistTables,
}

impl Analysis {
    /// The analysis of a page with no root: just the framework import.
    pub fn empty() -> Self {
        let mut imports = ImportTable::default();
        imports.add(FRAMEWORK_PATH, ImportKind::Default, "React");
        Self {
            skeleton: None,
            imports,
            hoists: HoistTables::default(),
        }
    }
}

/// Walks one component tree of an immutable page snapshot.
pub struct TemplateAnalyzer<'a> {
    page: &'a PageSchema,
    depth: u32,
}

/// Output slot arena entry, filled in lockstep with the input queue.
#[derive(Default)]
struct Slot {
    tag_name: String,
    props: Vec<String>,
    children: Vec<usize>,
    text: Option<String>,
}

impl<'a> TemplateAnalyzer<'a> {
    pub fn new(page: &'a PageSchema) -> Self {
        Self { page, depth: 0 }
    }

    fn at_depth(page: &'a PageSchema, depth: u32) -> Self {
        Self { page, depth }
    }

    /// Analyze the tree under `root`.
    pub fn analyze(&self, root: &ComponentSchemaRef) -> Result<Analysis, CompileError> {
        if self.depth > MAX_EMBED_DEPTH {
            return Err(CompileError::EmbedDepthExceeded);
        }

        let mut imports = ImportTable::default();
        imports.add(FRAMEWORK_PATH, ImportKind::Default, "React");
        let mut hoists = HoistTables::default();

        // Two synchronized work lists: pending input refs and the indexes of
        // their pre-allocated output slots, advanced in lockstep.
        let mut slots: Vec<Slot> = vec![Slot::default()];
        let mut queue: VecDeque<(&ComponentSchemaRef, usize)> = VecDeque::new();
        queue.push_back((root, 0));
        let mut visited: FxHashSet<&str> = FxHashSet::default();

        while let Some((node_ref, slot)) = queue.pop_front() {
            let target_id = match node_ref {
                ComponentSchemaRef::Text { text } => {
                    slots[slot].text = Some(text.clone());
                    continue;
                }
                ComponentSchemaRef::Node { target_id } => target_id,
            };
            let node = self
                .page
                .component_index
                .get(target_id)
                .ok_or_else(|| CompileError::UnknownComponent(target_id.clone()))?;
            if !visited.insert(node.id.as_str()) {
                return Err(CompileError::CyclicReference(node.id.clone()));
            }

            slots[slot].tag_name = node.display_name().to_string();

            if !node.is_native_tag() {
                let path = join_import_path(&node.dependency, node.import_relative_path.as_deref());
                imports.add(&path, import_kind_for(node), &node.name);
            }

            if let Some(bound) = self.page.props_index.get(&node.id) {
                let resolved = self.resolve_props(node, bound)?;
                slots[slot].props = resolved.props;
                imports.merge(resolved.imports);
                hoists.merge(resolved.hoists);
            }

            for child in &node.children {
                slots.push(Slot::default());
                let index = slots.len() - 1;
                slots[slot].children.push(index);
                queue.push_back((child, index));
            }
        }

        // Hook primitives required by the declaration groups produced.
        if !hoists.states.is_empty() {
            imports.add(FRAMEWORK_PATH, ImportKind::Named, "useState");
        }
        if !hoists.effects.is_empty() {
            imports.add(FRAMEWORK_PATH, ImportKind::Named, "useEffect");
        }
        if !hoists.memos.is_empty() {
            imports.add(FRAMEWORK_PATH, ImportKind::Named, "useMemo");
        }
        if !hoists.callbacks.is_empty() {
            imports.add(FRAMEWORK_PATH, ImportKind::Named, "useCallback");
        }

        Ok(Analysis {
            skeleton: Some(into_tag_node(&slots, 0)),
            imports,
            hoists,
        })
    }

    /// Resolve the declared properties of one node into literal property
    /// strings and hoisted declarations.
    fn resolve_props(
        &self,
        node: &ComponentSchema,
        bound: &FxHashMap<String, PropsSchema>,
    ) -> Result<ResolvedProps, CompileError> {
        let mut out = ResolvedProps::default();

        for prop_ref in &node.property_refs {
            // An unbound optional property, not an error.
            let Some(props) = bound.get(prop_ref) else {
                continue;
            };

            match props.value_source {
                ValueSource::EditorInput => match props.value_kind {
                    ValueKind::String => {
                        out.props
                            .push(format!("{}=\"{}\"", prop_ref, literal_text(&props.value)));
                    }
                    ValueKind::Number | ValueKind::Boolean => {
                        out.props
                            .push(format!("{}={{{}}}", prop_ref, literal_text(&props.value)));
                    }
                    ValueKind::Object | ValueKind::Array | ValueKind::Function => {
                        let variable = hoisted_name(&props.name, Purpose::Const, &node.id);
                        out.props.push(variable_prop(prop_ref, &variable));
                        let value = if props.embedded_subtree_paths.is_empty() {
                            serialize_literal(&props.value)
                        } else {
                            let matchers = PathMatcher::compile(&props.embedded_subtree_paths)?;
                            let mut embedder = SubtreeEmbedder {
                                page: self.page,
                                depth: self.depth,
                                imports: &mut out.imports,
                                hoists: &mut out.hoists,
                            };
                            serialize_value(&props.value, &matchers, &mut embedder)?
                        };
                        out.hoists.constants.push(ConstantDecl {
                            name: variable,
                            value,
                        });
                    }
                },
                ValueSource::Handler => {
                    let variable = hoisted_name(&props.name, Purpose::Callback, &node.id);
                    out.props.push(variable_prop(prop_ref, &variable));
                    out.hoists.callbacks.push(CallbackDecl {
                        name: variable.clone(),
                        dependencies: Some(Vec::new()),
                        body: format!("console.log('useCallback {variable} works!');"),
                    });
                }
                ValueSource::Computed => {
                    let variable = hoisted_name(&props.name, Purpose::Memo, &node.id);
                    out.props.push(variable_prop(prop_ref, &variable));
                    out.hoists.memos.push(MemoDecl {
                        name: variable.clone(),
                        dependencies: Some(Vec::new()),
                        body: format!("console.log('useMemo {variable} works!');"),
                    });
                }
                ValueSource::UserInput => {
                    let variable = hoisted_name(&props.name, Purpose::State, &node.id);
                    out.props.push(variable_prop(prop_ref, &variable));
                    // A controlled value additionally gets a synchronization
                    // effect tracking its state variable. Only a state-backed
                    // value can be controlled; the flag is ignored on every
                    // other source, which declares no state variable for an
                    // effect to track.
                    if props.is_reactive_value {
                        out.hoists.effects.push(EffectDecl {
                            name: variable.clone(),
                            dependencies: Some(vec![variable.clone()]),
                            body: format!("console.log('useEffect {variable} works!');"),
                        });
                    }
                    out.hoists.states.push(StateDecl {
                        name: variable,
                        kind: props.value_kind,
                        initial: serialize_literal(&props.value).join(" "),
                    });
                }
            }
        }
        Ok(out)
    }
}

#[derive(Default)]
struct ResolvedProps {
    props: Vec<String>,
    imports: ImportTable,
    hoists: HoistTables,
}

/// Re-enters the analyzer at embedded-subtree matches during literal
/// serialization, accumulating side-table deltas for the caller to merge.
struct SubtreeEmbedder<'a, 'b> {
    page: &'a PageSchema,
    depth: u32,
    imports: &'b mut ImportTable,
    hoists: &'b mut HoistTables,
}

impl EmbedVisitor for SubtreeEmbedder<'_, '_> {
    type Error = CompileError;

    fn visit(
        &mut self,
        value: &Value,
        kind: EmbedKind,
        wrapper: &[String],
        insert_index: usize,
    ) -> Result<Vec<String>, Self::Error> {
        let node_ref: ComponentSchemaRef = serde_json::from_value(value.clone())
            .map_err(|_| CompileError::MalformedEmbeddedRef)?;

        let nested = TemplateAnalyzer::at_depth(self.page, self.depth + 1).analyze(&node_ref)?;
        self.imports.merge(nested.imports);
        self.hoists.merge(nested.hoists);

        let mut lines = match nested.skeleton {
            Some(skeleton) => emit_tag(&skeleton),
            None => Vec::new(),
        };
        if kind == EmbedKind::Callback {
            let mut wrapped = Vec::with_capacity(lines.len() + 2);
            wrapped.push("() => (".to_string());
            wrapped.append(&mut lines);
            wrapped.push(")".to_string());
            lines = wrapped;
        }

        if wrapper.is_empty() {
            Ok(lines)
        } else {
            let mut merged = wrapper.to_vec();
            let index = insert_index.min(merged.len());
            merged.splice(index..index, lines);
            Ok(merged)
        }
    }
}

/// A schema may omit the import kind; a relative path implies a default
/// import, anything else a named one.
fn import_kind_for(node: &ComponentSchema) -> ImportKind {
    node.import_kind.unwrap_or(
        if matches!(&node.import_relative_path, Some(p) if !p.is_empty()) {
            ImportKind::Default
        } else {
            ImportKind::Named
        },
    )
}

fn into_tag_node(slots: &[Slot], index: usize) -> TagNode {
    let slot = &slots[index];
    TagNode {
        tag_name: slot.tag_name.clone(),
        props: slot.props.clone(),
        children: slot
            .children
            .iter()
            .map(|&child| into_tag_node(slots, child))
            .collect(),
        text: slot.text.clone(),
    }
}

#[derive(Clone, Copy)]
enum Purpose {
    State,
    Memo,
    Callback,
    Const,
}

impl Purpose {
    fn suffix(self) -> &'static str {
        match self {
            Purpose::State => "State",
            Purpose::Memo => "Memo",
            Purpose::Callback => "Callback",
            Purpose::Const => "Const",
        }
    }
}

/// `<propertyName><PurposeSuffix>Of<OwningNodeId>` — deterministic and
/// collision-free because the owning node id is unique.
fn hoisted_name(prop_name: &str, purpose: Purpose, node_id: &str) -> String {
    format!(
        "{prop_name}{}Of{}",
        purpose.suffix(),
        tracery_emit::capitalize(node_id)
    )
}

fn variable_prop(name: &str, variable: &str) -> String {
    format!("{name}={{{variable}}}")
}

/// Inline literal text for a primitive prop value.
fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn component(id: &str, name: &str, dependency: &str) -> ComponentSchema {
        ComponentSchema {
            id: id.to_string(),
            name: name.to_string(),
            calling_name: None,
            dependency: dependency.to_string(),
            import_kind: None,
            import_relative_path: None,
            property_refs: Vec::new(),
            children: Vec::new(),
        }
    }

    fn prop(name: &str, value: Value, kind: ValueKind, source: &str) -> PropsSchema {
        PropsSchema {
            name: name.to_string(),
            value,
            value_kind: kind,
            value_source: serde_json::from_value(json!(source)).unwrap(),
            is_reactive_value: false,
            embedded_subtree_paths: Vec::new(),
        }
    }

    fn page_with(components: Vec<ComponentSchema>) -> PageSchema {
        let mut component_index = FxHashMap::default();
        for c in components {
            component_index.insert(c.id.clone(), c);
        }
        PageSchema {
            name: "index".to_string(),
            description: String::new(),
            root_ref: None,
            component_index,
            props_index: FxHashMap::default(),
        }
    }

    fn bind(page: &mut PageSchema, id: &str, props: Vec<PropsSchema>) {
        let mut map = FxHashMap::default();
        for p in &props {
            map.insert(p.name.clone(), p.clone());
        }
        page.component_index
            .get_mut(id)
            .unwrap()
            .property_refs
            .extend(props.iter().map(|p| p.name.clone()));
        page.props_index.insert(id.to_string(), map);
    }

    #[test]
    fn text_root_is_a_text_skeleton() {
        let page = page_with(vec![]);
        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::text("hello"))
            .unwrap();
        let skeleton = analysis.skeleton.unwrap();
        assert_eq!(skeleton.text.as_deref(), Some("hello"));
        assert!(skeleton.children.is_empty());
    }

    #[test]
    fn unknown_component_is_a_typed_error() {
        let page = page_with(vec![]);
        let err = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("ghost"))
            .unwrap_err();
        assert!(matches!(err, CompileError::UnknownComponent(id) if id == "ghost"));
    }

    #[test]
    fn self_referencing_tree_is_reported_as_cyclic() {
        let mut looped = component("A", "div", "html");
        looped.children.push(ComponentSchemaRef::node("A"));
        let page = page_with(vec![looped]);
        let err = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("A"))
            .unwrap_err();
        assert!(matches!(err, CompileError::CyclicReference(id) if id == "A"));
    }

    #[test]
    fn native_tags_require_no_import() {
        let page = page_with(vec![component("div1", "div", "html")]);
        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("div1"))
            .unwrap();
        // Only the framework seed.
        assert_eq!(analysis.imports.groups().len(), 1);
        assert_eq!(analysis.imports.groups()[0].path, "react");
    }

    #[test]
    fn same_name_from_same_path_is_imported_once() {
        let mut root = component("div1", "div", "html");
        root.children.push(ComponentSchemaRef::node("b1"));
        root.children.push(ComponentSchemaRef::node("b2"));
        let mut b1 = component("b1", "Button", "antd");
        b1.import_kind = Some(ImportKind::Named);
        let mut b2 = component("b2", "Button", "antd");
        b2.import_kind = Some(ImportKind::Named);
        let page = page_with(vec![root, b1, b2]);

        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("div1"))
            .unwrap();
        let antd = analysis
            .imports
            .groups()
            .iter()
            .find(|g| g.path == "antd")
            .unwrap();
        assert_eq!(antd.names, vec!["Button"]);
    }

    #[test]
    fn import_kind_defaults_follow_the_relative_path() {
        let mut table = component("t1", "Table", "antd");
        table.import_relative_path = Some("es/Table".to_string());
        let select = component("s1", "Select", "antd");
        let mut root = component("div1", "div", "html");
        root.children.push(ComponentSchemaRef::node("t1"));
        root.children.push(ComponentSchemaRef::node("s1"));
        let page = page_with(vec![root, table, select]);

        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("div1"))
            .unwrap();
        let groups = analysis.imports.groups();
        assert!(groups
            .iter()
            .any(|g| g.path == "antd/es/Table" && g.kind == ImportKind::Default));
        assert!(groups
            .iter()
            .any(|g| g.path == "antd" && g.kind == ImportKind::Named));
    }

    #[test]
    fn unbound_property_refs_are_skipped() {
        let mut input = component("i1", "Input", "antd");
        input.property_refs.push("placeholder".to_string());
        let page = page_with(vec![input]);
        // No props_index entry at all.
        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("i1"))
            .unwrap();
        assert!(analysis.skeleton.unwrap().props.is_empty());
    }

    #[test]
    fn literal_props_branch_on_kind() {
        let mut page = page_with(vec![component("i1", "Input", "antd")]);
        bind(
            &mut page,
            "i1",
            vec![
                prop("placeholder", json!("Type here"), ValueKind::String, "editorInput"),
                prop("maxLength", json!(30), ValueKind::Number, "editorInput"),
                prop("disabled", json!(false), ValueKind::Boolean, "editorInput"),
            ],
        );
        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("i1"))
            .unwrap();
        assert_eq!(
            analysis.skeleton.unwrap().props,
            vec![
                "placeholder=\"Type here\"",
                "maxLength={30}",
                "disabled={false}"
            ]
        );
    }

    #[test]
    fn plain_object_props_hoist_to_constants() {
        let mut page = page_with(vec![component("t1", "Table", "antd")]);
        bind(
            &mut page,
            "t1",
            vec![prop(
                "pagination",
                json!({ "pageSize": 10 }),
                ValueKind::Object,
                "editorInput",
            )],
        );
        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("t1"))
            .unwrap();
        assert_eq!(
            analysis.skeleton.unwrap().props,
            vec!["pagination={paginationConstOfT1}"]
        );
        assert_eq!(analysis.hoists.constants.len(), 1);
        assert_eq!(
            analysis.hoists.constants[0].value,
            vec!["{", "pageSize: 10,", "}"]
        );
        assert!(analysis.hoists.states.is_empty());
    }

    #[test]
    fn reactive_sources_hoist_to_state_with_a_sync_effect() {
        let mut page = page_with(vec![component("i1", "Input", "antd")]);
        let mut value = prop("value", json!("hello"), ValueKind::String, "userInput");
        value.is_reactive_value = true;
        bind(&mut page, "i1", vec![value]);

        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("i1"))
            .unwrap();
        assert_eq!(analysis.hoists.states.len(), 1);
        let state = &analysis.hoists.states[0];
        assert_eq!(state.name, "valueStateOfI1");
        assert_eq!(state.initial, "'hello'");
        let effect = &analysis.hoists.effects[0];
        assert_eq!(effect.dependencies, Some(vec!["valueStateOfI1".to_string()]));
        // The hook primitives land in the import table.
        let react_named = analysis
            .imports
            .groups()
            .iter()
            .find(|g| g.path == "react" && g.kind == ImportKind::Named)
            .unwrap();
        assert_eq!(react_named.names, vec!["useState", "useEffect"]);
    }

    #[test]
    fn computed_sources_hoist_to_memos() {
        let mut page = page_with(vec![component("t1", "Table", "antd")]);
        bind(
            &mut page,
            "t1",
            vec![prop("dataSource", json!(null), ValueKind::Array, "computed")],
        );
        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("t1"))
            .unwrap();
        assert_eq!(
            analysis.skeleton.unwrap().props,
            vec!["dataSource={dataSourceMemoOfT1}"]
        );
        let memo = &analysis.hoists.memos[0];
        assert_eq!(memo.name, "dataSourceMemoOfT1");
        assert_eq!(memo.dependencies, Some(Vec::new()));
        let react_named = analysis
            .imports
            .groups()
            .iter()
            .find(|g| g.path == "react" && g.kind == ImportKind::Named)
            .unwrap();
        assert_eq!(react_named.names, vec!["useMemo"]);
    }

    #[test]
    fn reactive_flag_without_state_backing_synthesizes_no_effect() {
        let mut page = page_with(vec![component("i1", "Input", "antd")]);
        let mut title = prop("title", json!("hi"), ValueKind::String, "editorInput");
        title.is_reactive_value = true;
        bind(&mut page, "i1", vec![title]);
        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("i1"))
            .unwrap();
        // No state variable was declared, so there is nothing for an
        // effect to track.
        assert!(analysis.hoists.effects.is_empty());
        assert!(analysis.hoists.states.is_empty());
        assert_eq!(analysis.skeleton.unwrap().props, vec!["title=\"hi\""]);
    }

    #[test]
    fn synthesized_names_never_collide_across_nodes() {
        let mut root = component("div1", "div", "html");
        root.children.push(ComponentSchemaRef::node("a"));
        root.children.push(ComponentSchemaRef::node("b"));
        let mut page = page_with(vec![root, component("a", "Input", "antd"), component("b", "Input", "antd")]);
        bind(
            &mut page,
            "a",
            vec![prop("value", json!(""), ValueKind::String, "userInput")],
        );
        bind(
            &mut page,
            "b",
            vec![prop("value", json!(""), ValueKind::String, "userInput")],
        );
        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("div1"))
            .unwrap();
        let names: Vec<_> = analysis.hoists.states.iter().map(|s| &s.name).collect();
        assert_eq!(names, vec!["valueStateOfA", "valueStateOfB"]);
    }

    #[test]
    fn embedded_subtree_is_compiled_and_spliced() {
        let mut table = component("t1", "Table", "antd");
        table.import_relative_path = Some("es/Table".to_string());
        let mut button = component("b1", "Button", "antd");
        button.children.push(ComponentSchemaRef::text("Delete"));
        let mut page = page_with(vec![table, button]);
        let mut columns = prop(
            "columns",
            json!([
                { "dataIndex": "name", "title": "Name" },
                { "render": { "targetId": "b1" }, "title": "Op" },
            ]),
            ValueKind::Array,
            "editorInput",
        );
        columns.embedded_subtree_paths.push(tracery_schema::EmbeddedPath {
            path: r"\[\d+\]\.render".to_string(),
            kind: EmbedKind::Callback,
        });
        bind(&mut page, "t1", vec![columns]);

        let analysis = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("t1"))
            .unwrap();
        assert_eq!(
            analysis.hoists.constants[0].value,
            vec![
                "[",
                "{",
                "dataIndex: 'name',",
                "title: 'Name',",
                "},",
                "{",
                "render: () => (",
                "<Button>",
                "Delete",
                "</Button>",
                "),",
                "title: 'Op',",
                "},",
                "]"
            ]
        );
        // The nested tree's import requirement was merged up.
        assert!(analysis
            .imports
            .groups()
            .iter()
            .any(|g| g.path == "antd" && g.names.contains(&"Button".to_string())));
    }

    #[test]
    fn malformed_embedded_value_is_rejected() {
        let mut page = page_with(vec![component("t1", "Table", "antd")]);
        let mut columns = prop(
            "columns",
            json!({ "render": { "nonsense": true } }),
            ValueKind::Object,
            "editorInput",
        );
        columns.embedded_subtree_paths.push(tracery_schema::EmbeddedPath {
            path: r"\.render".to_string(),
            kind: EmbedKind::Node,
        });
        bind(&mut page, "t1", vec![columns]);
        let err = TemplateAnalyzer::new(&page)
            .analyze(&ComponentSchemaRef::node("t1"))
            .unwrap_err();
        assert!(matches!(err, CompileError::MalformedEmbeddedRef));
    }
}
