//! Hoisted declaration groups and their React emission shapes.
//!
//! The analyzer hoists property values out of the template into five
//! declaration groups; each group has one emission shape. Declaration names
//! are globally unique (they are keyed by the owning node's id), so merging
//! tables across recursive analyzer calls never renames anything.

use tracery_emit::{assignment, capitalize};
use tracery_schema::ValueKind;

/// A mutable reactive pair: `const [name, setName] = useState(...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDecl {
    pub name: String,
    pub kind: ValueKind,
    /// Initializer expression, already rendered to a single line.
    pub initial: String,
}

/// A synchronization side-effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDecl {
    pub name: String,
    /// `None` omits the dependency argument entirely, which is distinct
    /// from an empty dependency array.
    pub dependencies: Option<Vec<String>>,
    pub body: String,
}

/// A memoized value.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoDecl {
    pub name: String,
    pub dependencies: Option<Vec<String>>,
    pub body: String,
}

/// A memoized callback.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackDecl {
    pub name: String,
    pub dependencies: Option<Vec<String>>,
    pub body: String,
}

/// A hoisted constant with a pre-serialized literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDecl {
    pub name: String,
    pub value: Vec<String>,
}

/// The five hoisted-declaration groups produced by one analyzer run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoistTables {
    pub states: Vec<StateDecl>,
    pub effects: Vec<EffectDecl>,
    pub memos: Vec<MemoDecl>,
    pub callbacks: Vec<CallbackDecl>,
    pub constants: Vec<ConstantDecl>,
}

impl HoistTables {
    /// Merge another set of tables in, by value. Entries whose name is
    /// already present are dropped.
    pub fn merge(&mut self, other: HoistTables) {
        merge_by_name(&mut self.states, other.states, |d| &d.name);
        merge_by_name(&mut self.effects, other.effects, |d| &d.name);
        merge_by_name(&mut self.memos, other.memos, |d| &d.name);
        merge_by_name(&mut self.callbacks, other.callbacks, |d| &d.name);
        merge_by_name(&mut self.constants, other.constants, |d| &d.name);
    }
}

fn merge_by_name<T>(target: &mut Vec<T>, source: Vec<T>, name: impl Fn(&T) -> &String) {
    for entry in source {
        if !target.iter().any(|t| name(t) == name(&entry)) {
            target.push(entry);
        }
    }
}

/// `const [name, setName] = useState<type>(initial);`
pub fn use_state_line(decl: &StateDecl) -> String {
    format!(
        "const [{}, set{}] = useState<{}>({});",
        decl.name,
        capitalize(&decl.name),
        ts_type(decl.kind),
        decl.initial
    )
}

pub fn use_effect_lines(decl: &EffectDecl) -> Vec<String> {
    let close = match dependencies_argument(&decl.dependencies) {
        Some(deps) => format!("}}, {deps});"),
        None => "});".to_string(),
    };
    vec!["useEffect(() => {".to_string(), decl.body.clone(), close]
}

pub fn use_memo_lines(decl: &MemoDecl) -> Vec<String> {
    hook_assignment(&decl.name, "useMemo", &format!("return {}", decl.body), &decl.dependencies)
}

pub fn use_callback_lines(decl: &CallbackDecl) -> Vec<String> {
    hook_assignment(&decl.name, "useCallback", &decl.body, &decl.dependencies)
}

fn hook_assignment(
    name: &str,
    hook: &str,
    body: &str,
    dependencies: &Option<Vec<String>>,
) -> Vec<String> {
    let close = match dependencies_argument(dependencies) {
        Some(deps) => format!("}}, {deps})"),
        None => "})".to_string(),
    };
    assignment(
        name,
        &[format!("{hook}(() => {{"), body.to_string(), close],
        false,
    )
}

fn dependencies_argument(dependencies: &Option<Vec<String>>) -> Option<String> {
    dependencies
        .as_ref()
        .map(|deps| format!("[{}]", deps.join(", ")))
}

fn ts_type(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::String => "string",
        ValueKind::Number => "number",
        ValueKind::Boolean => "boolean",
        ValueKind::Object => "object",
        ValueKind::Array => "any[]",
        ValueKind::Function => "Function",
    }
}
