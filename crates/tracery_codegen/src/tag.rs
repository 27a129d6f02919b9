//! Tag emission.
//!
//! Converts an output-node skeleton into an ordered line sequence. No
//! indentation is produced; presentation formatting belongs to the caller.

/// The intermediate tag/children/text skeleton built by the analyzer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagNode {
    pub tag_name: String,
    /// Literal property strings in declaration order, e.g. `title="hi"`.
    pub props: Vec<String>,
    pub children: Vec<TagNode>,
    /// Set for a text leaf; such a node has no tag or children.
    pub text: Option<String>,
}

/// Emit a skeleton as source lines in pre-order.
pub fn emit_tag(node: &TagNode) -> Vec<String> {
    let mut lines = Vec::new();
    emit_into(node, &mut lines);
    lines
}

fn emit_into(node: &TagNode, lines: &mut Vec<String>) {
    if let Some(text) = &node.text {
        lines.push(text.clone());
        return;
    }
    let props = if node.props.is_empty() {
        String::new()
    } else {
        format!(" {}", node.props.join(" "))
    };
    if node.children.is_empty() {
        lines.push(format!("<{}{} />", node.tag_name, props));
    } else {
        lines.push(format!("<{}{}>", node.tag_name, props));
        for child in &node.children {
            emit_into(child, lines);
        }
        lines.push(format!("</{}>", node.tag_name));
    }
}
