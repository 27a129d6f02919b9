//! Page assembly.
//!
//! Orders and concatenates everything one analyzer run produced into the
//! final source-line sequence: imports, hoisted declarations in a fixed
//! group order, then the default-exported component function returning the
//! page markup.

use tracery_emit::{
    assignment, capitalize, function_definition, import_statement, ExportKind, FunctionOptions,
    ImportOptions,
};
use tracery_schema::PageSchema;

use crate::analyzer::{Analysis, TemplateAnalyzer};
use crate::error::CompileError;
use crate::hooks::{use_callback_lines, use_effect_lines, use_memo_lines, use_state_line};
use crate::tag::emit_tag;

/// Options for one page generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Terminate import lines with semicolons.
    pub import_semicolons: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            import_semicolons: true,
        }
    }
}

/// Compile a page document with default options.
pub fn generate_page(page: &PageSchema) -> Result<Vec<String>, CompileError> {
    generate_page_with_options(page, &GenerateOptions::default())
}

/// Compile a page document into an ordered sequence of source lines.
///
/// Generation is a pure function of the snapshot: identical input yields
/// byte-identical output.
pub fn generate_page_with_options(
    page: &PageSchema,
    options: &GenerateOptions,
) -> Result<Vec<String>, CompileError> {
    let analysis = match &page.root_ref {
        Some(root) => TemplateAnalyzer::new(page).analyze(root)?,
        None => Analysis::empty(),
    };

    let mut lines = Vec::new();
    for group in analysis.imports.groups() {
        lines.push(import_statement(&ImportOptions {
            kind: group.kind,
            names: &group.names,
            path: &group.path,
            semicolon: options.import_semicolons,
        })?);
    }

    // Declarations in fixed group order: state, effect, memo, callback,
    // constant.
    let mut body = Vec::new();
    for state in &analysis.hoists.states {
        body.push(use_state_line(state));
    }
    for effect in &analysis.hoists.effects {
        body.extend(use_effect_lines(effect));
    }
    for memo in &analysis.hoists.memos {
        body.extend(use_memo_lines(memo));
    }
    for callback in &analysis.hoists.callbacks {
        body.extend(use_callback_lines(callback));
    }
    for constant in &analysis.hoists.constants {
        body.extend(assignment(&constant.name, &constant.value, false));
    }

    match &analysis.skeleton {
        None => body.push("return null;".to_string()),
        Some(skeleton) => {
            body.push("return (".to_string());
            body.extend(emit_tag(skeleton));
            body.push(");".to_string());
        }
    }

    lines.extend(function_definition(&FunctionOptions {
        name: capitalize(&page.name),
        params: Vec::new(),
        arrow: false,
        is_async: false,
        export: ExportKind::Default,
        body,
    }));
    Ok(lines)
}
