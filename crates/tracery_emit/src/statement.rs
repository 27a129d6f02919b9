//! Statement-level emission primitives.
//!
//! Each function is a pure mapping from a configuration record to source
//! text. Nothing here knows about pages or components; the code generator
//! layers that on top.

use tracery_schema::ImportKind;

use crate::error::EmitError;

/// Configuration for one import statement.
#[derive(Debug, Clone)]
pub struct ImportOptions<'a> {
    pub kind: ImportKind,
    pub names: &'a [String],
    pub path: &'a str,
    /// Terminate with a semicolon. On unless explicitly configured off.
    pub semicolon: bool,
}

/// Render a single import line.
///
/// Paths are always single-quoted. A missing path or an empty name list is
/// an emission configuration error.
pub fn import_statement(options: &ImportOptions<'_>) -> Result<String, EmitError> {
    if options.path.is_empty() {
        return Err(EmitError::MissingImportPath);
    }
    if options.names.is_empty() {
        return Err(EmitError::NoImportNames);
    }
    let terminator = if options.semicolon { ";" } else { "" };
    let line = match options.kind {
        ImportKind::Named => format!(
            "import {{ {} }} from '{}'{}",
            options.names.join(", "),
            options.path,
            terminator
        ),
        ImportKind::Wildcard => format!(
            "import * as {} from '{}'{}",
            options.names[0], options.path, terminator
        ),
        ImportKind::Default => format!(
            "import {} from '{}'{}",
            options.names[0], options.path, terminator
        ),
    };
    Ok(line)
}

/// Join a package name with an optional in-package path.
///
/// `("antd", Some("es/Table"))` and `("antd", Some("/es/Table"))` both give
/// `antd/es/Table`; a bare `/` or empty relative path leaves the package
/// name untouched.
pub fn join_import_path(package: &str, relative: Option<&str>) -> String {
    let mut path = package.to_string();
    if let Some(rel) = relative {
        if !rel.is_empty() && rel != "/" {
            if !rel.starts_with('/') {
                path.push('/');
            }
            path.push_str(rel);
        }
    }
    path
}

/// Prefix a multi-line expression with a `const` (or `let`) binding and
/// terminate it.
pub fn assignment(name: &str, expression: &[String], mutable: bool) -> Vec<String> {
    let keyword = if mutable { "let" } else { "const" };
    let Some((first, rest)) = expression.split_first() else {
        return vec![format!("{keyword} {name} = undefined;")];
    };
    let mut lines = Vec::with_capacity(expression.len());
    lines.push(format!("{keyword} {name} = {first}"));
    lines.extend(rest.iter().cloned());
    if let Some(last) = lines.last_mut() {
        last.push(';');
    }
    lines
}

/// `name(arg, arg, ...)`.
pub fn call_expression(name: &str, args: &[String]) -> String {
    format!("{}({})", name, args.join(", "))
}

/// How a function definition is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportKind {
    #[default]
    None,
    Named,
    Default,
}

/// Configuration for one function definition block.
#[derive(Debug, Clone, Default)]
pub struct FunctionOptions {
    pub name: String,
    pub params: Vec<String>,
    pub arrow: bool,
    pub is_async: bool,
    pub export: ExportKind,
    pub body: Vec<String>,
}

/// Render a function definition: signature line, body lines, closing brace.
pub fn function_definition(options: &FunctionOptions) -> Vec<String> {
    let params = options.params.join(", ");
    let prefix = if options.is_async { "async " } else { "" };
    let signature = if options.arrow {
        let arrow = format!("{prefix}({params}) => {{");
        // A default export cannot carry a binding, so the name is dropped.
        if options.name.is_empty() || options.export == ExportKind::Default {
            arrow
        } else {
            format!("const {} = {arrow}", options.name)
        }
    } else if options.name.is_empty() {
        format!("{prefix}function ({params}) {{")
    } else {
        format!("{prefix}function {}({params}) {{", options.name)
    };
    let signature = match options.export {
        ExportKind::None => signature,
        ExportKind::Named => format!("export {signature}"),
        ExportKind::Default => format!("export default {signature}"),
    };

    let mut lines = Vec::with_capacity(options.body.len() + 2);
    lines.push(signature);
    lines.extend(options.body.iter().cloned());
    lines.push("}".to_string());
    lines
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
