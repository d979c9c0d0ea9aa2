//! Typed view over tree-sitter Java nodes
//!
//! The parser hands back an untyped syntax tree; everything downstream works
//! on a small tagged union dispatched by node kind, plus a handful of node
//! helpers for the call shapes the extractor recognizes. String literals are
//! decoded here, including text blocks with their incidental indentation
//! stripped, so extracted snippets match what the test author wrote.

use ast_grep_core::source::StrDoc;
use ast_grep_language::Java;

pub(crate) type JavaNode<'a> = ast_grep_core::Node<'a, StrDoc<Java>>;

/// A constructor-argument expression, reduced to what parameter capture
/// needs. Anything not recognized falls back to raw source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Decoded string literal
    Str(String),
    /// Numeric or boolean literal, kept verbatim
    Primitive(String),
    /// Character literal without its quotes
    Char(String),
    Null,
    Array(Vec<Expr>),
    /// Unrecognized expression as raw source text
    Raw(String),
}

impl Expr {
    pub fn from_node(node: &JavaNode) -> Expr {
        match &*node.kind() {
            "string_literal" | "text_block" => match string_literal_value(node) {
                Some(value) => Expr::Str(value),
                None => Expr::Raw(node.text().to_string()),
            },
            "null_literal" => Expr::Null,
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "hex_floating_point_literal"
            | "true"
            | "false" => Expr::Primitive(node.text().to_string()),
            "character_literal" => {
                let text = node.text();
                let inner = text
                    .strip_prefix('\'')
                    .and_then(|t| t.strip_suffix('\''))
                    .unwrap_or(&text);
                Expr::Char(unescape(inner))
            }
            "array_initializer" => {
                Expr::Array(named_children(node).iter().map(Expr::from_node).collect())
            }
            "array_creation_expression" => match node.field("value") {
                Some(init) => Expr::from_node(&init),
                None => Expr::Raw(node.text().to_string()),
            },
            _ => Expr::Raw(node.text().trim().to_string()),
        }
    }

    /// Render the expression as a captured parameter text
    pub fn render(&self) -> String {
        match self {
            Expr::Str(value) | Expr::Primitive(value) | Expr::Char(value) | Expr::Raw(value) => {
                value.clone()
            }
            Expr::Null => "null".to_string(),
            Expr::Array(elements) => {
                if elements.is_empty() {
                    "[]".to_string()
                } else {
                    let rendered: Vec<String> = elements.iter().map(Expr::render).collect();
                    format!("[ {} ]", rendered.join(", "))
                }
            }
        }
    }
}

/// Named children, with comments filtered out
pub(crate) fn named_children<'a>(node: &JavaNode<'a>) -> Vec<JavaNode<'a>> {
    node.children()
        .filter(|c| c.is_named() && !matches!(&*c.kind(), "line_comment" | "block_comment"))
        .collect()
}

/// The node and all its descendants in pre-order
pub(crate) fn subtree<'a>(node: &JavaNode<'a>) -> Vec<JavaNode<'a>> {
    let mut out = Vec::new();
    push_subtree(node.clone(), &mut out);
    out
}

fn push_subtree<'a>(node: JavaNode<'a>, out: &mut Vec<JavaNode<'a>>) {
    let children: Vec<JavaNode<'a>> = node.children().collect();
    out.push(node);
    for child in children {
        push_subtree(child, out);
    }
}

/// Simple name of a method invocation, e.g. `rewriteRun` for
/// `spec.rewriteRun(..)`
pub(crate) fn invocation_name(node: &JavaNode) -> Option<String> {
    if node.kind() != "method_invocation" {
        return None;
    }
    node.field("name").map(|n| n.text().to_string())
}

/// Argument nodes of a method invocation or constructor call
pub(crate) fn argument_nodes<'a>(node: &JavaNode<'a>) -> Vec<JavaNode<'a>> {
    node.field("arguments")
        .map(|args| named_children(&args))
        .unwrap_or_default()
}

pub(crate) fn is_lambda(node: &JavaNode) -> bool {
    node.kind() == "lambda_expression"
}

/// Number of parameters a lambda declares
pub(crate) fn lambda_param_count(node: &JavaNode) -> usize {
    match node.field("parameters") {
        Some(params) if params.kind() == "identifier" => 1,
        Some(params) => named_children(&params).len(),
        None => 0,
    }
}

/// Decoded value of a string literal or text block, `None` for any other
/// node kind
pub(crate) fn string_literal_value(node: &JavaNode) -> Option<String> {
    if !matches!(&*node.kind(), "string_literal" | "text_block") {
        return None;
    }
    let text = node.text();
    if let Some(inner) = text
        .strip_prefix("\"\"\"")
        .and_then(|t| t.strip_suffix("\"\"\""))
    {
        Some(decode_text_block(inner))
    } else {
        let inner = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(&text);
        Some(unescape(inner))
    }
}

/// Decode the body of a Java text block: drop the line containing the
/// opening delimiter, strip the common incidental indentation (the closing
/// delimiter's own indentation participates), strip per-line trailing white
/// space, then process escapes.
fn decode_text_block(inner: &str) -> String {
    // Content starts on the line after the opening delimiter
    let inner = match inner.find('\n') {
        Some(idx) => &inner[idx + 1..],
        None => inner,
    };

    let mut lines: Vec<&str> = inner.split('\n').collect();

    // A closing delimiter on its own line contributes its indentation and a
    // trailing newline; on a content line it contributes neither.
    let closing_indent = match lines.last() {
        Some(last) if last.chars().all(char::is_whitespace) => lines.pop().map(|l| l.len()),
        _ => None,
    };

    let min_indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .chain(closing_indent)
        .min()
        .unwrap_or(0);

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.trim().is_empty() {
            continue;
        }
        out.push_str(line[min_indent.min(line.len())..].trim_end());
    }
    if closing_indent.is_some() {
        out.push('\n');
    }
    unescape_text_block(&out)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('0') => out.push('\0'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn unescape_text_block(text: &str) -> String {
    // \s (explicit space) and line continuations exist only in text blocks
    let joined = text.replace("\\\n", "");
    unescape(&joined.replace("\\s", " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast_grep_core::AstGrep;

    fn first_expression(source: &str) -> AstGrep<StrDoc<Java>> {
        AstGrep::new(source, Java)
    }

    fn find_kind<'a>(root: &JavaNode<'a>, kind: &str) -> JavaNode<'a> {
        subtree(root)
            .into_iter()
            .find(|n| n.kind() == kind)
            .unwrap_or_else(|| panic!("no {kind} node"))
    }

    #[test]
    fn test_string_literal_decoding() {
        let sg = first_expression("class T { String s = \"a\\nb\\\"c\"; }");
        let node = find_kind(&sg.root(), "string_literal");
        assert_eq!(string_literal_value(&node).as_deref(), Some("a\nb\"c"));
    }

    #[test]
    fn test_text_block_strips_incidental_indentation() {
        let source = "class T { String s = \"\"\"\n              class A {\n              }\n              \"\"\"; }";
        let sg = first_expression(source);
        let root = sg.root();
        let node = subtree(&root)
            .into_iter()
            .find(|n| n.text().starts_with("\"\"\""))
            .unwrap();
        assert_eq!(
            string_literal_value(&node).as_deref(),
            Some("class A {\n}\n")
        );
    }

    #[test]
    fn test_text_block_keeps_relative_indentation() {
        let source =
            "class T { String s = \"\"\"\n    class A {\n        int x;\n    }\n    \"\"\"; }";
        let sg = first_expression(source);
        let root = sg.root();
        let node = subtree(&root)
            .into_iter()
            .find(|n| n.text().starts_with("\"\"\""))
            .unwrap();
        assert_eq!(
            string_literal_value(&node).as_deref(),
            Some("class A {\n    int x;\n}\n")
        );
    }

    #[test]
    fn test_expr_null_renders_as_null() {
        let sg = first_expression("class T { Object o = null; }");
        let node = find_kind(&sg.root(), "null_literal");
        assert_eq!(Expr::from_node(&node).render(), "null");
    }

    #[test]
    fn test_expr_array_renders_recursively() {
        let sg = first_expression("class T { String[] a = new String[] { \"x\", \"y\" }; }");
        let node = find_kind(&sg.root(), "array_initializer");
        assert_eq!(Expr::from_node(&node).render(), "[ x, y ]");
    }

    #[test]
    fn test_expr_primitive_verbatim() {
        let sg = first_expression("class T { int i = 42; boolean b = true; }");
        let root = sg.root();
        let int_node = find_kind(&root, "decimal_integer_literal");
        assert_eq!(Expr::from_node(&int_node).render(), "42");
        let bool_node = find_kind(&root, "true");
        assert_eq!(Expr::from_node(&bool_node).render(), "true");
    }

    #[test]
    fn test_expr_fallback_is_raw_text() {
        let sg = first_expression("class T { Object o = Duration.ofMinutes(5); }");
        let node = find_kind(&sg.root(), "method_invocation");
        assert_eq!(Expr::from_node(&node).render(), "Duration.ofMinutes(5)");
    }

    #[test]
    fn test_lambda_shape_helpers() {
        let sg = first_expression("class T { void m() { run(spec -> spec.path(\"x\")); } }");
        let node = find_kind(&sg.root(), "lambda_expression");
        assert!(is_lambda(&node));
        assert_eq!(lambda_param_count(&node), 1);
    }
}
