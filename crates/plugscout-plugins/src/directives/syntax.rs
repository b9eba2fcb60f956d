//! Go parsing and lookup of the directive declaration.

use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use super::literal::unquote;
use crate::error::{PluginError, PluginResult};

/// Composite literal types accepted for the directive list.
const ARRAY_TYPES: &[&str] = &["slice_type", "array_type", "implicit_length_array_type"];

/// Parse Go source, failing on any syntax error.
pub(crate) fn parse(path: &Path, source: &str) -> PluginResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| PluginError::Language(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| PluginError::Language("parser produced no tree".to_string()))?;

    if let Some(bad) = first_error(tree.root_node()) {
        let pos = bad.start_position();
        return Err(PluginError::Syntax {
            path: path.to_path_buf(),
            line: pos.row.saturating_add(1),
            column: pos.column.saturating_add(1),
        });
    }
    Ok(tree)
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Some(root)
}

/// Elements of the array literal bound to the top-level `declaration`.
///
/// `literal_element` wrappers are unwrapped, so string elements come back
/// as literal nodes and keyed elements as `keyed_element`.
pub(crate) fn directive_elements<'t>(
    root: Node<'t>,
    source: &[u8],
    declaration: &str,
) -> PluginResult<Vec<Node<'t>>> {
    let spec = find_value_spec(root, source, declaration)?;
    let value = first_value(spec).ok_or_else(|| {
        PluginError::shape(format!("declaration `{declaration}` has no value"))
    })?;

    if value.kind() != "composite_literal" {
        return Err(PluginError::shape(format!(
            "`{declaration}` must be a composite literal, found {}",
            value.kind()
        )));
    }
    let literal_type = value
        .child_by_field_name("type")
        .map_or("untyped literal", |t| t.kind());
    if !ARRAY_TYPES.contains(&literal_type) {
        return Err(PluginError::shape(format!(
            "`{declaration}` must be an array or slice literal, found {literal_type}"
        )));
    }
    let body = value.child_by_field_name("body").ok_or_else(|| {
        PluginError::shape(format!("`{declaration}` literal has no element list"))
    })?;

    let mut cursor = body.walk();
    let elements = body
        .named_children(&mut cursor)
        .filter(|n| !n.is_extra())
        .map(unwrap_element)
        .collect();
    Ok(elements)
}

/// Decode a directive element into its string value.
pub(crate) fn directive_name(element: Node<'_>, source: &[u8]) -> PluginResult<String> {
    match element.kind() {
        "interpreted_string_literal" | "raw_string_literal" | "rune_literal" | "int_literal"
        | "float_literal" | "imaginary_literal" => {
            let raw = element
                .utf8_text(source)
                .map_err(|e| PluginError::Unquote {
                    literal: String::new(),
                    message: e.to_string(),
                })?;
            unquote(raw).map_err(|message| PluginError::Unquote {
                literal: raw.to_string(),
                message,
            })
        },
        other => Err(PluginError::shape(format!(
            "element on line {} is {other}, not a basic literal",
            element.start_position().row.saturating_add(1)
        ))),
    }
}

fn find_value_spec<'t>(root: Node<'t>, source: &[u8], name: &str) -> PluginResult<Node<'t>> {
    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        match decl.kind() {
            "var_declaration" | "const_declaration" => {
                if let Some(spec) = value_specs(decl)
                    .into_iter()
                    .find(|spec| declares(*spec, source, name))
                {
                    return Ok(spec);
                }
            },
            "function_declaration" if field_is(decl, "name", source, name) => {
                return Err(PluginError::shape(format!(
                    "`{name}` is a function, not a value declaration"
                )));
            },
            "type_declaration" => {
                let mut inner = decl.walk();
                if decl
                    .named_children(&mut inner)
                    .any(|spec| field_is(spec, "name", source, name))
                {
                    return Err(PluginError::shape(format!(
                        "`{name}` is a type, not a value declaration"
                    )));
                }
            },
            _ => {},
        }
    }
    Err(PluginError::shape(format!(
        "top-level declaration `{name}` not found"
    )))
}

/// `var_spec`/`const_spec` nodes of a declaration, including grouped ones.
fn value_specs(decl: Node<'_>) -> Vec<Node<'_>> {
    let mut specs = Vec::new();
    let mut stack = vec![decl];
    while let Some(node) = stack.pop() {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            match child.kind() {
                "var_spec" | "const_spec" => specs.push(child),
                kind if kind.ends_with("_spec_list") => stack.push(child),
                _ => {},
            }
        }
    }
    specs.reverse();
    specs
}

fn declares(spec: Node<'_>, source: &[u8], name: &str) -> bool {
    let mut cursor = spec.walk();
    spec.children_by_field_name("name", &mut cursor)
        .any(|ident| ident.utf8_text(source).is_ok_and(|text| text == name))
}

fn field_is(node: Node<'_>, field: &str, source: &[u8], expected: &str) -> bool {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source).ok())
        .is_some_and(|text| text == expected)
}

fn first_value(spec: Node<'_>) -> Option<Node<'_>> {
    let value = spec.child_by_field_name("value")?;
    if value.kind() != "expression_list" {
        return Some(value);
    }
    let mut cursor = value.walk();
    value.named_children(&mut cursor).find(|n| !n.is_extra())
}

fn unwrap_element(node: Node<'_>) -> Node<'_> {
    if node.kind() != "literal_element" {
        return node;
    }
    let mut cursor = node.walk();
    let inner = node.named_children(&mut cursor).find(|n| !n.is_extra());
    inner.unwrap_or(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements_of(src: &str) -> PluginResult<Vec<String>> {
        let tree = parse(Path::new("plugin.go"), src)?;
        let elements = directive_elements(tree.root_node(), src.as_bytes(), "directives")?;
        elements
            .into_iter()
            .map(|e| directive_name(e, src.as_bytes()))
            .collect()
    }

    #[test]
    fn finds_grouped_var_declaration() {
        let src = r#"package httpserver

var (
	other = 1
	directives = []string{"root", "bind"}
)
"#;
        assert_eq!(elements_of(src).unwrap(), vec!["root", "bind"]);
    }

    #[test]
    fn accepts_array_literals() {
        let src = "package p\n\nvar directives = [...]string{\"a\", `b`}\n";
        assert_eq!(elements_of(src).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn map_literal_is_a_shape_error() {
        let src = "package p\n\nvar directives = map[string]string{\"a\": \"b\"}\n";
        let err = elements_of(src).unwrap_err();
        assert!(matches!(err, PluginError::Shape { .. }), "{err}");
    }

    #[test]
    fn function_named_directives_is_a_shape_error() {
        let src = "package p\n\nfunc directives() []string { return nil }\n";
        assert!(matches!(
            elements_of(src).unwrap_err(),
            PluginError::Shape { .. }
        ));
    }

    #[test]
    fn value_less_declaration_is_a_shape_error() {
        let src = "package p\n\nvar directives []string\n";
        assert!(matches!(
            elements_of(src).unwrap_err(),
            PluginError::Shape { .. }
        ));
    }

    #[test]
    fn non_literal_value_is_a_shape_error() {
        let src = "package p\n\nvar directives = loadDirectives()\n";
        assert!(matches!(
            elements_of(src).unwrap_err(),
            PluginError::Shape { .. }
        ));
    }

    #[test]
    fn syntax_errors_report_position() {
        let src = "package p\n\nvar directives = []string{\"a\",\n";
        let err = parse(Path::new("plugin.go"), src).unwrap_err();
        assert!(matches!(err, PluginError::Syntax { .. }), "{err}");
    }
}
