//! Devicetree AST text emission.
//!
//! Renders a parsed node tree back to DTSI source. Output is deterministic
//! and whitespace-normalized: fixed indentation, one property or node per
//! line, comments dropped. Re-parsing formatted output yields a
//! structurally equal tree.

use crate::node::{DtConditional, DtNode, DtProperty, DtValue};

/// Format a forest of root nodes as DTSI text.
pub fn format_nodes(roots: &[DtNode], indent_size: usize) -> String {
    let mut out = String::new();
    for (i, node) in roots.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        format_node(node, 0, indent_size, &mut out);
    }
    out
}

fn indent(out: &mut String, depth: usize, indent_size: usize) {
    for _ in 0..depth * indent_size {
        out.push(' ');
    }
}

fn format_node(node: &DtNode, depth: usize, indent_size: usize, out: &mut String) {
    indent(out, depth, indent_size);
    if let Some(label) = &node.label {
        out.push_str(label);
        out.push_str(": ");
    }
    out.push_str(&node.name);
    if let Some(unit) = &node.unit_address {
        out.push('@');
        out.push_str(unit);
    }
    out.push_str(" {\n");

    for conditional in &node.conditionals {
        format_conditional(conditional, depth + 1, indent_size, out);
    }
    for property in &node.properties {
        format_property(property, depth + 1, indent_size, out);
    }
    for child in &node.children {
        format_node(child, depth + 1, indent_size, out);
    }

    indent(out, depth, indent_size);
    out.push_str("};\n");
}

fn format_conditional(
    conditional: &DtConditional,
    depth: usize,
    indent_size: usize,
    out: &mut String,
) {
    indent(out, depth, indent_size);
    out.push('#');
    out.push_str(&conditional.directive);
    if !conditional.condition.is_empty() {
        out.push(' ');
        out.push_str(&conditional.condition);
    }
    out.push('\n');
}

fn format_property(property: &DtProperty, depth: usize, indent_size: usize, out: &mut String) {
    indent(out, depth, indent_size);
    out.push_str(&property.name);
    if let Some(value) = &property.value {
        out.push_str(" = ");
        out.push_str(&format_value(value));
    }
    out.push_str(";\n");
}

/// Format a property value.
///
/// An array whose elements are themselves arrays or strings is a
/// multi-value property (`bindings = <&kp>, <&kp>;`) and joins its parts
/// with commas; devicetree arrays do not nest, so the two cases cannot
/// collide.
pub fn format_value(value: &DtValue) -> String {
    match value {
        DtValue::Array(items) if is_value_list(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        DtValue::Array(items) => {
            let cells: Vec<String> = items.iter().map(format_cell).collect();
            format!("<{}>", cells.join(" "))
        }
        other => format_cell(other),
    }
}

fn is_value_list(items: &[DtValue]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|v| matches!(v, DtValue::Array(_) | DtValue::String(_)))
}

fn format_cell(value: &DtValue) -> String {
    match value {
        DtValue::String(s) => format!("\"{}\"", escape_string(s)),
        DtValue::Integer(i) => i.to_string(),
        DtValue::Reference(name) => format!("&{name}"),
        DtValue::Boolean(b) => b.to_string(),
        DtValue::FunctionCall { name, args } => {
            let args: Vec<String> = args.iter().map(format_cell).collect();
            format!("{}({})", name, args.join(", "))
        }
        DtValue::Raw(text) => text.clone(),
        DtValue::Array(items) => {
            let cells: Vec<String> = items.iter().map(format_cell).collect();
            format!("<{}>", cells.join(" "))
        }
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_simple_node() {
        let mut node = DtNode::new("keymap", 1, 1);
        node.properties.push(DtProperty::new(
            "compatible",
            Some(DtValue::String("zmk,keymap".into())),
            1,
            1,
        ));
        let text = format_nodes(&[node], 4);
        assert_eq!(text, "keymap {\n    compatible = \"zmk,keymap\";\n};\n");
    }

    #[test]
    fn test_format_labeled_node_with_unit_address() {
        let mut node = DtNode::new("partition", 1, 1);
        node.label = Some("boot".into());
        node.unit_address = Some("0".into());
        let text = format_nodes(&[node], 4);
        assert_eq!(text, "boot: partition@0 {\n};\n");
    }

    #[test]
    fn test_format_cell_array() {
        let value = DtValue::Array(vec![
            DtValue::Reference("kp".into()),
            DtValue::Raw("A".into()),
            DtValue::Integer(3),
        ]);
        assert_eq!(format_value(&value), "<&kp A 3>");
    }

    #[test]
    fn test_format_multi_value_property() {
        let value = DtValue::Array(vec![
            DtValue::Array(vec![DtValue::Reference("kp".into())]),
            DtValue::Array(vec![DtValue::Reference("kp".into())]),
        ]);
        assert_eq!(format_value(&value), "<&kp>, <&kp>");
    }

    #[test]
    fn test_format_function_call_cell() {
        let value = DtValue::Array(vec![
            DtValue::Reference("kp".into()),
            DtValue::FunctionCall {
                name: "LC".into(),
                args: vec![DtValue::FunctionCall {
                    name: "LA".into(),
                    args: vec![DtValue::Raw("DEL".into())],
                }],
            },
        ]);
        assert_eq!(format_value(&value), "<&kp LC(LA(DEL))>");
    }

    #[test]
    fn test_format_boolean_property() {
        let mut node = DtNode::new("ht", 1, 1);
        node.properties
            .push(DtProperty::new("retro-tap", None, 1, 1));
        let text = format_nodes(&[node], 4);
        assert_eq!(text, "ht {\n    retro-tap;\n};\n");
    }

    #[test]
    fn test_escape_string_roundtrip_chars() {
        assert_eq!(escape_string("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }
}
