//! Keymap node extraction: layers and their binding arrays.

use crate::bindings::bindings_from_cells;
use crate::defines::Defines;
use tracing::debug;
use zmk_layout_ast::{find_nodes_compatible, Diagnostic, DiagnosticKind, DtNode};
use zmk_layout_models::LayoutBinding;

/// The compatible string of the keymap node.
pub const COMPAT_KEYMAP: &str = "zmk,keymap";

/// Layers extracted from a keymap node, in source order.
#[derive(Debug, Clone, Default)]
pub struct ExtractedKeymap {
    /// Layer names taken from the child node names.
    pub layer_names: Vec<String>,
    /// One binding vector per layer, index-aligned with `layer_names`.
    pub layers: Vec<Vec<LayoutBinding>>,
}

/// Extract the keymap node, or `None` when the tree has none.
///
/// Each child of the keymap node is a layer; its `bindings` array is
/// reassembled into one binding per key position. Cells that cannot be
/// interpreted are reported as warnings and skipped.
pub fn extract_keymap(
    roots: &[DtNode],
    defines: &Defines,
    warnings: &mut Vec<Diagnostic>,
) -> Option<ExtractedKeymap> {
    let keymap_node = find_nodes_compatible(roots, COMPAT_KEYMAP).into_iter().next()?;

    let mut extracted = ExtractedKeymap::default();
    for layer_node in &keymap_node.children {
        let cells = layer_node
            .property("bindings")
            .and_then(|p| p.value.as_ref())
            .map(|v| v.cells())
            .unwrap_or_default();
        let (bindings, issues) = bindings_from_cells(&cells, defines);
        for issue in issues {
            warnings.push(Diagnostic::at(
                DiagnosticKind::Extract,
                format!("layer '{}': {issue}", layer_node.name),
                layer_node.line,
                layer_node.column,
            ));
        }
        extracted.layer_names.push(layer_node.name.clone());
        extracted.layers.push(bindings);
    }

    debug!(
        layers = extracted.layer_names.len(),
        "extracted keymap layers"
    );
    Some(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zmk_layout_lexer::lex;
    use zmk_layout_parser::parse;

    fn extract(source: &str) -> (Option<ExtractedKeymap>, Vec<Diagnostic>) {
        let tokens = lex(source).unwrap();
        let roots = parse(&tokens).unwrap();
        let defines = Defines::collect(&roots);
        let mut warnings = Vec::new();
        let extracted = extract_keymap(&roots, &defines, &mut warnings);
        (extracted, warnings)
    }

    #[test]
    fn test_minimal_keymap() {
        let source = r#"/ { keymap { compatible = "zmk,keymap"; default_layer { bindings = <&kp A &kp B>; }; }; };"#;
        let (extracted, warnings) = extract(source);
        let keymap = extracted.expect("keymap node");
        assert!(warnings.is_empty());
        assert_eq!(keymap.layer_names, vec!["default_layer"]);
        let formatted: Vec<String> = keymap.layers[0].iter().map(|b| b.to_string()).collect();
        assert_eq!(formatted, vec!["&kp A", "&kp B"]);
    }

    #[test]
    fn test_layer_order_follows_source() {
        let source = r#"
/ {
    keymap {
        compatible = "zmk,keymap";
        base { bindings = <&kp A>; };
        nav { bindings = <&trans>; };
        sym { bindings = <&kp B>; };
    };
};
"#;
        let (extracted, _) = extract(source);
        assert_eq!(
            extracted.unwrap().layer_names,
            vec!["base", "nav", "sym"]
        );
    }

    #[test]
    fn test_no_keymap_node() {
        let (extracted, warnings) = extract("/ { behaviors { }; };");
        assert!(extracted.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_layer_with_define_substitution() {
        let source = r#"
#define NAV 1
/ {
    keymap {
        compatible = "zmk,keymap";
        base { bindings = <&mo NAV &kp A>; };
    };
};
"#;
        let (extracted, _) = extract(source);
        let keymap = extracted.unwrap();
        assert_eq!(keymap.layers[0][0].to_string(), "&mo 1");
    }

    #[test]
    fn test_layer_without_bindings_is_empty_with_no_warning() {
        let source = r#"/ { keymap { compatible = "zmk,keymap"; empty_layer { }; }; };"#;
        let (extracted, warnings) = extract(source);
        let keymap = extracted.unwrap();
        assert_eq!(keymap.layer_names, vec!["empty_layer"]);
        assert!(keymap.layers[0].is_empty());
        assert!(warnings.is_empty());
    }
}
