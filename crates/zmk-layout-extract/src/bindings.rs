//! Reassembly of devicetree binding cells into structured bindings.
//!
//! A `bindings` property is a flat stream of cells: references open a new
//! binding, and the identifier/number/call cells that follow become its
//! parameters. Arity is not assumed — the next reference closes the
//! previous binding.

use crate::defines::{parse_int, Defines};
use zmk_layout_ast::DtValue;
use zmk_layout_models::{LayoutBinding, LayoutParam};

/// Reassemble a cell stream into bindings.
///
/// Returns the bindings plus descriptions of any cells that could not be
/// interpreted (the caller reports them as warnings).
pub fn bindings_from_cells(cells: &[&DtValue], defines: &Defines) -> (Vec<LayoutBinding>, Vec<String>) {
    let mut bindings: Vec<LayoutBinding> = Vec::new();
    let mut issues = Vec::new();

    for cell in cells {
        match cell {
            DtValue::Reference(name) => bindings.push(LayoutBinding::new(format!("&{name}"))),
            other => match bindings.last_mut() {
                Some(current) => match param_from_value(other, defines) {
                    Some(param) => current.params.push(param),
                    None => issues.push(format!(
                        "cannot interpret cell {other:?} as a binding parameter"
                    )),
                },
                None => issues.push(format!("parameter cell {other:?} before any binding")),
            },
        }
    }
    (bindings, issues)
}

/// Reassemble a cell stream that must contain exactly one binding.
pub fn single_binding_from_cells(
    cells: &[&DtValue],
    defines: &Defines,
) -> Result<LayoutBinding, String> {
    let (mut bindings, issues) = bindings_from_cells(cells, defines);
    if let Some(issue) = issues.into_iter().next() {
        return Err(issue);
    }
    match bindings.len() {
        1 => Ok(bindings.remove(0)),
        n => Err(format!("expected exactly one binding, found {n}")),
    }
}

/// Convert a parameter cell, applying one-level define substitution to
/// identifiers.
pub fn param_from_value(value: &DtValue, defines: &Defines) -> Option<LayoutParam> {
    match value {
        DtValue::Integer(i) => Some(LayoutParam::number(*i)),
        DtValue::Raw(ident) => {
            let resolved = defines.resolve(ident);
            Some(match parse_int(resolved) {
                Some(n) => LayoutParam::number(n),
                None => LayoutParam::keyword(resolved),
            })
        }
        DtValue::FunctionCall { name, args } => {
            let params: Vec<LayoutParam> = args
                .iter()
                .map(|arg| param_from_value(arg, defines))
                .collect::<Option<Vec<_>>>()?;
            Some(LayoutParam::nested(name.clone(), params))
        }
        _ => None,
    }
}

/// Resolve an integer-valued cell, applying define substitution.
pub fn int_from_cell(value: &DtValue, defines: &Defines) -> Option<i64> {
    match value {
        DtValue::Integer(i) => Some(*i),
        DtValue::Raw(ident) => defines.resolve_int(ident),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zmk_layout_ast::DtValue;

    fn cells(values: &[DtValue]) -> Vec<&DtValue> {
        values.iter().collect()
    }

    #[test]
    fn test_reassembles_by_reference_boundaries() {
        let values = vec![
            DtValue::Reference("kp".into()),
            DtValue::Raw("A".into()),
            DtValue::Reference("mt".into()),
            DtValue::Raw("LCTRL".into()),
            DtValue::Raw("ESC".into()),
            DtValue::Reference("trans".into()),
        ];
        let (bindings, issues) = bindings_from_cells(&cells(&values), &Defines::default());
        assert!(issues.is_empty());
        let formatted: Vec<String> = bindings.iter().map(|b| b.to_string()).collect();
        assert_eq!(formatted, vec!["&kp A", "&mt LCTRL ESC", "&trans"]);
    }

    #[test]
    fn test_nested_call_parameters() {
        let values = vec![
            DtValue::Reference("kp".into()),
            DtValue::FunctionCall {
                name: "LC".into(),
                args: vec![DtValue::FunctionCall {
                    name: "LA".into(),
                    args: vec![DtValue::Raw("DEL".into())],
                }],
            },
        ];
        let (bindings, issues) = bindings_from_cells(&cells(&values), &Defines::default());
        assert!(issues.is_empty());
        assert_eq!(bindings[0].to_string(), "&kp LC(LA(DEL))");
    }

    #[test]
    fn test_numeric_parameters() {
        let values = vec![DtValue::Reference("mo".into()), DtValue::Integer(2)];
        let (bindings, _) = bindings_from_cells(&cells(&values), &Defines::default());
        assert_eq!(bindings[0].params, vec![LayoutParam::number(2)]);
    }

    #[test]
    fn test_parameter_before_binding_is_reported() {
        let values = vec![DtValue::Raw("A".into()), DtValue::Reference("kp".into())];
        let (bindings, issues) = bindings_from_cells(&cells(&values), &Defines::default());
        assert_eq!(bindings.len(), 1);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_single_binding() {
        let values = vec![DtValue::Reference("kp".into()), DtValue::Raw("ESC".into())];
        let binding = single_binding_from_cells(&cells(&values), &Defines::default()).unwrap();
        assert_eq!(binding.to_string(), "&kp ESC");

        let two = vec![
            DtValue::Reference("kp".into()),
            DtValue::Reference("kp".into()),
        ];
        assert!(single_binding_from_cells(&cells(&two), &Defines::default()).is_err());
    }

    #[test]
    fn test_param_value_kinds() {
        let defines = Defines::default();
        assert_eq!(
            param_from_value(&DtValue::Raw("7".into()), &defines),
            Some(LayoutParam::number(7))
        );
        assert_eq!(
            param_from_value(&DtValue::Raw("TAB".into()), &defines),
            Some(LayoutParam::keyword("TAB"))
        );
        assert_eq!(param_from_value(&DtValue::String("x".into()), &defines), None);
    }
}
