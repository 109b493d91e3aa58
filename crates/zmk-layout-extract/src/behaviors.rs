//! Behavior extraction from the devicetree AST.
//!
//! Each extractor is keyed by its `compatible` string and knows its
//! required and optional property set. A node that cannot be converted is
//! skipped with a warning; extraction only fails hard when the document as
//! a whole cannot be assembled (see the processor).

use crate::bindings::{bindings_from_cells, int_from_cell, single_binding_from_cells};
use crate::defines::Defines;
use tracing::warn;
use zmk_layout_ast::{find_nodes_compatible, find_nodes_where, Diagnostic, DiagnosticKind, DtNode, DtValue};
use zmk_layout_models::{
    CapsWordBehavior, ComboBehavior, HoldTapBehavior, InputListener, InputListenerNode,
    InputProcessor, MacroBehavior, ModMorphBehavior, StickyKeyBehavior, TapDanceBehavior,
};

/// Compatible strings for the behavior kinds with a fixed contract.
pub const COMPAT_HOLD_TAP: &str = "zmk,behavior-hold-tap";
pub const COMPAT_MACRO: &str = "zmk,behavior-macro";
pub const COMPAT_MACRO_ONE_PARAM: &str = "zmk,behavior-macro-one-param";
pub const COMPAT_MACRO_TWO_PARAM: &str = "zmk,behavior-macro-two-param";
pub const COMPAT_COMBOS: &str = "zmk,combos";
pub const COMPAT_TAP_DANCE: &str = "zmk,behavior-tap-dance";
pub const COMPAT_STICKY_KEY: &str = "zmk,behavior-sticky-key";
pub const COMPAT_CAPS_WORD: &str = "zmk,behavior-caps-word";
pub const COMPAT_MOD_MORPH: &str = "zmk,behavior-mod-morph";
pub const COMPAT_INPUT_LISTENER: &str = "zmk,input-listener";

/// Every behavior collection extracted from one tree.
#[derive(Debug, Clone, Default)]
pub struct ExtractedBehaviors {
    pub hold_taps: Vec<HoldTapBehavior>,
    pub combos: Vec<ComboBehavior>,
    pub macros: Vec<MacroBehavior>,
    pub tap_dances: Vec<TapDanceBehavior>,
    pub sticky_keys: Vec<StickyKeyBehavior>,
    pub caps_words: Vec<CapsWordBehavior>,
    pub mod_morphs: Vec<ModMorphBehavior>,
    pub input_listeners: Vec<InputListener>,
}

/// Extract every behavior kind, preserving source order within each kind.
///
/// `layer_names` is used to normalize combo layer references given by name
/// instead of index.
pub fn extract_behaviors(
    roots: &[DtNode],
    defines: &Defines,
    layer_names: &[String],
    warnings: &mut Vec<Diagnostic>,
) -> ExtractedBehaviors {
    let mut out = ExtractedBehaviors::default();

    for node in find_nodes_compatible(roots, COMPAT_HOLD_TAP) {
        collect(node, "hold-tap", hold_tap_from_node(node, defines), &mut out.hold_taps, warnings);
    }
    for (compatible, params) in [
        (COMPAT_MACRO, 0u8),
        (COMPAT_MACRO_ONE_PARAM, 1),
        (COMPAT_MACRO_TWO_PARAM, 2),
    ] {
        for node in find_nodes_compatible(roots, compatible) {
            collect(
                node,
                "macro",
                macro_from_node(node, defines, params),
                &mut out.macros,
                warnings,
            );
        }
    }
    for container in find_nodes_where(roots, |n| {
        n.name == "combos" || n.compatible() == Some(COMPAT_COMBOS)
    }) {
        for child in &container.children {
            collect(
                child,
                "combo",
                combo_from_node(child, defines, layer_names),
                &mut out.combos,
                warnings,
            );
        }
    }
    for node in find_nodes_compatible(roots, COMPAT_TAP_DANCE) {
        collect(
            node,
            "tap-dance",
            tap_dance_from_node(node, defines),
            &mut out.tap_dances,
            warnings,
        );
    }
    for node in find_nodes_compatible(roots, COMPAT_STICKY_KEY) {
        collect(
            node,
            "sticky-key",
            sticky_key_from_node(node, defines),
            &mut out.sticky_keys,
            warnings,
        );
    }
    for node in find_nodes_compatible(roots, COMPAT_CAPS_WORD) {
        collect(
            node,
            "caps-word",
            caps_word_from_node(node, defines),
            &mut out.caps_words,
            warnings,
        );
    }
    for node in find_nodes_compatible(roots, COMPAT_MOD_MORPH) {
        collect(
            node,
            "mod-morph",
            mod_morph_from_node(node, defines),
            &mut out.mod_morphs,
            warnings,
        );
    }
    for node in find_nodes_compatible(roots, COMPAT_INPUT_LISTENER) {
        collect(
            node,
            "input-listener",
            input_listener_from_node(node, defines),
            &mut out.input_listeners,
            warnings,
        );
    }

    out
}

/// Push a successfully converted record, or record a skip warning.
fn collect<T>(
    node: &DtNode,
    kind: &str,
    result: Result<T, String>,
    records: &mut Vec<T>,
    warnings: &mut Vec<Diagnostic>,
) {
    match result {
        Ok(record) => records.push(record),
        Err(reason) => {
            warn!(
                kind,
                node = node.reference_name(),
                reason = reason.as_str(),
                "skipping behavior node"
            );
            warnings.push(Diagnostic::at(
                DiagnosticKind::Extract,
                format!("skipping {kind} '{}': {reason}", node.reference_name()),
                node.line,
                node.column,
            ));
        }
    }
}

// === Property readers ===

fn prop_cells<'a>(node: &'a DtNode, name: &str) -> Vec<&'a DtValue> {
    node.property(name)
        .and_then(|p| p.value.as_ref())
        .map(|v| v.cells())
        .unwrap_or_default()
}

fn int_prop(node: &DtNode, name: &str, defines: &Defines) -> Option<i64> {
    prop_cells(node, name)
        .first()
        .and_then(|cell| int_from_cell(cell, defines))
}

fn string_prop(node: &DtNode, name: &str) -> Option<String> {
    node.property(name)
        .and_then(|p| p.value.as_ref())
        .and_then(|v| v.as_string())
        .map(str::to_string)
}

/// Read an integer array property; unresolvable cells fail the node.
fn int_array_prop(node: &DtNode, name: &str, defines: &Defines) -> Result<Vec<i64>, String> {
    prop_cells(node, name)
        .iter()
        .map(|cell| {
            int_from_cell(cell, defines)
                .ok_or_else(|| format!("cannot resolve cell {cell:?} in '{name}'"))
        })
        .collect()
}

fn u32_array_prop(node: &DtNode, name: &str, defines: &Defines) -> Result<Vec<u32>, String> {
    int_array_prop(node, name, defines)?
        .into_iter()
        .map(|v| u32::try_from(v).map_err(|_| format!("negative value {v} in '{name}'")))
        .collect()
}

fn node_bindings(node: &DtNode, defines: &Defines) -> Result<Vec<zmk_layout_models::LayoutBinding>, String> {
    let cells = prop_cells(node, "bindings");
    let (bindings, issues) = bindings_from_cells(&cells, defines);
    match issues.into_iter().next() {
        Some(issue) => Err(issue),
        None => Ok(bindings),
    }
}

// === Per-kind converters ===

fn hold_tap_from_node(node: &DtNode, defines: &Defines) -> Result<HoldTapBehavior, String> {
    let bindings = node_bindings(node, defines)?;
    if bindings.len() != 2 {
        return Err(format!("expected 2 bindings, found {}", bindings.len()));
    }
    let hold_trigger_key_positions = if node.property("hold-trigger-key-positions").is_some() {
        Some(u32_array_prop(node, "hold-trigger-key-positions", defines)?)
    } else {
        None
    };
    Ok(HoldTapBehavior {
        name: node.reference_name().to_string(),
        label: string_prop(node, "label"),
        binding_cells: int_prop(node, "#binding-cells", defines),
        tapping_term_ms: int_prop(node, "tapping-term-ms", defines),
        quick_tap_ms: int_prop(node, "quick-tap-ms", defines),
        require_prior_idle_ms: int_prop(node, "require-prior-idle-ms", defines),
        flavor: string_prop(node, "flavor"),
        bindings,
        hold_trigger_key_positions,
        hold_trigger_on_release: node.has_bool_property("hold-trigger-on-release"),
        retro_tap: node.has_bool_property("retro-tap"),
    })
}

fn macro_from_node(node: &DtNode, defines: &Defines, params: u8) -> Result<MacroBehavior, String> {
    Ok(MacroBehavior {
        name: node.reference_name().to_string(),
        label: string_prop(node, "label"),
        binding_cells: int_prop(node, "#binding-cells", defines),
        wait_ms: int_prop(node, "wait-ms", defines),
        tap_ms: int_prop(node, "tap-ms", defines),
        bindings: node_bindings(node, defines)?,
        params,
    })
}

fn combo_from_node(
    node: &DtNode,
    defines: &Defines,
    layer_names: &[String],
) -> Result<ComboBehavior, String> {
    let key_positions = u32_array_prop(node, "key-positions", defines)?;
    if key_positions.is_empty() {
        return Err("missing 'key-positions'".to_string());
    }
    let cells = prop_cells(node, "bindings");
    if cells.is_empty() {
        return Err("missing 'bindings'".to_string());
    }
    let bindings = single_binding_from_cells(&cells, defines)?;

    let mut layers = Vec::new();
    for cell in prop_cells(node, "layers") {
        layers.push(layer_index_from_cell(cell, defines, layer_names)?);
    }

    Ok(ComboBehavior {
        name: node.name.clone(),
        timeout_ms: int_prop(node, "timeout-ms", defines),
        key_positions,
        bindings,
        layers,
        require_prior_idle_ms: int_prop(node, "require-prior-idle-ms", defines),
    })
}

/// Resolve a combo/listener layer cell to an index.
///
/// Accepts integers, defined names, and layer names, which are normalized
/// to indices; emission always uses indices.
fn layer_index_from_cell(
    cell: &DtValue,
    defines: &Defines,
    layer_names: &[String],
) -> Result<usize, String> {
    if let Some(value) = int_from_cell(cell, defines) {
        return usize::try_from(value).map_err(|_| format!("negative layer index {value}"));
    }
    if let DtValue::Raw(ident) = cell {
        let resolved = defines.resolve(ident);
        if let Some(index) = layer_names.iter().position(|n| n == resolved) {
            return Ok(index);
        }
        return Err(format!("unknown layer '{ident}'"));
    }
    Err(format!("cannot interpret layer cell {cell:?}"))
}

fn tap_dance_from_node(node: &DtNode, defines: &Defines) -> Result<TapDanceBehavior, String> {
    let bindings = node_bindings(node, defines)?;
    if bindings.len() < 2 || bindings.len() > 5 {
        return Err(format!("expected 2 to 5 bindings, found {}", bindings.len()));
    }
    Ok(TapDanceBehavior {
        name: node.reference_name().to_string(),
        label: string_prop(node, "label"),
        tapping_term_ms: int_prop(node, "tapping-term-ms", defines),
        bindings,
    })
}

fn sticky_key_from_node(node: &DtNode, defines: &Defines) -> Result<StickyKeyBehavior, String> {
    let bindings = node_bindings(node, defines)?;
    if bindings.is_empty() {
        return Err("missing 'bindings'".to_string());
    }
    Ok(StickyKeyBehavior {
        name: node.reference_name().to_string(),
        label: string_prop(node, "label"),
        release_after_ms: int_prop(node, "release-after-ms", defines),
        quick_release: node.has_bool_property("quick-release"),
        lazy: node.has_bool_property("lazy"),
        ignore_modifiers: node.has_bool_property("ignore-modifiers"),
        bindings,
    })
}

fn caps_word_from_node(node: &DtNode, defines: &Defines) -> Result<CapsWordBehavior, String> {
    let mut continue_list = Vec::new();
    for cell in prop_cells(node, "continue-list") {
        match cell {
            DtValue::Raw(ident) => continue_list.push(ident.clone()),
            other => return Err(format!("cannot interpret continue-list cell {other:?}")),
        }
    }
    Ok(CapsWordBehavior {
        name: node.reference_name().to_string(),
        label: string_prop(node, "label"),
        continue_list,
        mods: int_prop(node, "mods", defines),
    })
}

fn mod_morph_from_node(node: &DtNode, defines: &Defines) -> Result<ModMorphBehavior, String> {
    let bindings = node_bindings(node, defines)?;
    if bindings.len() != 2 {
        return Err(format!("expected 2 bindings, found {}", bindings.len()));
    }
    let mods = int_prop(node, "mods", defines).ok_or("missing or unresolvable 'mods'")?;
    Ok(ModMorphBehavior {
        name: node.reference_name().to_string(),
        label: string_prop(node, "label"),
        bindings,
        mods,
        keep_mods: int_prop(node, "keep-mods", defines),
    })
}

fn input_listener_from_node(node: &DtNode, defines: &Defines) -> Result<InputListener, String> {
    let mut nodes = Vec::new();
    for child in &node.children {
        let mut layers = Vec::new();
        for cell in prop_cells(child, "layers") {
            match int_from_cell(cell, defines).and_then(|v| usize::try_from(v).ok()) {
                Some(index) => layers.push(index),
                None => return Err(format!("cannot resolve layer cell {cell:?}")),
            }
        }
        let processor_cells = prop_cells(child, "input-processors");
        let (processor_bindings, issues) = bindings_from_cells(&processor_cells, defines);
        if let Some(issue) = issues.into_iter().next() {
            return Err(issue);
        }
        let input_processors = processor_bindings
            .into_iter()
            .map(|b| InputProcessor {
                code: b.value,
                params: b.params.into_iter().map(|p| p.value).collect(),
            })
            .collect();
        nodes.push(InputListenerNode {
            code: child.name.clone(),
            description: string_prop(child, "description"),
            layers,
            input_processors,
        });
    }
    Ok(InputListener {
        code: format!("&{}", node.reference_name()),
        nodes,
    })
}
