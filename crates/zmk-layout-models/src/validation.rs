//! Document invariants.
//!
//! Validation accumulates every violation rather than stopping at the
//! first, so callers can present a complete report.

use crate::document::LayoutDocument;
use crate::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Keyboard-specific validation rules, supplied by the configuration
/// provider.
///
/// Empty rules (`ValidationRules::default()`) disable the profile-specific
/// checks: behavior roots and key positions are only checked against a
/// loaded profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Number of physical keys, bounding combo key positions.
    pub key_count: Option<usize>,
    /// Maximum number of layers the keyboard supports.
    pub max_layers: Option<usize>,
    /// Behavior codes (without `&`) that are built in.
    pub allowed_behaviors: Vec<String>,
    /// Explicit list of valid key positions, when non-contiguous.
    pub key_positions: Vec<u32>,
}

/// Whether a name is a valid C identifier.
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check every document invariant, collecting all violations.
pub fn validate(doc: &LayoutDocument, rules: &ValidationRules) -> Result<(), Vec<LayoutError>> {
    let mut errors = Vec::new();

    if doc.layer_names.len() != doc.layers.len() {
        errors.push(LayoutError::LayerCountMismatch {
            names: doc.layer_names.len(),
            layers: doc.layers.len(),
        });
    }

    let mut seen = HashSet::new();
    for name in &doc.layer_names {
        if !is_c_identifier(name) {
            errors.push(LayoutError::InvalidIdentifier { name: name.clone() });
        }
        if !seen.insert(name.as_str()) {
            errors.push(LayoutError::LayerAlreadyExists { name: name.clone() });
        }
    }

    if let Some(max_layers) = rules.max_layers {
        if doc.layer_names.len() > max_layers {
            errors.push(LayoutError::Invalid {
                message: format!(
                    "{} layers exceed the keyboard's limit of {max_layers}",
                    doc.layer_names.len()
                ),
            });
        }
    }

    validate_binding_roots(doc, rules, &mut errors);
    validate_combos(doc, rules, &mut errors);
    validate_behavior_arities(doc, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_binding_roots(
    doc: &LayoutDocument,
    rules: &ValidationRules,
    errors: &mut Vec<LayoutError>,
) {
    let user_defined = doc.behavior_names();
    for (layer_idx, layer) in doc.layers.iter().enumerate() {
        for (key_idx, binding) in layer.iter().enumerate() {
            if !binding.value.starts_with('&') {
                errors.push(LayoutError::InvalidBinding {
                    reason: format!(
                        "binding '{}' at layer {layer_idx} key {key_idx} must start with '&'",
                        binding.value
                    ),
                    position: 0,
                });
                continue;
            }
            if rules.allowed_behaviors.is_empty() {
                continue;
            }
            let root = binding.behavior();
            if !user_defined.contains(root)
                && !rules.allowed_behaviors.iter().any(|b| b == root)
            {
                errors.push(LayoutError::Invalid {
                    message: format!(
                        "unknown behavior '&{root}' at layer {layer_idx} key {key_idx}"
                    ),
                });
            }
        }
    }
}

fn validate_combos(doc: &LayoutDocument, rules: &ValidationRules, errors: &mut Vec<LayoutError>) {
    for combo in &doc.combos {
        for &position in &combo.key_positions {
            let in_range = match rules.key_count {
                Some(count) => (position as usize) < count,
                None => true,
            };
            let in_explicit_list =
                rules.key_positions.is_empty() || rules.key_positions.contains(&position);
            if !in_range || !in_explicit_list {
                errors.push(LayoutError::Invalid {
                    message: format!(
                        "combo '{}' references key position {position} outside the keyboard",
                        combo.name
                    ),
                });
            }
        }
        for &layer in &combo.layers {
            if layer >= doc.layer_names.len() {
                errors.push(LayoutError::IndexOutOfRange {
                    index: layer,
                    len: doc.layer_names.len(),
                });
            }
        }
    }
}

fn validate_behavior_arities(doc: &LayoutDocument, errors: &mut Vec<LayoutError>) {
    for ht in &doc.hold_taps {
        if ht.bindings.len() != 2 {
            errors.push(LayoutError::Invalid {
                message: format!(
                    "hold-tap '{}' must have exactly 2 bindings, found {}",
                    ht.name,
                    ht.bindings.len()
                ),
            });
        }
    }
    for mm in &doc.mod_morphs {
        if mm.bindings.len() != 2 {
            errors.push(LayoutError::Invalid {
                message: format!(
                    "mod-morph '{}' must have exactly 2 bindings, found {}",
                    mm.name,
                    mm.bindings.len()
                ),
            });
        }
    }
    for td in &doc.tap_dances {
        if td.bindings.len() < 2 || td.bindings.len() > 5 {
            errors.push(LayoutError::Invalid {
                message: format!(
                    "tap-dance '{}' must have 2 to 5 bindings, found {}",
                    td.name,
                    td.bindings.len()
                ),
            });
        }
    }
    for cw in &doc.caps_words {
        for entry in &cw.continue_list {
            if !is_c_identifier(entry) {
                errors.push(LayoutError::Invalid {
                    message: format!(
                        "caps-word '{}' continue list entry '{entry}' is not an identifier",
                        cw.name
                    ),
                });
            }
        }
    }
}
