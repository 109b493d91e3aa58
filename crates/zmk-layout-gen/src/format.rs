//! Formatting context for DTSI emission.

use serde::{Deserialize, Serialize};

/// Compatible strings used for emitted behavior nodes.
///
/// The defaults match the upstream ZMK bindings; a keyboard profile can
/// override them through its formatting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibleStrings {
    pub keymap: String,
    pub hold_tap: String,
    pub tap_dance: String,
    pub combos: String,
    pub sticky_key: String,
    pub caps_word: String,
    pub mod_morph: String,
}

impl Default for CompatibleStrings {
    fn default() -> Self {
        Self {
            keymap: "zmk,keymap".into(),
            hold_tap: "zmk,behavior-hold-tap".into(),
            tap_dance: "zmk,behavior-tap-dance".into(),
            combos: "zmk,combos".into(),
            sticky_key: "zmk,behavior-sticky-key".into(),
            caps_word: "zmk,behavior-caps-word".into(),
            mod_morph: "zmk,behavior-mod-morph".into(),
        }
    }
}

/// Deterministic formatting parameters for generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatContext {
    /// Spaces per indentation level.
    pub indent_size: usize,
    /// Minimum gap appended after each padded binding cell.
    pub key_gap: String,
    /// Row layout hints: each entry lists the key-position indices of one
    /// physical row, whitespace-separated (`"0 1 2 3"`).
    pub rows: Vec<String>,
    /// `#include` files emitted at the top of a full keymap.
    pub include_files: Vec<String>,
    /// Compatible strings for emitted nodes.
    pub compatible: CompatibleStrings,
}

impl Default for FormatContext {
    fn default() -> Self {
        Self {
            indent_size: 4,
            key_gap: " ".into(),
            rows: Vec::new(),
            include_files: vec!["behaviors.dtsi".into(), "dt-bindings/zmk/keys.h".into()],
            compatible: CompatibleStrings::default(),
        }
    }
}

impl FormatContext {
    /// Indentation string for a nesting level.
    pub fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_size * level)
    }

    /// Partition key positions into display rows.
    ///
    /// Follows the row hints where they name valid positions; positions
    /// not covered by any hint land in a final overflow row. Without
    /// hints, all positions form a single row.
    pub fn row_partition(&self, key_count: usize) -> Vec<Vec<usize>> {
        let mut rows: Vec<Vec<usize>> = Vec::new();
        let mut used = vec![false; key_count];

        for hint in &self.rows {
            let row: Vec<usize> = hint
                .split_whitespace()
                .filter_map(|token| token.parse::<usize>().ok())
                .filter(|&index| index < key_count && !used[index])
                .collect();
            for &index in &row {
                used[index] = true;
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }

        let leftover: Vec<usize> = (0..key_count).filter(|&i| !used[i]).collect();
        if !leftover.is_empty() {
            rows.push(leftover);
        }
        rows
    }
}
