//! Typed behavior records.
//!
//! Each record mirrors one ZMK behavior node kind. Serialization uses the
//! camelCase dictionary form on output and accepts snake_case aliases on
//! input.

use crate::binding::{LayoutBinding, ParamValue};
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// A hold-tap behavior (`zmk,behavior-hold-tap`).
///
/// `bindings` always has exactly two entries: the hold behavior and the
/// tap behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldTapBehavior {
    /// Behavior name, used for the node label and `&name` references.
    pub name: String,
    /// Devicetree `label` property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// `#binding-cells` value.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "binding_cells")]
    pub binding_cells: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "tapping_term_ms")]
    pub tapping_term_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "quick_tap_ms")]
    pub quick_tap_ms: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "require_prior_idle_ms"
    )]
    pub require_prior_idle_ms: Option<i64>,
    /// Flavor string (`tap-preferred`, `hold-preferred`, `balanced`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    /// Hold and tap behaviors, exactly two.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<LayoutBinding>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "hold_trigger_key_positions"
    )]
    pub hold_trigger_key_positions: Option<Vec<u32>>,
    #[serde(
        default,
        skip_serializing_if = "is_false",
        alias = "hold_trigger_on_release"
    )]
    pub hold_trigger_on_release: bool,
    #[serde(default, skip_serializing_if = "is_false", alias = "retro_tap")]
    pub retro_tap: bool,
}

impl HoldTapBehavior {
    /// Create a hold-tap with the conventional defaults: a 200 ms tapping
    /// term and `&kp`/`&kp` bindings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            binding_cells: Some(2),
            tapping_term_ms: Some(200),
            quick_tap_ms: None,
            require_prior_idle_ms: None,
            flavor: None,
            bindings: vec![LayoutBinding::new("&kp"), LayoutBinding::new("&kp")],
            hold_trigger_key_positions: None,
            hold_trigger_on_release: false,
            retro_tap: false,
        }
    }

    /// Set the hold and tap bindings.
    pub fn with_bindings(mut self, hold: LayoutBinding, tap: LayoutBinding) -> Self {
        self.bindings = vec![hold, tap];
        self
    }

    /// Set the tapping term.
    pub fn with_tapping_term_ms(mut self, ms: i64) -> Self {
        self.tapping_term_ms = Some(ms);
        self
    }

    /// Set the flavor.
    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }

    /// Set the hold-trigger key positions.
    pub fn with_hold_trigger_key_positions(mut self, positions: Vec<u32>) -> Self {
        self.hold_trigger_key_positions = Some(positions);
        self
    }
}

/// A combo (`zmk,combos` child node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboBehavior {
    /// Combo node name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "timeout_ms")]
    pub timeout_ms: Option<i64>,
    /// Key positions that trigger the combo.
    #[serde(alias = "key_positions")]
    pub key_positions: Vec<u32>,
    /// The single binding the combo emits.
    pub bindings: LayoutBinding,
    /// Layer indices the combo is active on; empty means all layers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<usize>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "require_prior_idle_ms"
    )]
    pub require_prior_idle_ms: Option<i64>,
}

impl ComboBehavior {
    /// Create a combo with the conventional 50 ms timeout.
    pub fn new(name: impl Into<String>, key_positions: Vec<u32>, bindings: LayoutBinding) -> Self {
        Self {
            name: name.into(),
            timeout_ms: Some(50),
            key_positions,
            bindings,
            layers: Vec::new(),
            require_prior_idle_ms: None,
        }
    }

    /// Restrict the combo to the given layer indices.
    pub fn with_layers(mut self, layers: Vec<usize>) -> Self {
        self.layers = layers;
        self
    }

    /// Set the timeout.
    pub fn with_timeout_ms(mut self, ms: i64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }
}

/// A macro behavior (`zmk,behavior-macro`, `-one-param`, `-two-param`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroBehavior {
    /// Macro name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "binding_cells")]
    pub binding_cells: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "wait_ms")]
    pub wait_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "tap_ms")]
    pub tap_ms: Option<i64>,
    /// The scripted binding sequence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<LayoutBinding>,
    /// Number of macro parameters (0, 1 or 2), derived from the
    /// compatible string.
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub params: u8,
}

fn is_zero_u8(value: &u8) -> bool {
    *value == 0
}

impl MacroBehavior {
    /// Create an empty zero-parameter macro.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            binding_cells: Some(0),
            wait_ms: None,
            tap_ms: None,
            bindings: Vec::new(),
            params: 0,
        }
    }

    /// Set the binding sequence.
    pub fn with_bindings(mut self, bindings: Vec<LayoutBinding>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Set the inter-binding wait time.
    pub fn with_wait_ms(mut self, ms: i64) -> Self {
        self.wait_ms = Some(ms);
        self
    }

    /// Set the tap duration.
    pub fn with_tap_ms(mut self, ms: i64) -> Self {
        self.tap_ms = Some(ms);
        self
    }

    /// The compatible string for this macro's parameter count.
    pub fn compatible(&self) -> &'static str {
        match self.params {
            1 => "zmk,behavior-macro-one-param",
            2 => "zmk,behavior-macro-two-param",
            _ => "zmk,behavior-macro",
        }
    }
}

/// A tap-dance behavior (`zmk,behavior-tap-dance`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TapDanceBehavior {
    /// Behavior name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "tapping_term_ms")]
    pub tapping_term_ms: Option<i64>,
    /// Per-tap bindings, between two and five.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<LayoutBinding>,
}

impl TapDanceBehavior {
    /// Create a tap-dance over the given bindings.
    pub fn new(name: impl Into<String>, bindings: Vec<LayoutBinding>) -> Self {
        Self {
            name: name.into(),
            label: None,
            tapping_term_ms: Some(200),
            bindings,
        }
    }
}

/// A sticky-key behavior (`zmk,behavior-sticky-key`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyKeyBehavior {
    /// Behavior name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "release_after_ms")]
    pub release_after_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false", alias = "quick_release")]
    pub quick_release: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub lazy: bool,
    #[serde(default, skip_serializing_if = "is_false", alias = "ignore_modifiers")]
    pub ignore_modifiers: bool,
    /// The wrapped behavior, a single entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<LayoutBinding>,
}

impl StickyKeyBehavior {
    /// Create a sticky key wrapping one behavior.
    pub fn new(name: impl Into<String>, binding: LayoutBinding) -> Self {
        Self {
            name: name.into(),
            label: None,
            release_after_ms: None,
            quick_release: false,
            lazy: false,
            ignore_modifiers: false,
            bindings: vec![binding],
        }
    }
}

/// A caps-word behavior (`zmk,behavior-caps-word`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsWordBehavior {
    /// Behavior name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Keycodes that continue the caps word.
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "continue_list")]
    pub continue_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mods: Option<i64>,
}

impl CapsWordBehavior {
    /// Create a caps word with an empty continue list.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            continue_list: Vec::new(),
            mods: None,
        }
    }
}

/// A mod-morph behavior (`zmk,behavior-mod-morph`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModMorphBehavior {
    /// Behavior name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Default and morphed behaviors, exactly two.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<LayoutBinding>,
    /// Modifier mask that triggers the morph.
    #[serde(default)]
    pub mods: i64,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "keep_mods")]
    pub keep_mods: Option<i64>,
}

impl ModMorphBehavior {
    /// Create a mod-morph between two behaviors.
    pub fn new(
        name: impl Into<String>,
        default: LayoutBinding,
        morphed: LayoutBinding,
        mods: i64,
    ) -> Self {
        Self {
            name: name.into(),
            label: None,
            bindings: vec![default, morphed],
            mods,
            keep_mods: None,
        }
    }
}

/// An input processor applied by an input listener node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputProcessor {
    /// Processor reference (`&zip_xy_scaler`).
    pub code: String,
    /// Processor parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamValue>,
}

/// A child node of an input listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputListenerNode {
    /// Node name.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Layer indices this node is active on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "input_processors")]
    pub input_processors: Vec<InputProcessor>,
}

/// An input listener (`zmk,input-listener`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputListener {
    /// The listener node name (`&trackball_listener`).
    pub code: String,
    /// Listener child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<InputListenerNode>,
}
