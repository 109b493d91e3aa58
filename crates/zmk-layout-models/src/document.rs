//! The layout document: the canonical in-memory form of a keymap.

use crate::behaviors::{
    CapsWordBehavior, ComboBehavior, HoldTapBehavior, InputListener, MacroBehavior,
    ModMorphBehavior, StickyKeyBehavior, TapDanceBehavior,
};
use crate::binding::LayoutBinding;
use crate::error::LayoutError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A free-form kconfig item carried by the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigParameter {
    /// Kconfig option name, with or without the `CONFIG_` prefix.
    #[serde(alias = "param_name")]
    pub param_name: String,
    /// Option value.
    pub value: serde_json::Value,
}

impl ConfigParameter {
    /// Create a config parameter.
    pub fn new(param_name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            param_name: param_name.into(),
            value,
        }
    }
}

/// The canonical keymap document.
///
/// The dictionary form serializes with camelCase keys and accepts both
/// camelCase and snake_case on input; `None` fields are dropped on output.
/// Layers are parallel to `layer_names`: position `i` in `layers` belongs
/// to `layer_names[i]`, and position `j` within a layer is physical key
/// position `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    /// Keyboard identifier.
    pub keyboard: String,
    /// Human-readable layout title.
    pub title: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "firmware_api_version"
    )]
    pub firmware_api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "parent_uuid")]
    pub parent_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Template variables usable by an external template provider.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "base_version")]
    pub base_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "base_layout")]
    pub base_layout: Option<String>,

    /// Layer names, parallel to `layers`.
    #[serde(default, alias = "layer_names")]
    pub layer_names: Vec<String>,
    /// Per-layer binding arrays, one binding per key position.
    #[serde(default)]
    pub layers: Vec<Vec<LayoutBinding>>,

    /// Free-form kconfig items.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        alias = "config_parameters"
    )]
    pub config_parameters: Vec<ConfigParameter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "hold_taps")]
    pub hold_taps: Vec<HoldTapBehavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combos: Vec<ComboBehavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub macros: Vec<MacroBehavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "tap_dances")]
    pub tap_dances: Vec<TapDanceBehavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "sticky_keys")]
    pub sticky_keys: Vec<StickyKeyBehavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "caps_words")]
    pub caps_words: Vec<CapsWordBehavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "mod_morphs")]
    pub mod_morphs: Vec<ModMorphBehavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "input_listeners")]
    pub input_listeners: Vec<InputListener>,

    /// Verbatim DTSI emitted ahead of the generated behavior nodes.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "custom_defined_behaviors"
    )]
    pub custom_defined_behaviors: Option<String>,
    /// Verbatim DTSI emitted before the keymap node.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "custom_devicetree"
    )]
    pub custom_devicetree: Option<String>,
}

impl LayoutDocument {
    /// Create an empty document for a keyboard.
    pub fn new(keyboard: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            keyboard: keyboard.into(),
            title: title.into(),
            firmware_api_version: None,
            locale: None,
            uuid: None,
            parent_uuid: None,
            date: None,
            creator: None,
            notes: None,
            tags: Vec::new(),
            variables: IndexMap::new(),
            version: None,
            base_version: None,
            base_layout: None,
            layer_names: Vec::new(),
            layers: Vec::new(),
            config_parameters: Vec::new(),
            hold_taps: Vec::new(),
            combos: Vec::new(),
            macros: Vec::new(),
            tap_dances: Vec::new(),
            sticky_keys: Vec::new(),
            caps_words: Vec::new(),
            mod_morphs: Vec::new(),
            input_listeners: Vec::new(),
            custom_defined_behaviors: None,
            custom_devicetree: None,
        }
    }

    /// Serialize to the dictionary form.
    pub fn to_value(&self) -> Result<serde_json::Value, LayoutError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from the dictionary form (camelCase or snake_case keys).
    pub fn from_value(value: serde_json::Value) -> Result<Self, LayoutError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON text.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Index of a layer by name.
    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layer_names.iter().position(|n| n == name)
    }

    /// Names of every behavior defined in this document.
    pub fn behavior_names(&self) -> HashSet<&str> {
        let mut names: HashSet<&str> = HashSet::new();
        names.extend(self.hold_taps.iter().map(|b| b.name.as_str()));
        names.extend(self.macros.iter().map(|b| b.name.as_str()));
        names.extend(self.tap_dances.iter().map(|b| b.name.as_str()));
        names.extend(self.sticky_keys.iter().map(|b| b.name.as_str()));
        names.extend(self.caps_words.iter().map(|b| b.name.as_str()));
        names.extend(self.mod_morphs.iter().map(|b| b.name.as_str()));
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LayoutDocument {
        let mut doc = LayoutDocument::new("corne", "My Layout");
        doc.layer_names = vec!["base".into(), "nav".into()];
        doc.layers = vec![
            vec!["&kp A".parse().unwrap(), "&kp B".parse().unwrap()],
            vec!["&trans".parse().unwrap(), "&kp C".parse().unwrap()],
        ];
        doc.hold_taps = vec![HoldTapBehavior::new("hm")];
        doc
    }

    #[test]
    fn test_camel_case_keys_on_output() {
        let json = sample().to_value().unwrap();
        assert!(json.get("layerNames").is_some());
        assert!(json.get("holdTaps").is_some());
        assert!(json.get("layer_names").is_none());
        // None fields are dropped
        assert!(json.get("uuid").is_none());
    }

    #[test]
    fn test_snake_case_accepted_on_input() {
        let doc = LayoutDocument::from_value(serde_json::json!({
            "keyboard": "corne",
            "title": "t",
            "layer_names": ["base"],
            "layers": [[{"value": "&kp", "params": [{"value": "A"}]}]],
            "hold_taps": [{"name": "hm"}]
        }))
        .unwrap();
        assert_eq!(doc.layer_names, vec!["base"]);
        assert_eq!(doc.hold_taps.len(), 1);
        assert_eq!(doc.layers[0][0].to_string(), "&kp A");
    }

    #[test]
    fn test_dict_roundtrip() {
        let doc = sample();
        let value = doc.to_value().unwrap();
        let back = LayoutDocument::from_value(value).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = sample();
        let back = LayoutDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let result = LayoutDocument::from_value(serde_json::json!({"keyboard": "corne"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_layer_index() {
        let doc = sample();
        assert_eq!(doc.layer_index("nav"), Some(1));
        assert_eq!(doc.layer_index("missing"), None);
    }

    #[test]
    fn test_behavior_names() {
        let doc = sample();
        assert!(doc.behavior_names().contains("hm"));
    }
}
