//! Kconfig fragment generation.

use crate::error::GenerateError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use zmk_layout_models::LayoutDocument;

/// A kconfig setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KconfigValue {
    /// Boolean option, printed `y`/`n`.
    Bool(bool),
    /// Integer option.
    Int(i64),
    /// String option, printed quoted.
    Str(String),
}

impl KconfigValue {
    /// Convert a dictionary-form value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => KconfigValue::Bool(*b),
            serde_json::Value::Number(n) => KconfigValue::Int(n.as_i64().unwrap_or(0)),
            serde_json::Value::String(s) => KconfigValue::Str(s.clone()),
            other => KconfigValue::Str(other.to_string()),
        }
    }
}

impl fmt::Display for KconfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KconfigValue::Bool(true) => f.write_str("y"),
            KconfigValue::Bool(false) => f.write_str("n"),
            KconfigValue::Int(v) => write!(f, "{v}"),
            KconfigValue::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Normalize a kconfig option name: validate its characters and ensure
/// the `CONFIG_` prefix.
fn normalize_name(name: &str) -> Result<String, GenerateError> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(GenerateError::InvalidKconfigName {
            name: name.to_string(),
        });
    }
    if name.starts_with("CONFIG_") {
        Ok(name.to_string())
    } else {
        Ok(format!("CONFIG_{name}"))
    }
}

/// Generate the kconfig fragment: one `CONFIG_KEY=VALUE` line per
/// setting.
///
/// Settings start from the provider defaults and are overridden by the
/// document's `config_parameters`, in order. Returns the fragment text
/// together with the resolved settings map.
pub fn generate_kconfig(
    doc: &LayoutDocument,
    defaults: &IndexMap<String, KconfigValue>,
) -> Result<(String, IndexMap<String, KconfigValue>), GenerateError> {
    let mut settings = defaults.clone();
    for param in &doc.config_parameters {
        let name = normalize_name(&param.param_name)?;
        settings.insert(name, KconfigValue::from_json(&param.value));
    }

    let mut text = String::new();
    for (name, value) in &settings {
        text.push_str(&format!("{name}={value}\n"));
    }
    Ok((text, settings))
}
