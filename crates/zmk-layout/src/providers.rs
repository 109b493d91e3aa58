//! External collaborator contracts.
//!
//! The core never depends on a concrete backend: keyboard profile data
//! comes through [`ConfigurationProvider`], template rendering through
//! [`TemplateProvider`], and logging goes through the `tracing` facade
//! (the subscriber is the external backend). Minimal default
//! implementations ship for standalone use.

use indexmap::IndexMap;
use thiserror::Error;
use zmk_layout_extract::ParseOptions;
use zmk_layout_gen::{FormatContext, KconfigValue};
use zmk_layout_models::ValidationRules;

/// Failure from an external provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Template rendering failed.
    #[error("template rendering failed: {message}")]
    Render {
        /// The backend's error description.
        message: String,
    },
}

/// A system-defined behavior known to the keyboard profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemBehavior {
    /// Behavior code without the `&` (`kp`, `mt`, `mo`, ...).
    pub name: String,
    /// Short description.
    pub description: String,
}

impl SystemBehavior {
    /// Create a system behavior entry.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Formatting preferences supplied by a keyboard profile.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattingOptions {
    /// Spaces per indentation level.
    pub indent_size: usize,
    /// Row layout hints (see [`FormatContext::rows`]).
    pub rows: Vec<String>,
    /// Gap between padded binding cells.
    pub key_gap: String,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            indent_size: 4,
            rows: Vec::new(),
            key_gap: " ".into(),
        }
    }
}

/// Keyboard profile configuration consumed by the core.
pub trait ConfigurationProvider {
    /// All system behaviors available for validation and template-aware
    /// classification.
    fn behavior_definitions(&self) -> Vec<SystemBehavior>;

    /// Include files required for ZMK compilation.
    fn include_files(&self) -> Vec<String>;

    /// Keyboard-specific validation rules.
    fn validation_rules(&self) -> ValidationRules;

    /// Context data for template processing during generation.
    fn template_context(&self) -> IndexMap<String, serde_json::Value>;

    /// Available kconfig options with their defaults.
    fn kconfig_options(&self) -> IndexMap<String, KconfigValue>;

    /// Formatting preferences for generated files.
    fn formatting_options(&self) -> FormattingOptions;
}

/// Template rendering backend.
pub trait TemplateProvider {
    /// Render a template with the given context.
    fn render(
        &self,
        template: &str,
        context: &IndexMap<String, serde_json::Value>,
    ) -> Result<String, ProviderError>;

    /// Whether content contains template syntax.
    fn has_template_syntax(&self, content: &str) -> bool;
}

/// Build a generation context from a provider.
pub fn format_context_from(provider: &dyn ConfigurationProvider) -> FormatContext {
    let options = provider.formatting_options();
    FormatContext {
        indent_size: options.indent_size,
        key_gap: options.key_gap,
        rows: options.rows,
        include_files: provider.include_files(),
        ..Default::default()
    }
}

/// Build processor options from a provider.
pub fn parse_options_from(
    provider: &dyn ConfigurationProvider,
    keyboard: impl Into<String>,
    title: impl Into<String>,
) -> ParseOptions {
    ParseOptions {
        keyboard: keyboard.into(),
        title: title.into(),
        system_behaviors: provider
            .behavior_definitions()
            .into_iter()
            .map(|b| b.name)
            .collect(),
        validation: provider.validation_rules(),
    }
}

/// Provider with no keyboard profile: empty rules, standard includes,
/// default formatting.
#[derive(Debug, Clone, Default)]
pub struct DefaultConfigurationProvider;

impl ConfigurationProvider for DefaultConfigurationProvider {
    fn behavior_definitions(&self) -> Vec<SystemBehavior> {
        Vec::new()
    }

    fn include_files(&self) -> Vec<String> {
        vec!["behaviors.dtsi".into(), "dt-bindings/zmk/keys.h".into()]
    }

    fn validation_rules(&self) -> ValidationRules {
        ValidationRules::default()
    }

    fn template_context(&self) -> IndexMap<String, serde_json::Value> {
        IndexMap::new()
    }

    fn kconfig_options(&self) -> IndexMap<String, KconfigValue> {
        IndexMap::new()
    }

    fn formatting_options(&self) -> FormattingOptions {
        FormattingOptions::default()
    }
}

/// Template provider doing simple `{{name}}` substitution.
#[derive(Debug, Clone, Default)]
pub struct PassthroughTemplateProvider;

impl TemplateProvider for PassthroughTemplateProvider {
    fn render(
        &self,
        template: &str,
        context: &IndexMap<String, serde_json::Value>,
    ) -> Result<String, ProviderError> {
        let mut out = template.to_string();
        for (key, value) in context {
            let replacement = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out = out.replace(&format!("{{{{{key}}}}}"), &replacement);
        }
        Ok(out)
    }

    fn has_template_syntax(&self, content: &str) -> bool {
        content.contains("{{") || content.contains("{%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provider() {
        let provider = DefaultConfigurationProvider;
        assert!(provider.behavior_definitions().is_empty());
        assert_eq!(provider.formatting_options().indent_size, 4);
        assert_eq!(provider.include_files().len(), 2);
    }

    #[test]
    fn test_format_context_from_provider() {
        let ctx = format_context_from(&DefaultConfigurationProvider);
        assert_eq!(ctx.indent_size, 4);
        assert_eq!(ctx.include_files, vec!["behaviors.dtsi", "dt-bindings/zmk/keys.h"]);
    }

    #[test]
    fn test_passthrough_template_render() {
        let provider = PassthroughTemplateProvider;
        let mut context = IndexMap::new();
        context.insert("name".to_string(), serde_json::json!("corne"));
        context.insert("count".to_string(), serde_json::json!(42));
        let out = provider
            .render("kb: {{name}}, keys: {{count}}", &context)
            .unwrap();
        assert_eq!(out, "kb: corne, keys: 42");
    }

    #[test]
    fn test_template_syntax_detection() {
        let provider = PassthroughTemplateProvider;
        assert!(provider.has_template_syntax("{{keymap_node}}"));
        assert!(provider.has_template_syntax("{% for l in layers %}"));
        assert!(!provider.has_template_syntax("/ { keymap { }; };"));
    }
}
