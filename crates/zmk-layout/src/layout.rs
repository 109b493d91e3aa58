//! The fluent `Layout` surface.
//!
//! A `Layout` wraps a [`LayoutDocument`] and exposes the mutation,
//! parsing, validation and export operations. The document is logically
//! immutable: every mutating operation returns a new `Layout` value.

use crate::behaviors::BehaviorOps;
use crate::layers::{LayerEditor, LayerOps};
use crate::providers::{
    format_context_from, parse_options_from, ConfigurationProvider, ProviderError,
    TemplateProvider,
};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;
use zmk_layout_extract::{KeymapProcessor, ParseResult, ParsingMode};
use zmk_layout_gen::{
    generate_behaviors_dtsi, generate_combos_dtsi, generate_kconfig, generate_keymap,
    generate_keymap_node, generate_layer_defines, generate_macros_dtsi, generate_tap_dances_dtsi,
    FormatContext, GenerateError, KconfigValue,
};
use zmk_layout_models::{validate, LayoutDocument, LayoutError, ValidationRules};

/// Failure during keymap or config export.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// DTSI or kconfig emission failed.
    #[error(transparent)]
    Generate(#[from] GenerateError),
    /// The template backend failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// A keymap layout with a fluent, immutable mutation surface.
///
/// ```
/// use zmk_layout::Layout;
///
/// let layout = Layout::create_empty("corne", "My Layout");
/// let layout = layout.layers().add("base").unwrap();
/// let layout = layout
///     .layer("base")
///     .unwrap()
///     .set(0, "&kp ESC".parse().unwrap())
///     .pad_to(42)
///     .finish();
/// assert_eq!(layout.layers().count(), 1);
/// assert_eq!(layout.document().layers[0].len(), 42);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    document: LayoutDocument,
}

impl Layout {
    /// Wrap an existing document.
    pub fn new(document: LayoutDocument) -> Self {
        Self { document }
    }

    /// Create an empty layout for a keyboard.
    pub fn create_empty(keyboard: &str, title: &str) -> Self {
        let title = if title.is_empty() {
            format!("New {keyboard} Layout")
        } else {
            title.to_string()
        };
        Self::new(LayoutDocument::new(keyboard, title))
    }

    /// Build a layout from the dictionary form.
    pub fn from_dict(value: serde_json::Value) -> Result<Self, LayoutError> {
        Ok(Self::new(LayoutDocument::from_value(value)?))
    }

    /// Serialize to the dictionary form.
    pub fn to_dict(&self) -> Result<serde_json::Value, LayoutError> {
        self.document.to_value()
    }

    /// Build a layout from JSON text.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(Self::new(LayoutDocument::from_json(json)?))
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        self.document.to_json()
    }

    /// Parse keymap source through the extraction pipeline.
    pub fn from_keymap(
        source: &str,
        mode: ParsingMode,
        provider: &dyn ConfigurationProvider,
        keyboard: &str,
        title: &str,
    ) -> ParseResult {
        let processor = KeymapProcessor::new(parse_options_from(provider, keyboard, title));
        processor.parse(source, mode)
    }

    /// The underlying document.
    pub fn document(&self) -> &LayoutDocument {
        &self.document
    }

    /// Unwrap into the underlying document.
    pub fn into_document(self) -> LayoutDocument {
        self.document
    }

    /// Check every document invariant.
    pub fn validate(&self, rules: &ValidationRules) -> Result<(), Vec<LayoutError>> {
        validate(&self.document, rules)
    }

    /// Whole-layer operations.
    pub fn layers(&self) -> LayerOps<'_> {
        LayerOps::new(self)
    }

    /// Start editing one layer's bindings.
    pub fn layer(&self, name: &str) -> Result<LayerEditor, LayoutError> {
        let index = self
            .document
            .layer_index(name)
            .ok_or_else(|| LayoutError::LayerNotFound {
                name: name.to_string(),
            })?;
        Ok(LayerEditor::new(self.document.clone(), index))
    }

    /// Behavior collection operations.
    pub fn behaviors(&self) -> BehaviorOps<'_> {
        BehaviorOps::new(self)
    }

    /// Start a keymap export.
    pub fn export_keymap(&self, provider: &dyn ConfigurationProvider) -> KeymapExportBuilder<'_> {
        KeymapExportBuilder {
            document: self.document.clone(),
            ctx: format_context_from(provider),
            template_context: provider.template_context(),
            template: None,
            include_behaviors: true,
            include_combos: true,
            include_macros: true,
            include_tap_dances: true,
        }
    }

    /// Start a kconfig export.
    pub fn export_config(&self, provider: &dyn ConfigurationProvider) -> ConfigExportBuilder {
        ConfigExportBuilder {
            document: self.document.clone(),
            defaults: provider.kconfig_options(),
            use_defaults: true,
        }
    }
}

/// Fluent builder for keymap generation.
pub struct KeymapExportBuilder<'a> {
    document: LayoutDocument,
    ctx: FormatContext,
    template_context: IndexMap<String, serde_json::Value>,
    template: Option<(&'a dyn TemplateProvider, String)>,
    include_behaviors: bool,
    include_combos: bool,
    include_macros: bool,
    include_tap_dances: bool,
}

impl<'a> KeymapExportBuilder<'a> {
    /// Include or exclude behavior definitions.
    pub fn with_behaviors(mut self, include: bool) -> Self {
        self.include_behaviors = include;
        self
    }

    /// Include or exclude combo definitions.
    pub fn with_combos(mut self, include: bool) -> Self {
        self.include_combos = include;
        self
    }

    /// Include or exclude macro definitions.
    pub fn with_macros(mut self, include: bool) -> Self {
        self.include_macros = include;
        self
    }

    /// Include or exclude tap-dance definitions.
    pub fn with_tap_dances(mut self, include: bool) -> Self {
        self.include_tap_dances = include;
        self
    }

    /// Override the format context.
    pub fn with_format_context(mut self, ctx: FormatContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Render through a template instead of direct assembly.
    pub fn with_template(
        mut self,
        provider: &'a dyn TemplateProvider,
        template: impl Into<String>,
    ) -> Self {
        self.template = Some((provider, template.into()));
        self
    }

    /// Generate the keymap content.
    pub fn generate(mut self) -> Result<String, ExportError> {
        if !self.include_behaviors {
            self.document.hold_taps.clear();
            self.document.sticky_keys.clear();
            self.document.caps_words.clear();
            self.document.mod_morphs.clear();
        }
        if !self.include_combos {
            self.document.combos.clear();
        }
        if !self.include_macros {
            self.document.macros.clear();
        }
        if !self.include_tap_dances {
            self.document.tap_dances.clear();
        }

        match self.template.take() {
            Some((provider, template)) => {
                let context = self.build_template_context()?;
                debug!(keys = context.len(), "rendering keymap template");
                Ok(provider.render(&template, &context)?)
            }
            None => Ok(generate_keymap(&self.document, &self.ctx)?),
        }
    }

    /// Assemble the context dictionary consumed by the template backend.
    fn build_template_context(
        &self,
    ) -> Result<IndexMap<String, serde_json::Value>, GenerateError> {
        let doc = &self.document;
        let mut context = self.template_context.clone();
        context.insert("keyboard".into(), serde_json::json!(doc.keyboard));
        context.insert("title".into(), serde_json::json!(doc.title));
        context.insert("layer_names".into(), serde_json::json!(doc.layer_names));
        context.insert(
            "layer_defines".into(),
            serde_json::json!(generate_layer_defines(doc)?),
        );
        context.insert(
            "keymap_node".into(),
            serde_json::json!(generate_keymap_node(doc, &self.ctx)?),
        );
        context.insert(
            "user_behaviors_dtsi".into(),
            serde_json::json!(generate_behaviors_dtsi(doc, &self.ctx)?),
        );
        context.insert(
            "user_tap_dances_dtsi".into(),
            serde_json::json!(generate_tap_dances_dtsi(doc, &self.ctx)?),
        );
        context.insert(
            "combos_dtsi".into(),
            serde_json::json!(generate_combos_dtsi(doc, &self.ctx)?),
        );
        context.insert(
            "user_macros_dtsi".into(),
            serde_json::json!(generate_macros_dtsi(doc, &self.ctx)?),
        );
        let includes: Vec<String> = self
            .ctx
            .include_files
            .iter()
            .map(|f| format!("#include <{f}>"))
            .collect();
        context.insert(
            "resolved_includes".into(),
            serde_json::json!(includes.join("\n")),
        );
        context.insert(
            "custom_defined_behaviors".into(),
            serde_json::json!(doc.custom_defined_behaviors.clone().unwrap_or_default()),
        );
        context.insert(
            "custom_devicetree".into(),
            serde_json::json!(doc.custom_devicetree.clone().unwrap_or_default()),
        );
        for (name, value) in &doc.variables {
            context.entry(name.clone()).or_insert_with(|| value.clone());
        }
        Ok(context)
    }
}

/// Fluent builder for kconfig generation.
pub struct ConfigExportBuilder {
    document: LayoutDocument,
    defaults: IndexMap<String, KconfigValue>,
    use_defaults: bool,
}

impl ConfigExportBuilder {
    /// Add or override one kconfig option.
    pub fn with_option(mut self, name: &str, value: KconfigValue) -> Self {
        self.document
            .config_parameters
            .push(zmk_layout_models::ConfigParameter::new(
                name,
                match value {
                    KconfigValue::Bool(b) => serde_json::json!(b),
                    KconfigValue::Int(i) => serde_json::json!(i),
                    KconfigValue::Str(s) => serde_json::json!(s),
                },
            ));
        self
    }

    /// Include or exclude the provider's default options.
    pub fn with_defaults(mut self, use_defaults: bool) -> Self {
        self.use_defaults = use_defaults;
        self
    }

    /// Generate the config fragment and the resolved settings map.
    pub fn generate(self) -> Result<(String, IndexMap<String, KconfigValue>), ExportError> {
        let defaults = if self.use_defaults {
            self.defaults
        } else {
            IndexMap::new()
        };
        Ok(generate_kconfig(&self.document, &defaults)?)
    }
}
