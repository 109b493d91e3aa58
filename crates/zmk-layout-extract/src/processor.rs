//! The parse pipeline: source text → tokens → AST → layout document.

use crate::behaviors::extract_behaviors;
use crate::defines::Defines;
use crate::keymap::extract_keymap;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};
use zmk_layout_ast::{Diagnostic, DiagnosticKind, SourceFile};
use zmk_layout_models::{validate, LayoutDocument, ValidationRules};

/// How a keymap source should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParsingMode {
    /// A standalone keymap file; a keymap node is required and every
    /// behavior is extracted.
    Full,
    /// A user fragment inside a known template; the keymap node is
    /// optional and behaviors matching the profile's system definitions
    /// are dropped.
    TemplateAware,
}

/// Plain-data configuration for the processor, built by the caller from
/// its configuration provider.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Keyboard identifier stamped into the extracted document.
    pub keyboard: String,
    /// Layout title stamped into the extracted document.
    pub title: String,
    /// Names of system-defined behaviors (skipped in template-aware mode).
    pub system_behaviors: Vec<String>,
    /// Validation rules applied to the assembled document.
    pub validation: ValidationRules,
}

/// Outcome of a pipeline run.
///
/// Errors and warnings are data; `layout` is present whenever a document
/// could be assembled, even alongside errors.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// Whether the run produced a document without errors.
    pub success: bool,
    /// The assembled document, when extraction got that far.
    pub layout: Option<LayoutDocument>,
    /// Hard errors (lex, parse, extract).
    pub errors: Vec<Diagnostic>,
    /// Per-behavior skips and validation findings.
    pub warnings: Vec<Diagnostic>,
    /// The mode the run used.
    pub mode: ParsingMode,
    /// Count of extracted records per section.
    pub extracted_sections: IndexMap<String, usize>,
}

/// Orchestrates tokenize → parse → extract → validate.
#[derive(Debug, Clone, Default)]
pub struct KeymapProcessor {
    options: ParseOptions,
}

impl KeymapProcessor {
    /// Create a processor with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Run the pipeline over keymap source text.
    pub fn parse(&self, source: &str, mode: ParsingMode) -> ParseResult {
        let file = SourceFile::new(source);
        let mut errors: Vec<Diagnostic> = Vec::new();
        let mut warnings: Vec<Diagnostic> = Vec::new();

        let (tokens, lex_errors) = zmk_layout_lexer::lex_safe(source);
        errors.extend(lex_errors.into_iter().map(|e| e.into_diagnostic()));

        let (roots, parse_errors) = zmk_layout_parser::parse_safe(&tokens);
        errors.extend(
            parse_errors
                .into_iter()
                .map(|e| e.into_diagnostic(Some(&file))),
        );

        let defines = Defines::collect(&roots);
        debug!(defines = defines.len(), mode = ?mode, "extracting keymap source");

        let keymap = extract_keymap(&roots, &defines, &mut warnings);
        let (layer_names, layers) = match keymap {
            Some(extracted) => (extracted.layer_names, extracted.layers),
            None if mode == ParsingMode::Full => {
                errors.push(Diagnostic::new(
                    DiagnosticKind::Extract,
                    "no keymap node (compatible = \"zmk,keymap\") found",
                ));
                (Vec::new(), Vec::new())
            }
            None => (Vec::new(), Vec::new()),
        };

        let mut behaviors = extract_behaviors(&roots, &defines, &layer_names, &mut warnings);
        if mode == ParsingMode::TemplateAware {
            self.drop_system_behaviors(&mut behaviors);
        }

        let mut document = LayoutDocument::new(&self.options.keyboard, &self.options.title);
        document.layer_names = layer_names;
        document.layers = layers;
        document.hold_taps = behaviors.hold_taps;
        document.combos = behaviors.combos;
        document.macros = behaviors.macros;
        document.tap_dances = behaviors.tap_dances;
        document.sticky_keys = behaviors.sticky_keys;
        document.caps_words = behaviors.caps_words;
        document.mod_morphs = behaviors.mod_morphs;
        document.input_listeners = behaviors.input_listeners;

        if let Err(violations) = validate(&document, &self.options.validation) {
            warnings.extend(violations.into_iter().map(|v| v.into_diagnostic()));
        }

        let extracted_sections = section_counts(&document);
        let success = errors.is_empty();
        ParseResult {
            success,
            layout: Some(document),
            errors,
            warnings,
            mode,
            extracted_sections,
        }
    }

    /// Remove behaviors whose names match the profile's system behavior
    /// definitions; those come from the template, not the user fragment.
    fn drop_system_behaviors(&self, behaviors: &mut crate::behaviors::ExtractedBehaviors) {
        let system = &self.options.system_behaviors;
        if system.is_empty() {
            return;
        }
        let is_user = |name: &str| !system.iter().any(|s| s == name);
        let before = behaviors.hold_taps.len() + behaviors.macros.len();
        behaviors.hold_taps.retain(|b| is_user(&b.name));
        behaviors.macros.retain(|b| is_user(&b.name));
        behaviors.tap_dances.retain(|b| is_user(&b.name));
        behaviors.sticky_keys.retain(|b| is_user(&b.name));
        behaviors.caps_words.retain(|b| is_user(&b.name));
        behaviors.mod_morphs.retain(|b| is_user(&b.name));
        let after = behaviors.hold_taps.len() + behaviors.macros.len();
        if before != after {
            warn!(
                dropped = before - after,
                "dropped template-provided behaviors"
            );
        }
    }
}

fn section_counts(document: &LayoutDocument) -> IndexMap<String, usize> {
    let mut sections = IndexMap::new();
    sections.insert("layers".to_string(), document.layers.len());
    sections.insert("hold_taps".to_string(), document.hold_taps.len());
    sections.insert("combos".to_string(), document.combos.len());
    sections.insert("macros".to_string(), document.macros.len());
    sections.insert("tap_dances".to_string(), document.tap_dances.len());
    sections.insert("sticky_keys".to_string(), document.sticky_keys.len());
    sections.insert("caps_words".to_string(), document.caps_words.len());
    sections.insert("mod_morphs".to_string(), document.mod_morphs.len());
    sections.insert(
        "input_listeners".to_string(),
        document.input_listeners.len(),
    );
    sections
}
