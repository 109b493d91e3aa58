// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Bidirectional translation between ZMK keymap devicetree source and
//! JSON layout documents.
//!
//! The pipeline in one direction: source text → tokenizer → recursive
//! descent parser → devicetree AST → behavior extraction → validated
//! [`LayoutDocument`]. In the other: document → DTSI generator → keymap
//! text (plus a kconfig fragment). On top of the document sits the fluent
//! [`Layout`] mutation surface; every operation returns a new value.
//!
//! # Quick start
//!
//! ```
//! use zmk_layout::{DefaultConfigurationProvider, Layout, ParsingMode};
//!
//! let source = r#"/ { keymap { compatible = "zmk,keymap"; base { bindings = <&kp A &kp B>; }; }; };"#;
//! let result = Layout::from_keymap(
//!     source,
//!     ParsingMode::Full,
//!     &DefaultConfigurationProvider,
//!     "corne",
//!     "My Layout",
//! );
//! assert!(result.success);
//!
//! let layout = Layout::new(result.layout.unwrap());
//! let layout = layout.layers().add("nav").unwrap();
//! let keymap_text = layout
//!     .export_keymap(&DefaultConfigurationProvider)
//!     .generate()
//!     .unwrap();
//! assert!(keymap_text.contains("#define NAV 1"));
//! ```

mod behaviors;
mod layers;
mod layout;
mod providers;

pub use behaviors::BehaviorOps;
pub use layers::{LayerEditor, LayerOps};
pub use layout::{ConfigExportBuilder, ExportError, KeymapExportBuilder, Layout};
pub use providers::{
    format_context_from, parse_options_from, ConfigurationProvider,
    DefaultConfigurationProvider, FormattingOptions, PassthroughTemplateProvider, ProviderError,
    SystemBehavior, TemplateProvider,
};

pub use zmk_layout_ast::{
    find_nodes_compatible, find_nodes_named, find_nodes_where, format_nodes, walk_nodes,
    Diagnostic, DiagnosticKind, DtComment, DtConditional, DtNode, DtProperty, DtValue, SourceFile,
};
pub use zmk_layout_extract::{
    Defines, ExtractedBehaviors, ExtractedKeymap, KeymapProcessor, ParseOptions, ParseResult,
    ParsingMode,
};
pub use zmk_layout_gen::{
    generate_kconfig, generate_keymap, generate_layer_defines, upper_snake, CompatibleStrings,
    FormatContext, GenerateError, KconfigValue,
};
pub use zmk_layout_lexer::{lex, lex_safe, LexError, Token, TokenKind};
pub use zmk_layout_models::{
    is_c_identifier, validate, CapsWordBehavior, ComboBehavior, ConfigParameter, HoldTapBehavior,
    InputListener, InputListenerNode, InputProcessor, LayoutBinding, LayoutDocument, LayoutError,
    LayoutParam, MacroBehavior, ModMorphBehavior, ParamValue, StickyKeyBehavior, TapDanceBehavior,
    ValidationRules,
};
pub use zmk_layout_parser::{parse, parse_safe, ParseError, ParseErrorKind};
