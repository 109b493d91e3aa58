// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lowering from devicetree keymap source to layout documents.
//!
//! This crate walks the parsed AST to find and reconstruct the semantic
//! entities of a keymap — layers, hold-taps, combos, macros, tap-dances,
//! sticky-keys, caps-words, mod-morphs, input-listeners — into a validated
//! [`zmk_layout_models::LayoutDocument`]. Extraction is a one-shot
//! lowering: the produced document holds no reference to the AST.
//!
//! The [`KeymapProcessor`] ties the stages together:
//! source → tokens → AST → defines → extraction → validation.

pub mod behaviors;
pub mod bindings;
pub mod defines;
pub mod keymap;
pub mod processor;

pub use behaviors::{extract_behaviors, ExtractedBehaviors};
pub use bindings::{bindings_from_cells, single_binding_from_cells};
pub use defines::Defines;
pub use keymap::{extract_keymap, ExtractedKeymap};
pub use processor::{KeymapProcessor, ParseOptions, ParseResult, ParsingMode};
