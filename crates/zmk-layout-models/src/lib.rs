// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Data model for ZMK keymap layouts.
//!
//! This crate defines the [`LayoutDocument`] — the canonical in-memory and
//! dictionary representation of a keymap — together with the typed behavior
//! records, the structured [`LayoutBinding`] form with its parser and
//! canonical formatter, and document validation.

pub mod behaviors;
pub mod binding;
pub mod document;
pub mod error;
pub mod validation;

pub use behaviors::{
    CapsWordBehavior, ComboBehavior, HoldTapBehavior, InputListener, InputListenerNode,
    InputProcessor, MacroBehavior, ModMorphBehavior, StickyKeyBehavior, TapDanceBehavior,
};
pub use binding::{LayoutBinding, LayoutParam, ParamValue};
pub use document::{ConfigParameter, LayoutDocument};
pub use error::LayoutError;
pub use validation::{is_c_identifier, validate, ValidationRules};
