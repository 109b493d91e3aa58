// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! DTSI and kconfig generation from layout documents.
//!
//! The generator is the inverse of the extraction pipeline: it emits
//! devicetree source that a ZMK build toolchain accepts, and that the
//! parser reads back into an equivalent document. Output is deterministic
//! for a given document and [`FormatContext`].

pub mod error;
pub mod format;
pub mod kconfig;
pub mod keymap;

pub use error::GenerateError;
pub use format::{CompatibleStrings, FormatContext};
pub use kconfig::{generate_kconfig, KconfigValue};
pub use keymap::{
    generate_behaviors_dtsi, generate_combos_dtsi, generate_keymap, generate_keymap_node,
    generate_layer_defines, generate_macros_dtsi, generate_tap_dances_dtsi, upper_snake,
};
