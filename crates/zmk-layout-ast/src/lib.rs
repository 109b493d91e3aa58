// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AST types for ZMK keymap devicetree source.
//!
//! This crate contains the devicetree AST node definitions, source position
//! tracking, the AST walker, and the shared diagnostic type used by the
//! lexer, parser and extraction stages.

pub mod diagnostic;
pub mod format;
pub mod node;
pub mod source;
pub mod walk;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use format::format_nodes;
pub use node::{DtComment, DtConditional, DtNode, DtProperty, DtValue};
pub use source::SourceFile;
pub use walk::{find_nodes_compatible, find_nodes_named, find_nodes_where, walk_nodes};
