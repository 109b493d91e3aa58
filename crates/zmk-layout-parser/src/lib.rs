// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Hand-written recursive descent parser for ZMK keymap devicetree source.
//!
//! ## Architecture
//!
//! - `stream`: [`TokenStream`] wrapper with lookahead and synchronization
//! - `error`: [`ParseError`] and recovery categories
//! - `parse`: the grammar productions
//!
//! ## Public API
//!
//! ```rust
//! use zmk_layout_lexer::lex;
//! use zmk_layout_parser::{parse, parse_safe};
//!
//! let tokens = lex("/ { keymap { compatible = \"zmk,keymap\"; }; };").unwrap();
//! let roots = parse(&tokens).unwrap();
//! assert_eq!(roots[0].name, "/");
//!
//! let (partial, errors) = parse_safe(&tokens);
//! assert!(errors.is_empty());
//! assert_eq!(partial.len(), roots.len());
//! ```

mod error;
mod parse;
mod stream;

pub use error::{ParseError, ParseErrorKind};
pub use parse::{parse, parse_safe, MAX_NESTING_DEPTH};
pub use stream::TokenStream;
