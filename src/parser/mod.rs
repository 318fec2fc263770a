//! Parsing layer: turns UI source text into an owned syntax tree.
//!
//! - [`treesitter`]: tree-sitter TSX/JavaScript adapter and [`Dialect`] selection
//! - [`node`]: the [`SyntaxNode`] tree handed to analyzers
//! - [`visit`]: the single visitor abstraction used for every tree walk

pub mod node;
pub mod treesitter;
pub mod visit;

pub use node::{string_literal, AttrValue, NodeKind, SyntaxNode, SyntaxTree};
pub use treesitter::{parse, parse_raw, Dialect, ParseError};
pub use visit::{walk, Ancestors, Visitor};
