//! Markup loader: tokenizer, parser, writer.

pub mod parser;
pub mod tokenizer;
pub mod writer;

pub use parser::{parse, MarkupError};
pub use writer::{node_to_markup, to_markup};
