//! Parser for Mustache templates

pub mod ast;
mod compile;
mod grammar;
pub mod lexer;
pub mod scanner;

pub use ast::*;
pub use compile::{parse, parse_with_delimiters};
pub use grammar::parse_tag_expression;
