//! SQL DDL to relational model extraction.

mod lexer;
mod parser;
mod scanner;
mod types;

pub use parser::extract;
pub use scanner::{ScanState, split_top_level, strip_comments};
