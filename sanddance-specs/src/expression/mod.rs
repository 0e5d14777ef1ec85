pub mod ast;
pub mod eval;
pub mod lexer;
pub mod ops;
pub mod parser;

pub use parser::parse;
