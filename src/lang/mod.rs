/*!
# Rust Language Module

This Rust module provides lexical analysis and the static semantics of the
scene language: types, their assignability, and the operator catalog used
to check expressions and pick the typed form of each instruction.

*/

#[macro_use]
mod error;
mod lex;
mod operation;
mod token;
mod types;

pub use error::Error;
pub use error::ErrorCode;
pub use lex::lex;
pub use lex::Lexer;
pub use operation::LrType;
pub use operation::Operation;
pub use token::Operator;
pub use token::Token;
pub use token::Word;
pub use types::RecordType;
pub use types::Type;

#[cfg(test)]
mod tests;

/// Location of a token in the source text. Rows and columns count from
/// one, `offset` is the byte offset from the start of the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
    pub offset: usize,
    pub len: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}
