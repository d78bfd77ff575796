/*!
## Rust Machine Module

This Rust module is the compiler, virtual machine and script scope of
the scene language. A `Compiler` turns source text into a `Program` of
statements, a `Runner` executes it, and a `Scope` keeps named units
together with the shared variables they exchange.

*/

mod cell;
mod compile;
mod complete;
mod function;
mod link;
mod listing;
mod opcode;
mod operation;
mod program;
mod runner;
mod scope;
mod shared;
mod stack;
mod statement;
mod symbol;
mod val;
mod var;

pub use cell::Cell;
pub use cell::MAX_LIST_LEN;
pub use compile::Compiler;
pub use compile::Units;
pub use compile::RESULT;
pub use complete::complete;
pub use complete::Completion;
pub use function::library;
pub use function::Body;
pub use function::Builtin;
pub use function::Context;
pub use function::Dispatcher;
pub use function::Function;
pub use link::Link;
pub use listing::Listing;
pub use opcode::Opcode;
pub use program::Program;
pub use runner::Runner;
pub use scope::Scope;
pub use scope::Unit;
pub use shared::SharedEntry;
pub use shared::SharedId;
pub use shared::SharedTable;
pub use stack::Stack;
pub use statement::Kind;
pub use statement::Statement;
pub use statement::Target;
pub use symbol::Globals;
pub use symbol::Symbol;
pub use symbol::Variable;
pub use val::Val;
pub use var::Slot;
pub use var::Var;

#[cfg(test)]
mod tests;
