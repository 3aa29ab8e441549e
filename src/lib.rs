//! A minimal interactive command interpreter.
//!
//! Lines are split into `;`-separated statements, or treated as a single
//! pipeline when they contain `|`. Every command runs as a child process; the
//! stages of a pipeline are joined by pipes and all run concurrently. A small
//! control-flow grammar (`if` / `then` / `else` / `fi`) lets the operator
//! compose a conditional over several lines: the blocks are collected first and
//! executed once `fi` closes the statement.
//!
//! The main entry point is [`Interpreter`]. The modules [`lexer`], [`parser`],
//! [`context`] and [`external`] expose the tokenizer, the pipeline builder, the
//! control-flow state machine and the process launcher on their own.

mod builtin;
pub mod command;
pub mod context;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
pub mod lexer;
pub mod parser;
pub mod signals;

pub use env::Environment;
pub use error::ShellError;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{CONTINUATION_PROMPT, Flow, Interpreter};
