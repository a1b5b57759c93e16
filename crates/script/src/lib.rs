//! Script interpreter for chat commands.
//!
//! A script is plain text with `{keyword args...}` directives embedded in it.
//! Directives are resolved innermost-first, left to right; each one is
//! replaced by the text its builtin produces until none are left.
//!
//! ```ignore
//! let interpreter = Interpreter::new(store);
//! interpreter.process(&mut message, "{sender}, {var get greeting}!").await?;
//! ```

pub mod builtins;
pub mod conditional;
pub mod engine;
pub mod error;
pub mod scanner;

pub use {
    builtins::{Builtin, SubCommand},
    engine::{Interpreter, MAX_SUBSTITUTIONS},
    error::{Error, Result},
    scanner::{MAX_DEPTH, Span, next_directive, scan},
};
