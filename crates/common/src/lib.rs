//! Shared message types and error helpers used across all tooby crates.

pub mod error;
pub mod types;

pub use {
    error::FromMessage,
    types::{Message, MessageType},
};
