//! Twitch IRC transport.
//!
//! Connects to Twitch chat over IRC (TLS by default), joins the configured
//! channels and runs every inbound line through a three-stage pipeline:
//! decode, interpret, emit.

pub mod connection;
pub mod control;
pub mod error;
pub mod irc;
pub mod pipeline;
pub mod plugin;
pub mod writer;

pub use {
    control::TwitchControl,
    error::{Error, Result},
    irc::Frame,
    pipeline::PipelineConfig,
    plugin::TwitchPlugin,
    writer::IrcWriter,
};

/// Platform name stamped on every decoded message.
pub const PLATFORM: &str = "twitch";
