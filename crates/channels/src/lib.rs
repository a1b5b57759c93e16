//! Channel plugin system.
//!
//! Each chat platform the bot connects to implements [`ChannelPlugin`]. A
//! plugin that can join and leave rooms at runtime also hands out a
//! [`ChannelControl`] handle, which the interpreter uses for the `join` and
//! `part` directives.

pub mod error;
pub mod plugin;
pub mod registry;

pub use {
    error::{Error, Result},
    plugin::{ChannelControl, ChannelHealthSnapshot, ChannelPlugin},
    registry::ChannelRegistry,
};
