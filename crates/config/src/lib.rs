//! Configuration loading, env substitution and validation.
//!
//! Config files: `tooby.toml`, `tooby.yaml`, `tooby.yml` or `tooby.json`,
//! searched in `./` then `~/.config/tooby/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution anywhere in
//! the file.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{InterpreterConfig, StoreConfig, ToobyConfig, TwitchAccountConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
