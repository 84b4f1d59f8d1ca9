//! Configuration management for lessonforge
//!
//! Only user-wide settings live here. Template descriptors are inputs, not
//! configuration, and are handled by [`crate::descriptor`].
//!
//! # Modules
//!
//! - `global` - the optional `~/.lessonforge/config.toml` file with engine
//!   limits and rendering defaults
//!
//! # Precedence
//!
//! Command-line flags override the configuration file, which overrides the
//! built-in defaults. For example `render --strict` enables strict input
//! checking even when `strict_inputs = false`.

mod global;

pub use global::{DEFAULT_MAX_DEPTH, GlobalConfig, MAX_DEPTH_CEILING};
