//! Core types shared across lessonforge.
//!
//! Currently this is the error layer: [`ForgeError`] for typed failures and
//! [`ErrorContext`]/[`user_friendly_error`] for presenting them in the CLI.

pub mod error;

pub use error::{ErrorContext, ForgeError, user_friendly_error};
