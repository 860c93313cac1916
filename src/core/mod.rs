//! Core types shared across the unipm codebase.

pub mod error;

pub use error::{ErrorContext, UnipmError, user_friendly_error};
