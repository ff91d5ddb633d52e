//! Centralized error handling for openiptv
//!
//! The parsing core is deliberately forgiving: malformed playlist lines are
//! collected as strings in [`crate::models::ParseResult::errors`] and catchup
//! resolution reports failure as `None`. The error types here cover the
//! boundaries that genuinely fail: fetching, XMLTV documents, configuration
//! and the structural EXTINF failures the tokenizer records per line.
//!
//! # Usage
//!
//! ```rust
//! use openiptv::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::validation("playlist URL must use http or https"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
