//! Catchup (timeshift) URL resolution
//!
//! [`CatchupResolver`] turns a channel's [`crate::models::CatchupInfo`] and
//! a programme's time window into a playable URL. It is a plain value
//! owned by whoever needs it; the clock and timezone are injected.

pub mod placeholders;
pub mod resolver;

pub use placeholders::Placeholders;
pub use resolver::CatchupResolver;
