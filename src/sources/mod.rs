//! Playlist and guide sources
//!
//! The parsers never touch the network. This module supplies the text they
//! work on: a [`TextFetcher`] abstraction, an HTTP implementation over
//! `reqwest`, and [`fetch_and_parse`] tying a fetcher to the playlist
//! parser.

pub mod http;
pub mod playlist;
pub mod traits;

pub use http::HttpFetcher;
pub use playlist::fetch_and_parse;
pub use traits::TextFetcher;
