//! Services that sit between the parsers and the application
//!
//! - [`merge_refresh`] folds a re-downloaded playlist into the stored one
//! - [`EpgCache`] keeps a programme guide loaded and fresh

pub mod epg_cache;
pub mod playlist_refresh;

pub use epg_cache::EpgCache;
pub use playlist_refresh::merge_refresh;
