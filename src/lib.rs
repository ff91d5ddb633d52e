pub mod catchup;
pub mod classification;
pub mod config;
pub mod country;
pub mod epg;
pub mod errors;
pub mod models;
pub mod parser;
pub mod services;
pub mod sources;
pub mod utils;

pub use errors::{AppError, AppResult};
