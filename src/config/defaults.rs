//! Configuration default values
//!
//! Every default lives here so the shipped config file and the code agree.
// Fetch defaults
pub const DEFAULT_USER_AGENT: &str = "OpenIPTV/1.0";
pub const DEFAULT_FETCH_TIMEOUT: &str = "30s";

// Catchup defaults
pub const DEFAULT_CATCHUP_DAYS: u32 = crate::models::DEFAULT_CATCHUP_DAYS;

// EPG defaults
pub const DEFAULT_EPG_CACHE_TTL: &str = "1h";

// Display defaults
pub const DEFAULT_PRIORITY_COUNTRIES: &[&str] = &["IL", "US", "UK"];

// Config file
pub const DEFAULT_CONFIG_FILE: &str = "openiptv.toml";
