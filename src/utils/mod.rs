//! Utility modules for openiptv
//!
//! Reusable helpers shared by the parser, the catchup resolver and the
//! EPG layer.

pub mod clock;
pub mod deterministic_uuid;
pub mod time;
pub mod url;
pub mod xmltv_parser;

pub use clock::{Clock, FixedClock, SystemClock, system_clock};
pub use deterministic_uuid::{generate_channel_id, generate_deterministic_uuid};
pub use time::LocalZone;
pub use url::UrlUtils;
