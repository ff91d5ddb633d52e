//! Time utilities: timezone selection, XMLTV timestamps and display formatting

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static XMLTV_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{14})(?:\s*([+-]\d{2}:?\d{2}))?").expect("valid XMLTV timestamp regex")
});

static FIXED_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-])(\d{2}):?(\d{2})$").expect("valid offset regex"));

/// The wall-clock zone used for calendar components and day boundaries.
///
/// `System` follows the host's local timezone, which is what a player
/// running on the viewer's machine expects. `Named` pins an IANA zone,
/// typically the provider's, and keeps results reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocalZone {
    #[default]
    System,
    Named(Tz),
}

/// Zero-padded calendar components of an instant in a [`LocalZone`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarParts {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
}

impl CalendarParts {
    fn from_datetime<T: TimeZone>(dt: &DateTime<T>) -> Self {
        Self {
            year: dt.year().to_string(),
            month: format!("{:02}", dt.month()),
            day: format!("{:02}", dt.day()),
            hour: format!("{:02}", dt.hour()),
            minute: format!("{:02}", dt.minute()),
            second: format!("{:02}", dt.second()),
        }
    }
}

impl LocalZone {
    /// Build a zone from an optional IANA name; empty or missing means `System`
    pub fn from_name(name: Option<&str>) -> Result<Self, String> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => Ok(Self::System),
            Some(n) => n
                .parse::<Tz>()
                .map(Self::Named)
                .map_err(|_| format!("Invalid timezone: '{n}'. Use a named timezone such as 'Europe/London'")),
        }
    }

    /// Calendar components of `instant` as seen in this zone
    pub fn calendar_parts(&self, instant: DateTime<Utc>) -> CalendarParts {
        match self {
            Self::System => CalendarParts::from_datetime(&instant.with_timezone(&Local)),
            Self::Named(tz) => CalendarParts::from_datetime(&instant.with_timezone(tz)),
        }
    }

    /// Resolve a wall-clock time in this zone to UTC.
    ///
    /// Ambiguous times (DST fold) take the earlier instant; times inside a
    /// DST gap yield `None`.
    pub fn resolve_naive(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::System => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// The calendar date of `instant` in this zone
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::System => instant.with_timezone(&Local).date_naive(),
            Self::Named(tz) => instant.with_timezone(tz).date_naive(),
        }
    }

    /// Half-open UTC bounds `[start, end)` of a calendar day in this zone
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_of_day(date);
        let end = date
            .succ_opt()
            .map(|next| self.start_of_day(next))
            .unwrap_or(start + Duration::days(1));
        (start, end)
    }

    fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        // Zones that skip midnight for DST start the day at the first valid hour
        (0..3)
            .find_map(|h| self.resolve_naive(midnight + Duration::hours(h)))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }
}

/// `instant` moved back by `days` whole days.
///
/// `None` when the result falls outside the representable range, which
/// callers treat as an unbounded window.
pub fn days_before(instant: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(days)).and_then(|span| instant.checked_sub_signed(span))
}

/// Parse an XMLTV timestamp such as `20231013120000 +0300`.
///
/// An explicit offset wins; without one the wall-clock time is read in
/// `zone`. Returns `None` for anything that is not a valid timestamp.
pub fn parse_xmltv_timestamp(value: &str, zone: &LocalZone) -> Option<DateTime<Utc>> {
    let caps = XMLTV_TIMESTAMP.captures(value.trim())?;
    let naive = NaiveDateTime::parse_from_str(caps.get(1)?.as_str(), "%Y%m%d%H%M%S").ok()?;

    match caps.get(2) {
        Some(offset) => match parse_fixed_offset(offset.as_str()) {
            Ok(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            Err(e) => {
                debug!("Ignoring XMLTV timestamp '{}': {}", value, e);
                None
            }
        },
        None => zone.resolve_naive(naive),
    }
}

/// Parse fixed offset formats like "+01:00", "+0100", etc.
pub fn parse_fixed_offset(offset_str: &str) -> Result<FixedOffset, String> {
    let offset_str = offset_str.trim();

    let caps = FIXED_OFFSET
        .captures(offset_str)
        .ok_or_else(|| format!("Invalid offset format: '{offset_str}'"))?;

    let sign = if &caps[1] == "+" { 1 } else { -1 };
    let hours: i32 = caps[2].parse().map_err(|_| "Invalid hours in offset")?;
    let minutes: i32 = caps[3].parse().map_err(|_| "Invalid minutes in offset")?;

    if hours > 23 || minutes > 59 {
        return Err("Invalid time values in offset".to_string());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| "Invalid timezone offset".to_string())
}

/// "45 min" below an hour, otherwise "2h 5m"
pub fn format_remaining(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    if minutes < 60 {
        return format!("{minutes} min");
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Like [`format_remaining`] but drops a zero minute part: "2h"
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    if minutes < 60 {
        return format!("{minutes} min");
    }
    match minutes % 60 {
        0 => format!("{}h", minutes / 60),
        mins => format!("{}h {}m", minutes / 60, mins),
    }
}

/// Relative age of a past instant: "12 min ago", "3h ago", "Yesterday", "4 days ago"
pub fn format_time_ago(elapsed: Duration) -> String {
    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return format!("{minutes} min ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    match hours / 24 {
        1 => "Yesterday".to_string(),
        days => format!("{days} days ago"),
    }
}
